// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory cache of the active list set.
//!
//! Synchronization contract: every successful mutation is followed by an
//! unconditional wholesale reload, so the next read always reflects the
//! server's view. The cache is never patched in place.

use cesta_api::ApiClient;
use cesta_core::{CestaError, ListSummary, ShoppingList};
use tracing::debug;

/// Cache of the user's active (non-finalized) lists.
#[derive(Debug)]
pub struct ListStore {
    client: ApiClient,
    lists: Vec<ShoppingList>,
    loaded: bool,
}

impl ListStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            lists: Vec::new(),
            loaded: false,
        }
    }

    /// The cached active lists, in server order (newest first).
    pub fn lists(&self) -> &[ShoppingList] {
        &self.lists
    }

    /// True once the cache has been populated at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: i64) -> Option<&ShoppingList> {
        self.lists.iter().find(|l| l.id == id)
    }

    /// Replaces the whole cache with the server's current list set.
    pub async fn refresh(&mut self) -> Result<(), CestaError> {
        self.lists = self.client.lists().await?;
        self.loaded = true;
        debug!(count = self.lists.len(), "list cache reloaded");
        Ok(())
    }

    /// Creates a list and reloads. The name must be non-empty after
    /// trimming; the check runs before any network call.
    pub async fn create(&mut self, name: &str) -> Result<ShoppingList, CestaError> {
        let name = required_name(name)?;
        let created = self.client.create_list(name).await?;
        self.refresh().await?;
        Ok(created)
    }

    /// Renames a list and reloads.
    pub async fn rename(&mut self, id: i64, name: &str) -> Result<ShoppingList, CestaError> {
        let name = required_name(name)?;
        let renamed = self.client.rename_list(id, name).await?;
        self.refresh().await?;
        Ok(renamed)
    }

    /// Deletes a list and reloads.
    pub async fn delete(&mut self, id: i64) -> Result<(), CestaError> {
        self.client.delete_list(id).await?;
        self.refresh().await
    }

    /// Finalizes or reopens a list and reloads. A finalized list leaves
    /// the active set and shows up in history instead.
    pub async fn set_finalized(
        &mut self,
        id: i64,
        finalized: bool,
    ) -> Result<ShoppingList, CestaError> {
        let updated = self.client.set_finalized(id, finalized).await?;
        self.refresh().await?;
        Ok(updated)
    }

    /// Item/purchased counts for one list, fetched on demand.
    pub async fn summary(&self, id: i64) -> Result<ListSummary, CestaError> {
        self.client.list_summary(id).await
    }
}

/// Trims a required name field, rejecting empty input locally.
pub(crate) fn required_name(name: &str) -> Result<&str, CestaError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CestaError::Validation("a name is required".to_string()));
    }
    Ok(trimmed)
}

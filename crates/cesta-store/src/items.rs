// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item cache for one open list, plus client-side view state.
//!
//! Follows the same invalidate-and-refetch contract as the list cache:
//! every item mutation reloads the items wholesale. The filter and search
//! text are applied on read and never touch the cached data. Callers that
//! display list-level item counts must reload the list cache as well after
//! any mutation here; [`crate::workspace::Workspace`] does that.

use cesta_api::ApiClient;
use cesta_core::{CestaError, ItemFilter, ItemPatch, ListItem};
use tracing::debug;

use crate::lists::required_name;

/// Cache of one list's items and the view state applied to them.
#[derive(Debug)]
pub struct ItemDetailStore {
    client: ApiClient,
    list_id: i64,
    items: Vec<ListItem>,
    filter: ItemFilter,
    search: String,
}

impl ItemDetailStore {
    pub fn new(client: ApiClient, list_id: i64) -> Self {
        Self {
            client,
            list_id,
            items: Vec::new(),
            filter: ItemFilter::All,
            search: String::new(),
        }
    }

    pub fn list_id(&self) -> i64 {
        self.list_id
    }

    /// All cached items in display (rank) order, unfiltered.
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn get(&self, item_id: i64) -> Option<&ListItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn filter(&self) -> ItemFilter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Sets the purchased filter. Read-time only; no network call.
    pub fn set_filter(&mut self, filter: ItemFilter) {
        self.filter = filter;
    }

    /// Sets the search text. Read-time only; no network call.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// The cached items with the active filter and search applied: the
    /// purchased/pending subset intersected with a case-insensitive
    /// substring match on the name.
    pub fn filtered_items(&self) -> Vec<&ListItem> {
        let needle = self.search.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| match self.filter {
                ItemFilter::All => true,
                ItemFilter::Purchased => item.purchased,
                ItemFilter::Pending => !item.purchased,
            })
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Replaces the item cache with the server's current state.
    pub async fn load(&mut self) -> Result<(), CestaError> {
        self.items = self.client.items(self.list_id).await?;
        debug!(list_id = self.list_id, count = self.items.len(), "item cache reloaded");
        Ok(())
    }

    /// Adds an item and reloads. Name and quantity are validated before
    /// any network call.
    pub async fn create(&mut self, name: &str, quantity: u32) -> Result<ListItem, CestaError> {
        let name = required_name(name)?;
        if quantity == 0 {
            return Err(CestaError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        let created = self.client.create_item(self.list_id, name, quantity).await?;
        self.load().await?;
        Ok(created)
    }

    /// Applies a partial update and reloads. An empty patch is a local
    /// no-op. Renaming to an empty name is rejected locally.
    pub async fn update(&mut self, item_id: i64, patch: &ItemPatch) -> Result<(), CestaError> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(name) = &patch.name {
            required_name(name)?;
        }
        if patch.quantity == Some(0) {
            return Err(CestaError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        self.client.update_item(self.list_id, item_id, patch).await?;
        self.load().await
    }

    /// Flips the purchased flag of a cached item.
    pub async fn toggle_purchased(&mut self, item_id: i64) -> Result<(), CestaError> {
        let purchased = self
            .get(item_id)
            .ok_or_else(|| CestaError::Validation(format!("no item {item_id} in this list")))?
            .purchased;
        self.update(item_id, &ItemPatch::purchased(!purchased)).await
    }

    /// Deletes an item and reloads.
    pub async fn delete(&mut self, item_id: i64) -> Result<(), CestaError> {
        self.client.delete_item(self.list_id, item_id).await?;
        self.load().await
    }

    /// Submits a complete new id sequence and reloads. Rank assignment is
    /// the server's job; the cache never computes ranks.
    pub async fn reorder(&mut self, order: &[i64]) -> Result<(), CestaError> {
        if order.is_empty() {
            return Err(CestaError::Validation(
                "an item order must not be empty".to_string(),
            ));
        }
        self.client.reorder_items(self.list_id, order).await?;
        self.load().await
    }

    /// Moves an item one position toward the front. Returns `false`
    /// without any network call when the item is already first.
    pub async fn move_up(&mut self, item_id: i64) -> Result<bool, CestaError> {
        self.move_by(item_id, -1).await
    }

    /// Moves an item one position toward the back. Returns `false`
    /// without any network call when the item is already last.
    pub async fn move_down(&mut self, item_id: i64) -> Result<bool, CestaError> {
        self.move_by(item_id, 1).await
    }

    /// Rebuilds the full id sequence with the item shifted by one and
    /// submits it. Boundary moves are local no-ops.
    async fn move_by(&mut self, item_id: i64, delta: i64) -> Result<bool, CestaError> {
        let mut ids: Vec<i64> = self.items.iter().map(|i| i.id).collect();
        let index = ids
            .iter()
            .position(|id| *id == item_id)
            .ok_or_else(|| CestaError::Validation(format!("no item {item_id} in this list")))?;

        let target = index as i64 + delta;
        if target < 0 || target >= ids.len() as i64 {
            return Ok(false);
        }

        ids.remove(index);
        ids.insert(target as usize, item_id);
        self.reorder(&ids).await?;
        Ok(true)
    }
}

// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coordinator owning all stores and the rules that cross them.
//!
//! Single-writer by construction: every mutation goes through `&mut self`,
//! so two mutations can never interleave and the invalidate-and-refetch
//! sequence always runs to completion before the next command.
//!
//! Cross-store rules enforced here:
//! - item mutations reload the item cache *and* the list cache (item
//!   counts live on the list entity);
//! - after any list reload, an open detail whose list left the active set
//!   is closed and its cache dropped;
//! - restore switches back to the active tab and opens the returned
//!   list's detail; duplicate refreshes lists but stays where it is;
//! - activating the history tab resets the browser and fetches page one.

use cesta_api::ApiClient;
use cesta_core::{CestaError, ItemFilter, ItemPatch, ListItem, ShoppingList};
use tokio::sync::mpsc;

use crate::events::{ChangeNotifier, StoreEvent};
use crate::history::HistoryBrowser;
use crate::items::ItemDetailStore;
use crate::lists::ListStore;

/// Capacity of the store event channel.
const EVENT_BUFFER: usize = 64;

/// Which top-level view is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Active,
    History,
}

/// All client-side state for one session.
#[derive(Debug)]
pub struct Workspace {
    client: ApiClient,
    lists: ListStore,
    detail: Option<ItemDetailStore>,
    history: HistoryBrowser,
    tab: Tab,
    notifier: ChangeNotifier,
}

impl Workspace {
    /// Builds the workspace and hands back the event receiver the view
    /// layer drains after each command.
    pub fn new(client: ApiClient, history_page_size: u32) -> (Self, mpsc::Receiver<StoreEvent>) {
        let (notifier, rx) = ChangeNotifier::channel(EVENT_BUFFER);
        let workspace = Self {
            lists: ListStore::new(client.clone()),
            detail: None,
            history: HistoryBrowser::new(client.clone(), history_page_size),
            tab: Tab::Active,
            notifier,
            client,
        };
        (workspace, rx)
    }

    pub fn lists(&self) -> &ListStore {
        &self.lists
    }

    pub fn detail(&self) -> Option<&ItemDetailStore> {
        self.detail.as_ref()
    }

    pub fn history(&self) -> &HistoryBrowser {
        &self.history
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Initial load after startup.
    pub async fn load(&mut self) -> Result<(), CestaError> {
        self.refresh_lists().await
    }

    /// Reloads the list cache and applies the detail-close rule.
    pub async fn refresh_lists(&mut self) -> Result<(), CestaError> {
        self.lists.refresh().await?;
        self.close_detail_if_gone();
        self.notifier.emit(StoreEvent::ListsChanged);
        Ok(())
    }

    // --- List operations ---

    pub async fn create_list(&mut self, name: &str) -> Result<ShoppingList, CestaError> {
        let created = self.lists.create(name).await?;
        self.close_detail_if_gone();
        self.notifier.emit(StoreEvent::ListsChanged);
        Ok(created)
    }

    pub async fn rename_list(&mut self, id: i64, name: &str) -> Result<ShoppingList, CestaError> {
        let renamed = self.lists.rename(id, name).await?;
        self.close_detail_if_gone();
        self.notifier.emit(StoreEvent::ListsChanged);
        Ok(renamed)
    }

    pub async fn delete_list(&mut self, id: i64) -> Result<(), CestaError> {
        self.lists.delete(id).await?;
        self.close_detail_if_gone();
        self.notifier.emit(StoreEvent::ListsChanged);
        Ok(())
    }

    /// Finalizes or reopens a list. Finalizing the open list closes its
    /// detail, since the list leaves the active set.
    pub async fn finalize_list(
        &mut self,
        id: i64,
        finalized: bool,
    ) -> Result<ShoppingList, CestaError> {
        let updated = self.lists.set_finalized(id, finalized).await?;
        self.close_detail_if_gone();
        self.notifier.emit(StoreEvent::ListsChanged);
        Ok(updated)
    }

    // --- Detail lifecycle ---

    /// Opens the item detail for a list and loads its items.
    pub async fn open_detail(&mut self, list_id: i64) -> Result<(), CestaError> {
        let mut detail = ItemDetailStore::new(self.client.clone(), list_id);
        detail.load().await?;
        self.detail = Some(detail);
        self.notifier.emit(StoreEvent::ItemsChanged);
        Ok(())
    }

    pub fn close_detail(&mut self) {
        if self.detail.take().is_some() {
            self.notifier.emit(StoreEvent::DetailClosed);
        }
    }

    fn close_detail_if_gone(&mut self) {
        if let Some(detail) = &self.detail
            && self.lists.get(detail.list_id()).is_none()
        {
            self.detail = None;
            self.notifier.emit(StoreEvent::DetailClosed);
        }
    }

    // --- Item operations (require an open detail) ---

    pub async fn create_item(&mut self, name: &str, quantity: u32) -> Result<ListItem, CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        let created = detail.create(name, quantity).await?;
        self.after_item_mutation().await?;
        Ok(created)
    }

    pub async fn toggle_item(&mut self, item_id: i64) -> Result<(), CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        detail.toggle_purchased(item_id).await?;
        self.after_item_mutation().await
    }

    pub async fn update_item(&mut self, item_id: i64, patch: &ItemPatch) -> Result<(), CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        detail.update(item_id, patch).await?;
        self.after_item_mutation().await
    }

    pub async fn delete_item(&mut self, item_id: i64) -> Result<(), CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        detail.delete(item_id).await?;
        self.after_item_mutation().await
    }

    pub async fn reorder_items(&mut self, order: &[i64]) -> Result<(), CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        detail.reorder(order).await?;
        self.after_item_mutation().await
    }

    /// Moves an item up one position; `false` means it was already first
    /// and nothing was sent.
    pub async fn move_item_up(&mut self, item_id: i64) -> Result<bool, CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        if !detail.move_up(item_id).await? {
            return Ok(false);
        }
        self.after_item_mutation().await?;
        Ok(true)
    }

    /// Moves an item down one position; `false` means it was already last
    /// and nothing was sent.
    pub async fn move_item_down(&mut self, item_id: i64) -> Result<bool, CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        if !detail.move_down(item_id).await? {
            return Ok(false);
        }
        self.after_item_mutation().await?;
        Ok(true)
    }

    /// Sets the read-time purchased filter on the open detail.
    pub fn set_item_filter(&mut self, filter: ItemFilter) -> Result<(), CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        detail.set_filter(filter);
        self.notifier.emit(StoreEvent::ItemsChanged);
        Ok(())
    }

    /// Sets the read-time search text on the open detail.
    pub fn set_item_search(&mut self, search: impl Into<String>) -> Result<(), CestaError> {
        let detail = self.detail.as_mut().ok_or_else(no_open_list)?;
        detail.set_search(search);
        self.notifier.emit(StoreEvent::ItemsChanged);
        Ok(())
    }

    /// Item counts live on the list entity, so the list cache reloads
    /// along with the items after every item mutation.
    async fn after_item_mutation(&mut self) -> Result<(), CestaError> {
        self.lists.refresh().await?;
        self.close_detail_if_gone();
        self.notifier.emit(StoreEvent::ItemsChanged);
        self.notifier.emit(StoreEvent::ListsChanged);
        Ok(())
    }

    // --- Tabs and history ---

    /// Switches tabs. Activating the history tab always resets the
    /// browser and fetches the first page under the current filters.
    pub async fn switch_tab(&mut self, tab: Tab) -> Result<(), CestaError> {
        self.tab = tab;
        self.notifier.emit(StoreEvent::TabChanged);
        if tab == Tab::History {
            self.history.reset();
            let result = self.history.load_more().await;
            self.notifier.emit(StoreEvent::HistoryChanged);
            result?;
        }
        Ok(())
    }

    pub async fn set_history_search(
        &mut self,
        search: impl Into<String>,
    ) -> Result<(), CestaError> {
        if self.history.set_search(search) {
            self.reload_history().await?;
        }
        Ok(())
    }

    pub async fn set_history_period(
        &mut self,
        period: cesta_core::Period,
    ) -> Result<(), CestaError> {
        if self.history.set_period(period) {
            self.reload_history().await?;
        }
        Ok(())
    }

    pub async fn set_history_from(
        &mut self,
        from: Option<chrono::NaiveDate>,
    ) -> Result<(), CestaError> {
        if self.history.set_from(from) {
            self.reload_history().await?;
        }
        Ok(())
    }

    pub async fn set_history_to(
        &mut self,
        to: Option<chrono::NaiveDate>,
    ) -> Result<(), CestaError> {
        if self.history.set_to(to) {
            self.reload_history().await?;
        }
        Ok(())
    }

    /// Fetches the next history page; `false` means there was nothing
    /// left to fetch.
    pub async fn load_more_history(&mut self) -> Result<bool, CestaError> {
        let applied = self.history.load_more().await?;
        if applied {
            self.notifier.emit(StoreEvent::HistoryChanged);
        }
        Ok(applied)
    }

    async fn reload_history(&mut self) -> Result<(), CestaError> {
        let result = self.history.load_more().await;
        self.notifier.emit(StoreEvent::HistoryChanged);
        result.map(|_| ())
    }

    /// Restores an archived list into the active set, then jumps to it:
    /// active tab, detail open. The history buffer itself stays untouched.
    pub async fn restore(
        &mut self,
        entry_id: i64,
        name: Option<&str>,
    ) -> Result<ShoppingList, CestaError> {
        let restored = self.client.restore_list(entry_id, name).await?;
        self.refresh_lists().await?;
        self.tab = Tab::Active;
        self.notifier.emit(StoreEvent::TabChanged);
        self.open_detail(restored.id).await?;
        Ok(restored)
    }

    /// Clones an archived list into a new active one. Stays on the
    /// current tab; the history buffer stays untouched.
    pub async fn duplicate(
        &mut self,
        entry_id: i64,
        name: Option<&str>,
    ) -> Result<ShoppingList, CestaError> {
        let cloned = self.client.duplicate_list(entry_id, name).await?;
        self.refresh_lists().await?;
        Ok(cloned)
    }
}

fn no_open_list() -> CestaError {
    CestaError::Validation("no list is open".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cesta_api::CredentialStore;
    use cesta_config::model::ApiConfig;
    use cesta_testkit::{FakeBackend, FakeBackendHandle};

    use super::*;

    async fn workspace_against(
        backend: &FakeBackendHandle,
        dir: &tempfile::TempDir,
    ) -> (Workspace, mpsc::Receiver<StoreEvent>) {
        let config = ApiConfig {
            base_url: backend.base_url().to_string(),
            timeout_secs: 5,
        };
        let credentials = Arc::new(CredentialStore::new(dir.path().join("token")));
        Workspace::new(ApiClient::new(&config, credentials).unwrap(), 10)
    }

    fn drain(rx: &mut mpsc::Receiver<StoreEvent>) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn create_list_emits_a_lists_changed_event() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (mut workspace, mut rx) = workspace_against(&backend, &dir).await;

        workspace.load().await.unwrap();
        drain(&mut rx);

        workspace.create_list("Mercado").await.unwrap();
        assert_eq!(drain(&mut rx), vec![StoreEvent::ListsChanged]);
    }

    #[tokio::test]
    async fn finalizing_the_open_list_closes_its_detail() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (mut workspace, mut rx) = workspace_against(&backend, &dir).await;

        let id = backend.seed_list("Feira").await;
        workspace.load().await.unwrap();
        workspace.open_detail(id).await.unwrap();
        drain(&mut rx);

        workspace.finalize_list(id, true).await.unwrap();

        assert!(workspace.detail().is_none());
        let events = drain(&mut rx);
        assert!(events.contains(&StoreEvent::DetailClosed));
        assert!(events.contains(&StoreEvent::ListsChanged));
    }

    #[tokio::test]
    async fn item_mutations_require_an_open_detail() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (mut workspace, _rx) = workspace_against(&backend, &dir).await;

        let err = workspace.create_item("Leite", 1).await.unwrap_err();
        assert!(matches!(err, CestaError::Validation(_)));
        let err = workspace.toggle_item(1).await.unwrap_err();
        assert!(matches!(err, CestaError::Validation(_)));
    }

    #[tokio::test]
    async fn restore_jumps_to_the_new_list_detail() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (mut workspace, _rx) = workspace_against(&backend, &dir).await;

        let source = backend.seed_finalized_list("Compras", 3).await;
        backend.seed_item(source, "Arroz", 1, true).await;

        workspace.load().await.unwrap();
        workspace.switch_tab(Tab::History).await.unwrap();
        assert_eq!(workspace.history().entries().len(), 1);

        let restored = workspace.restore(source, None).await.unwrap();

        assert_eq!(workspace.tab(), Tab::Active);
        let detail = workspace.detail().unwrap();
        assert_eq!(detail.list_id(), restored.id);
        assert_eq!(detail.items().len(), 1);
        assert!(!detail.items()[0].purchased);
        // The buffer itself was not touched by the restore.
        assert_eq!(workspace.history().entries().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_stays_on_the_history_tab() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (mut workspace, _rx) = workspace_against(&backend, &dir).await;

        let source = backend.seed_finalized_list("Churrasco", 1).await;
        backend.seed_item(source, "Carvão", 2, true).await;

        workspace.load().await.unwrap();
        workspace.switch_tab(Tab::History).await.unwrap();

        let cloned = workspace.duplicate(source, None).await.unwrap();

        assert_eq!(workspace.tab(), Tab::History);
        assert!(workspace.detail().is_none());
        assert!(workspace.lists().get(cloned.id).is_some());
        assert!(cloned.name.contains("cópia"));
    }
}

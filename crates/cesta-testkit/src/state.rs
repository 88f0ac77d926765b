// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory state for the fake backend.
//!
//! Mirrors the real backend's semantics closely enough for integration
//! tests: dense item ranks, finalized lists living only in history,
//! conflict-suffixed names for restore/duplicate, and a request log so
//! tests can assert which calls were (or were not) issued.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use cesta_core::{
    HistoryEntry, ItemPreview, ListItem, ShoppingList, Theme,
};

/// Number of items included in a history entry preview.
pub(crate) const PREVIEW_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub(crate) struct StoredList {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub finalized: bool,
    pub finalized_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredItem {
    pub id: i64,
    pub list_id: i64,
    pub name: String,
    pub quantity: u32,
    pub purchased: bool,
    pub rank: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// The whole backend dataset plus the request log.
#[derive(Debug)]
pub(crate) struct BackendState {
    pub lists: Vec<StoredList>,
    pub items: Vec<StoredItem>,
    pub users: Vec<StoredUser>,
    /// token -> user id
    pub tokens: Vec<(String, i64)>,
    pub theme: Theme,
    pub next_list_id: i64,
    pub next_item_id: i64,
    pub next_user_id: i64,
    pub next_token_id: i64,
    /// One `"METHOD /path"` line per request served.
    pub request_log: Vec<String>,
}

impl BackendState {
    pub fn new(theme: Theme) -> Self {
        Self {
            lists: Vec::new(),
            items: Vec::new(),
            users: Vec::new(),
            tokens: Vec::new(),
            theme,
            next_list_id: 1,
            next_item_id: 1,
            next_user_id: 1,
            next_token_id: 1,
            request_log: Vec::new(),
        }
    }

    pub fn insert_list(&mut self, name: &str, finalized_at: Option<DateTime<Utc>>) -> i64 {
        let id = self.next_list_id;
        self.next_list_id += 1;
        self.lists.push(StoredList {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
            finalized: finalized_at.is_some(),
            finalized_at,
        });
        id
    }

    pub fn insert_item(
        &mut self,
        list_id: i64,
        name: &str,
        quantity: u32,
        purchased: bool,
    ) -> i64 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        let rank = self.next_rank(list_id);
        self.items.push(StoredItem {
            id,
            list_id,
            name: name.to_string(),
            quantity,
            purchased,
            rank,
            created_at: Utc::now(),
        });
        id
    }

    /// Dense rank assignment: one past the current maximum, 0 for the first.
    pub fn next_rank(&self, list_id: i64) -> i64 {
        self.items
            .iter()
            .filter(|i| i.list_id == list_id)
            .map(|i| i.rank)
            .max()
            .map(|max| max + 1)
            .unwrap_or(0)
    }

    pub fn list(&self, id: i64) -> Option<&StoredList> {
        self.lists.iter().find(|l| l.id == id)
    }

    pub fn list_mut(&mut self, id: i64) -> Option<&mut StoredList> {
        self.lists.iter_mut().find(|l| l.id == id)
    }

    pub fn item_count(&self, list_id: i64) -> u32 {
        self.items.iter().filter(|i| i.list_id == list_id).count() as u32
    }

    pub fn purchased_count(&self, list_id: i64) -> u32 {
        self.items
            .iter()
            .filter(|i| i.list_id == list_id && i.purchased)
            .count() as u32
    }

    /// Items of one list in display order (rank, then creation time).
    pub fn items_of(&self, list_id: i64) -> Vec<StoredItem> {
        let mut items: Vec<StoredItem> = self
            .items
            .iter()
            .filter(|i| i.list_id == list_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.created_at.cmp(&b.created_at)));
        items
    }

    /// Active lists, newest first.
    pub fn active_lists(&self) -> Vec<&StoredList> {
        let mut lists: Vec<&StoredList> = self.lists.iter().filter(|l| !l.finalized).collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        lists
    }

    /// Finalized lists matching the history filters, newest finalization first.
    pub fn finalized_lists(
        &self,
        search: Option<&str>,
        period_days: Option<i64>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<&StoredList> {
        let cutoff = period_days.map(|days| Utc::now() - Duration::days(days));
        let mut lists: Vec<&StoredList> = self
            .lists
            .iter()
            .filter(|l| l.finalized)
            .filter(|l| match search {
                Some(needle) if !needle.trim().is_empty() => l
                    .name
                    .to_lowercase()
                    .contains(&needle.trim().to_lowercase()),
                _ => true,
            })
            .filter(|l| match (cutoff, l.finalized_at) {
                (Some(cutoff), Some(at)) => at >= cutoff,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|l| match (from, l.finalized_at) {
                (Some(from), Some(at)) => at.date_naive() >= from,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|l| match (to, l.finalized_at) {
                (Some(to), Some(at)) => at.date_naive() <= to,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();
        lists.sort_by(|a, b| b.finalized_at.cmp(&a.finalized_at).then(b.id.cmp(&a.id)));
        lists
    }

    /// Picks a list name that does not collide with any existing list,
    /// appending a `(suffix)` / `(suffix N)` marker on conflict.
    pub fn unique_list_name(&self, desired: &str, suffix: &str) -> String {
        if !self.lists.iter().any(|l| l.name == desired) {
            return desired.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = if n == 1 {
                format!("{desired} ({suffix})")
            } else {
                format!("{desired} ({suffix} {n})")
            };
            if !self.lists.iter().any(|l| l.name == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn user_by_token(&self, token: &str) -> Option<&StoredUser> {
        let user_id = self
            .tokens
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, id)| *id)?;
        self.users.iter().find(|u| u.id == user_id)
    }

    // --- Wire rendering ---

    pub fn render_list(&self, list: &StoredList) -> ShoppingList {
        ShoppingList {
            id: list.id,
            name: list.name.clone(),
            created_at: list.created_at.to_rfc3339(),
            finalized: list.finalized,
            finalized_at: list.finalized_at.map(|t| t.to_rfc3339()),
            item_count: self.item_count(list.id),
        }
    }

    pub fn render_item(item: &StoredItem) -> ListItem {
        ListItem {
            id: item.id,
            list_id: item.list_id,
            name: item.name.clone(),
            quantity: item.quantity,
            purchased: item.purchased,
            rank: item.rank,
            created_at: Some(item.created_at.to_rfc3339()),
        }
    }

    pub fn render_history_entry(&self, list: &StoredList) -> HistoryEntry {
        let preview = self
            .items_of(list.id)
            .iter()
            .take(PREVIEW_LIMIT)
            .map(|i| ItemPreview {
                name: i.name.clone(),
                quantity: i.quantity,
                purchased: i.purchased,
            })
            .collect();
        HistoryEntry {
            id: list.id,
            name: list.name.clone(),
            finalized_at: list.finalized_at.map(|t| t.to_rfc3339()),
            item_count: self.item_count(list.id),
            preview,
        }
    }
}

// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store-change notifications.
//!
//! Stores never render anything; they emit [`StoreEvent`]s through a
//! [`ChangeNotifier`] and the view layer drains the receiving end after
//! each command to decide what to redraw.

use tokio::sync::mpsc;
use tracing::debug;

/// What changed, from the view layer's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The active list cache was replaced.
    ListsChanged,
    /// The open detail's item cache was replaced.
    ItemsChanged,
    /// The history buffer gained a page or was reset.
    HistoryChanged,
    /// The open detail closed, by request or because its list left the
    /// active set.
    DetailClosed,
    /// The workspace switched tabs.
    TabChanged,
}

/// Fire-and-forget sender side of the store event channel.
///
/// Emission never blocks a store mutation: if the view has fallen behind
/// and the channel is full, the event is dropped. Redraws are driven by
/// draining the channel, so a dropped event at worst coalesces into the
/// next one.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: mpsc::Sender<StoreEvent>,
}

impl ChangeNotifier {
    /// Creates the notifier and the receiver the view layer drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StoreEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: StoreEvent) {
        if let Err(e) = self.tx.try_send(event) {
            debug!(event = ?event, error = %e, "store event dropped");
        }
    }
}

// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side state for the shopping-list manager.
//!
//! The server is the sole source of truth. Every store follows the same
//! synchronization contract: validate locally, call the backend, and on
//! success reload the affected caches wholesale. Nothing is patched in
//! place, so after any successful mutation the next read reflects the
//! server's view exactly.
//!
//! [`Workspace`] owns the stores and the rules that cross them; the view
//! layer drives it and drains [`StoreEvent`]s to decide what to redraw.

pub mod events;
pub mod history;
pub mod items;
pub mod lists;
pub mod workspace;

pub use events::{ChangeNotifier, StoreEvent};
pub use history::{HistoryBrowser, HistoryPhase};
pub use items::ItemDetailStore;
pub use lists::ListStore;
pub use workspace::{Tab, Workspace};

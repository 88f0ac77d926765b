// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the cesta workspace.
//!
//! This crate provides the shared error type and the wire types of the
//! shopping-list backend contract. All other cesta crates build on these.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CestaError;
pub use types::{
    Account, ExportFormat, ExportPayload, HealthInfo, HistoryEntry, HistoryPage, ItemFilter,
    ItemPatch, ItemPreview, ListItem, ListSummary, PageMeta, Period, ShoppingList, Theme,
    ThemePrefs, TokenResponse, VersionInfo,
};

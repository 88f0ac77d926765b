// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend wire types and shared client enums.
//!
//! Field names follow the backend's Portuguese JSON contract via serde
//! renames; the Rust side uses English names throughout.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// --- List types ---

/// An active or finalized shopping list as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    /// Opaque server timestamp (ISO 8601 text, displayed as-is).
    #[serde(rename = "criado_em")]
    pub created_at: String,
    #[serde(rename = "finalizada")]
    pub finalized: bool,
    /// Present iff the list is finalized.
    #[serde(rename = "finalizada_em")]
    pub finalized_at: Option<String>,
    /// Server-computed denormalized count, refreshed on every reload.
    #[serde(rename = "itens_count", default)]
    pub item_count: u32,
}

/// Aggregate counts for one list (`/listas/{id}/resumo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: i64,
    #[serde(rename = "itens")]
    pub items: u32,
    #[serde(rename = "comprados")]
    pub purchased: u32,
}

// --- Item types ---

/// An item belonging to exactly one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: i64,
    #[serde(rename = "lista_id")]
    pub list_id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "comprado")]
    pub purchased: bool,
    /// Dense per-list ordering rank matching display order. The server
    /// reassigns ranks on reorder; the client never computes them.
    #[serde(rename = "ordem")]
    pub rank: i64,
    #[serde(rename = "criado_em")]
    pub created_at: Option<String>,
}

/// Partial update body for an item. Only populated fields are serialized,
/// so a purchased toggle and a rename travel through the same endpoint
/// without touching each other's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "quantidade", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(rename = "comprado", skip_serializing_if = "Option::is_none")]
    pub purchased: Option<bool>,
}

impl ItemPatch {
    /// Patch that renames the item.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch that changes the quantity.
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Patch that sets the purchased flag.
    pub fn purchased(purchased: bool) -> Self {
        Self {
            purchased: Some(purchased),
            ..Self::default()
        }
    }

    /// True when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.purchased.is_none()
    }
}

// --- History types ---

/// One archived list inside a history page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "finalizada_em")]
    pub finalized_at: Option<String>,
    #[serde(rename = "itens_count", default)]
    pub item_count: u32,
    /// Bounded prefix of the entry's items, in rank order.
    #[serde(rename = "preview_itens", default)]
    pub preview: Vec<ItemPreview>,
}

impl HistoryEntry {
    /// Number of items beyond the bounded preview prefix.
    pub fn remaining(&self) -> u32 {
        self.item_count.saturating_sub(self.preview.len() as u32)
    }
}

/// A single item inside a history entry preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPreview {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidade", default = "default_preview_quantity")]
    pub quantity: u32,
    #[serde(rename = "comprado", default)]
    pub purchased: bool,
}

fn default_preview_quantity() -> u32 {
    1
}

/// One page of history results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(rename = "data")]
    pub entries: Vec<HistoryEntry>,
    pub meta: PageMeta,
}

/// Server pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub has_more: bool,
}

// --- Filter enums ---

/// Period presets accepted by the history endpoint.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Period {
    #[default]
    #[strum(serialize = "todos")]
    #[serde(rename = "todos")]
    All,
    #[strum(serialize = "7d")]
    #[serde(rename = "7d")]
    Last7Days,
    #[strum(serialize = "30d")]
    #[serde(rename = "30d")]
    Last30Days,
    #[strum(serialize = "90d")]
    #[serde(rename = "90d")]
    Last90Days,
    /// Explicit start/end date pair; only valid once both dates are set.
    #[strum(serialize = "custom")]
    #[serde(rename = "custom")]
    Custom,
}

/// Client-side item filter applied on read.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ItemFilter {
    #[default]
    #[strum(serialize = "todos")]
    #[serde(rename = "todos")]
    All,
    #[strum(serialize = "comprados")]
    #[serde(rename = "comprados")]
    Purchased,
    #[strum(serialize = "pendentes")]
    #[serde(rename = "pendentes")]
    Pending,
}

/// UI theme persisted in the backend preferences.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Theme {
    #[default]
    #[strum(serialize = "claro")]
    #[serde(rename = "claro")]
    Light,
    #[strum(serialize = "escuro")]
    #[serde(rename = "escuro")]
    Dark,
}

/// Export formats supported by `/listas/{id}/exportar`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ExportFormat {
    #[default]
    #[strum(serialize = "txt")]
    Txt,
    #[strum(serialize = "csv")]
    Csv,
}

impl ExportFormat {
    /// File extension used for fallback filenames.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Result of a list export: raw bytes plus the server-derived filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// From `Content-Disposition`, or a generated `lista-<id>.<ext>` fallback.
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// --- Preference and meta types ---

/// Backend-persisted UI preferences (`/config`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePrefs {
    #[serde(rename = "tema")]
    pub theme: Theme,
}

/// Build/deployment metadata (`/version`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub author: String,
    pub docs: String,
    pub privacy: String,
}

/// Liveness report (`/health`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    pub database: bool,
    pub timestamp: String,
}

// --- Auth types ---

/// The authenticated user (`/auth/me`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

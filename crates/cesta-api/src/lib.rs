// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote API client for the shopping-list backend.
//!
//! [`ApiClient`] wraps the REST contract with typed async operations;
//! [`CredentialStore`] persists the bearer token between sessions. Both are
//! consumed by the stores in `cesta-store` and directly by CLI commands.

pub mod client;
pub mod credentials;

pub use client::{ApiClient, HistoryQuery};
pub use credentials::CredentialStore;

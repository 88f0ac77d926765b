// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process fake backend for integration tests.
//!
//! Spins up the full REST contract on an ephemeral port, backed by plain
//! in-memory state that tests can seed and inspect directly:
//!
//! ```no_run
//! # async fn demo() -> Result<(), cesta_core::CestaError> {
//! use cesta_testkit::FakeBackend;
//!
//! let backend = FakeBackend::new().spawn().await?;
//! let list_id = backend.seed_list("Mercado").await;
//! backend.seed_item(list_id, "Leite", 2, false).await;
//! // point an ApiClient at backend.base_url() ...
//! # Ok(())
//! # }
//! ```
//!
//! Every request is appended to a log so tests can assert not just on
//! resulting state but on which calls were (or were not) made.

pub mod server;
mod state;

pub use server::{FakeBackend, FakeBackendHandle};

// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateless forwarding proxy for the shopping-list backend.
//!
//! Serves a single catch-all route that strips a configured path prefix
//! (default `/api`) and forwards everything else verbatim to the backend
//! origin. Useful when the backend runs on another host or port and the
//! client should only ever talk to one local address.

pub mod server;

pub use server::{router, run, ProxyState};

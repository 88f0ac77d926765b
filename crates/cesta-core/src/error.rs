// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the cesta workspace.

use thiserror::Error;

/// The primary error type used across all cesta crates.
#[derive(Debug, Error)]
pub enum CestaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be sent or no response arrived.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered with a non-success status. The message is the
    /// human-readable text extracted from the error body, or a generic
    /// status-derived fallback.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A 401 on an operation that requires authentication. The stored
    /// credential has already been cleared when this is raised.
    #[error("authentication required")]
    AuthRequired,

    /// Input rejected locally, before any network call.
    #[error("{0}")]
    Validation(String),

    /// Reading or writing the persisted credential failed.
    #[error("credential storage error: {message}")]
    Credential {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CestaError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CestaError::Http { status, .. } => Some(*status),
            CestaError::AuthRequired => Some(401),
            _ => None,
        }
    }
}

// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent bearer-token storage.
//!
//! A single token string lives at a fixed file path (config `auth.token_path`).
//! Absence of the file means unauthenticated. The in-memory copy is write-through:
//! `save`/`clear` update disk first, then the cache.

use std::fmt;
use std::path::{Path, PathBuf};

use cesta_core::CestaError;
use tokio::sync::RwLock;
use tracing::debug;

/// Stores the bearer credential for the backend session.
pub struct CredentialStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Creates a store backed by the given file path. No I/O happens here;
    /// the file is read lazily on the first [`get`](Self::get).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    /// The file path the token is persisted at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored token, if any.
    ///
    /// Falls back to reading the file when the cache is empty, so a token
    /// written by another process (e.g. `cesta login` in a second terminal)
    /// is picked up without a restart.
    pub async fn get(&self) -> Option<String> {
        if let Some(token) = self.cached.read().await.clone() {
            return Some(token);
        }
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim().to_string();
                if token.is_empty() {
                    return None;
                }
                *self.cached.write().await = Some(token.clone());
                Some(token)
            }
            Err(_) => None,
        }
    }

    /// Persists a new token, replacing any previous one.
    pub async fn save(&self, token: &str) -> Result<(), CestaError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CestaError::Credential {
                    message: format!("failed to create {}: {e}", parent.display()),
                    source: Some(Box::new(e)),
                })?;
        }
        tokio::fs::write(&self.path, token)
            .await
            .map_err(|e| CestaError::Credential {
                message: format!("failed to write {}: {e}", self.path.display()),
                source: Some(Box::new(e)),
            })?;
        *self.cached.write().await = Some(token.to_string());
        debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    /// Removes the stored token. Clearing an already-absent token is not
    /// an error.
    pub async fn clear(&self) -> Result<(), CestaError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CestaError::Credential {
                    message: format!("failed to remove {}: {e}", self.path.display()),
                    source: Some(Box::new(e)),
                });
            }
        }
        *self.cached.write().await = None;
        debug!(path = %self.path.display(), "credential cleared");
        Ok(())
    }
}

// Manual impl so a token never appears in debug output.
impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

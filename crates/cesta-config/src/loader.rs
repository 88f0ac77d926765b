// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cesta.toml` > `~/.config/cesta/cesta.toml` > `/etc/cesta/cesta.toml`
//! with environment variable overrides via `CESTA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CestaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cesta/cesta.toml` (system-wide)
/// 3. `~/.config/cesta/cesta.toml` (user XDG config)
/// 4. `./cesta.toml` (local directory)
/// 5. `CESTA_*` environment variables
pub fn load_config() -> Result<CestaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CestaConfig::default()))
        .merge(Toml::file("/etc/cesta/cesta.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("cesta/cesta.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("cesta.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and for callers that already hold the TOML text.
pub fn load_config_from_str(toml_content: &str) -> Result<CestaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CestaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CestaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CestaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that underscore-containing
/// key names stay intact: `CESTA_API_BASE_URL` must map to `api.base_url`,
/// not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("CESTA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CESTA_API_BASE_URL -> "api_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("api_", "api.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("ui_", "ui.", 1)
            .replacen("proxy_", "proxy.", 1);
        mapped.into()
    })
}

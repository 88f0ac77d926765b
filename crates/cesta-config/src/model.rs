// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the cesta client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level cesta configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CestaConfig {
    /// Backend endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Credential storage settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Interactive shell settings.
    #[serde(default)]
    pub ui: UiConfig,

    /// Forwarding proxy settings.
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL all backend paths are appended to, including any path
    /// prefix the deployment serves under (e.g. `/api`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Credential storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// File the bearer token is persisted to. Absence of the file means
    /// unauthenticated.
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

fn default_token_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cesta").join("token"))
        .unwrap_or_else(|| std::path::PathBuf::from("cesta-token"))
        .to_string_lossy()
        .into_owned()
}

/// Interactive shell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// Page size requested from the history endpoint.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            history_page_size: default_history_page_size(),
            log_level: default_log_level(),
        }
    }
}

fn default_history_page_size() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Forwarding proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Socket address the proxy listens on.
    #[serde(default = "default_proxy_listen")]
    pub listen: String,

    /// Backend origin requests are forwarded to. Required to run the proxy;
    /// `None` leaves the proxy unconfigured.
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Inbound path prefix stripped before forwarding.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: default_proxy_listen(),
            backend_url: None,
            path_prefix: default_path_prefix(),
        }
    }
}

fn default_proxy_listen() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_path_prefix() -> String {
    "/api".to_string()
}

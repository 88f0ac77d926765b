// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The forwarding proxy server.
//!
//! Every inbound request is handled the same way: strip the configured
//! path prefix, forward method/headers/body to the backend origin, and
//! relay the backend's status/headers/body back. The proxy holds no
//! state per request and never inspects bodies.
//!
//! Header handling: `host` and `content-length` are dropped from the
//! forwarded request (the upstream client recomputes them), and
//! `content-length`/`content-encoding`/`transfer-encoding` are dropped
//! from the relayed response since the proxy re-frames the body it
//! already decoded. Redirects are relayed, not followed.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use cesta_config::model::ProxyConfig;
use cesta_core::CestaError;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Request headers never forwarded to the backend.
const REQUEST_SKIP: &[&str] = &["host", "content-length"];

/// Response headers never relayed to the caller.
const RESPONSE_SKIP: &[&str] = &["content-length", "content-encoding", "transfer-encoding"];

/// Shared state for the forwarding handler.
#[derive(Debug, Clone)]
pub struct ProxyState {
    upstream: reqwest::Client,
    backend_url: String,
    path_prefix: String,
}

impl ProxyState {
    /// Builds the state from the `[proxy]` config section. A missing
    /// backend origin is a configuration error; the proxy refuses to
    /// start rather than answering every request with a failure.
    pub fn new(config: &ProxyConfig) -> Result<Self, CestaError> {
        let backend_url = config
            .backend_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                CestaError::Config("proxy.backend_url is not configured".to_string())
            })?;

        let upstream = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CestaError::Internal(format!("failed to build upstream client: {e}")))?;

        Ok(Self {
            upstream,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            path_prefix: config.path_prefix.clone(),
        })
    }

    /// Target URL for an inbound path and query.
    fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let stripped = path.strip_prefix(self.path_prefix.as_str()).unwrap_or(path);
        match query {
            Some(query) => format!("{}{stripped}?{query}", self.backend_url),
            None => format!("{}{stripped}", self.backend_url),
        }
    }
}

/// Builds the proxy router: a single catch-all forwarder.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .fallback(forward)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until shutdown.
pub async fn run(config: &ProxyConfig) -> Result<(), CestaError> {
    let state = ProxyState::new(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .map_err(|e| CestaError::Network {
            message: format!("failed to bind proxy to {}: {e}", config.listen),
            source: Some(Box::new(e)),
        })?;

    info!(addr = %config.listen, prefix = %config.path_prefix, "proxy listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| CestaError::Network {
            message: format!("proxy server error: {e}"),
            source: Some(Box::new(e)),
        })
}

async fn forward(State(state): State<ProxyState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("failed to read request body: {e}"),
            )
                .into_response();
        }
    };

    let target = state.target_url(parts.uri.path(), parts.uri.query());
    debug!(method = %parts.method, target = %target, "forwarding request");

    let method = match reqwest::Method::from_bytes(parts.method.as_str().as_bytes()) {
        Ok(method) => method,
        Err(_) => {
            return (StatusCode::METHOD_NOT_ALLOWED, "unsupported method").into_response();
        }
    };

    let mut upstream_request = state.upstream.request(method, &target);
    for (name, value) in &parts.headers {
        if skip_header(name.as_str(), REQUEST_SKIP) {
            continue;
        }
        upstream_request = upstream_request.header(name.as_str(), value.as_bytes());
    }
    if !bytes.is_empty() {
        upstream_request = upstream_request.body(bytes.to_vec());
    }

    let upstream_response = match upstream_request.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(target = %target, error = %e, "backend unreachable");
            return (
                StatusCode::BAD_GATEWAY,
                format!("failed to reach backend: {e}"),
            )
                .into_response();
        }
    };

    let status = StatusCode::from_u16(upstream_response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);

    let mut headers = HeaderMap::new();
    for (name, value) in upstream_response.headers() {
        if skip_header(name.as_str(), RESPONSE_SKIP) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }

    let body = match upstream_response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(target = %target, error = %e, "failed to read backend response");
            return (
                StatusCode::BAD_GATEWAY,
                format!("failed to read backend response: {e}"),
            )
                .into_response();
        }
    };

    (status, headers, Body::from(body.to_vec())).into_response()
}

fn skip_header(name: &str, skip: &[&str]) -> bool {
    skip.iter().any(|s| name.eq_ignore_ascii_case(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_for(backend_url: &str, prefix: &str) -> ProxyState {
        ProxyState::new(&ProxyConfig {
            listen: "127.0.0.1:0".to_string(),
            backend_url: Some(backend_url.to_string()),
            path_prefix: prefix.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn prefix_is_stripped_and_query_preserved() {
        let state = state_for("http://backend:8000", "/api");
        assert_eq!(
            state.target_url("/api/listas", None),
            "http://backend:8000/listas"
        );
        assert_eq!(
            state.target_url("/api/historico", Some("page=2&limit=10")),
            "http://backend:8000/historico?page=2&limit=10"
        );
    }

    #[test]
    fn paths_outside_the_prefix_pass_through_unchanged() {
        let state = state_for("http://backend:8000", "/api");
        assert_eq!(state.target_url("/health", None), "http://backend:8000/health");
    }

    #[test]
    fn trailing_slash_on_the_backend_is_trimmed() {
        let state = state_for("http://backend:8000/", "/api");
        assert_eq!(
            state.target_url("/api/listas", None),
            "http://backend:8000/listas"
        );
    }

    #[test]
    fn missing_backend_url_refuses_to_start() {
        let err = ProxyState::new(&ProxyConfig {
            listen: "127.0.0.1:0".to_string(),
            backend_url: None,
            path_prefix: "/api".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, CestaError::Config(_)));

        let err = ProxyState::new(&ProxyConfig {
            listen: "127.0.0.1:0".to_string(),
            backend_url: Some("   ".to_string()),
            path_prefix: "/api".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, CestaError::Config(_)));
    }

    #[test]
    fn header_filters_are_case_insensitive() {
        assert!(skip_header("Host", REQUEST_SKIP));
        assert!(skip_header("CONTENT-LENGTH", REQUEST_SKIP));
        assert!(!skip_header("authorization", REQUEST_SKIP));
        assert!(skip_header("Transfer-Encoding", RESPONSE_SKIP));
        assert!(!skip_header("content-disposition", RESPONSE_SKIP));
    }
}

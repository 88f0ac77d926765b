// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the shopping-list backend.
//!
//! Provides [`ApiClient`] with one async operation per backend capability:
//! list CRUD + finalize + export, item CRUD + reorder, history
//! list/restore/duplicate, preferences, version/health, and auth flows.
//!
//! Uniform request rules:
//! - JSON bodies and `Accept: application/json` everywhere except export,
//!   which fetches bytes.
//! - A bearer credential is attached automatically when one is stored,
//!   for every operation except `register`, `login`, and `export_list`.
//! - Non-success statuses become [`CestaError::Http`] carrying the `error`
//!   or `detail` field of the body, with an `HTTP error <status>` fallback.
//! - A 401 on an authenticated operation clears the stored credential and
//!   becomes [`CestaError::AuthRequired`].
//! - No operation retries; a failed call is terminal.

use std::sync::Arc;
use std::time::Duration;

use cesta_config::model::ApiConfig;
use cesta_core::{
    Account, CestaError, ExportFormat, ExportPayload, HealthInfo, HistoryPage, ItemPatch,
    ListItem, ListSummary, Period, ShoppingList, Theme, ThemePrefs, TokenResponse, VersionInfo,
};
use chrono::NaiveDate;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::credentials::CredentialStore;

/// Query parameters for the history endpoint.
///
/// `periodo` is omitted for [`Period::All`], `busca` when empty, and the
/// date pair travels only with [`Period::Custom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// 1-based page cursor.
    pub page: u32,
    /// Page size (`limit`).
    pub limit: u32,
    pub period: Period,
    /// Free-text search (`busca`).
    pub search: String,
    /// Custom period start (`data_inicio`).
    pub from: Option<NaiveDate>,
    /// Custom period end (`data_fim`).
    pub to: Option<NaiveDate>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            period: Period::All,
            search: String::new(),
            from: None,
            to: None,
        }
    }
}

impl HistoryQuery {
    /// Serializes the query into URL parameters, applying the omission rules.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if self.period != Period::All {
            params.push(("periodo", self.period.to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("busca", search.to_string()));
        }
        if self.period == Period::Custom {
            if let Some(from) = self.from {
                params.push(("data_inicio", from.format("%Y-%m-%d").to_string()));
            }
            if let Some(to) = self.to {
                params.push(("data_fim", to.format("%Y-%m-%d").to_string()));
            }
        }
        params
    }
}

/// Error payload shape used by the backend: either `{"error": "..."}` or
/// `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

/// Typed client for the shopping-list REST backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl ApiClient {
    /// Creates a client from the `[api]` config section and a credential store.
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialStore>) -> Result<Self, CestaError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CestaError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// The credential store this client attaches bearer tokens from.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Builds a request for `path`, attaching the bearer token when `auth`
    /// is set and a token is stored.
    async fn request(&self, method: Method, path: &str, auth: bool) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut req = self.http.request(method, url);
        if auth && let Some(token) = self.credentials.get().await {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Maps non-success statuses to errors. A 401 on an authenticated
    /// operation clears the stored credential before raising.
    async fn check(
        &self,
        response: reqwest::Response,
        auth: bool,
    ) -> Result<reqwest::Response, CestaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && auth {
            if let Err(e) = self.credentials.clear().await {
                warn!(error = %e, "failed to clear credential after 401");
            }
            return Err(CestaError::AuthRequired);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "backend returned an error");
        Err(CestaError::Http {
            status: status.as_u16(),
            message: extract_error_message(&body, status.as_u16()),
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, CestaError> {
        response
            .json::<T>()
            .await
            .map_err(|e| CestaError::Internal(format!("failed to decode response body: {e}")))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, CestaError> {
        req.send().await.map_err(|e| CestaError::Network {
            message: format!("request failed: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Completes an operation whose success payload is either a bare 204 or
    /// a `{"ok": true}` style body; the body is accepted without inspection.
    async fn no_content(&self, response: reqwest::Response, auth: bool) -> Result<(), CestaError> {
        self.check(response, auth).await?;
        Ok(())
    }

    // --- Lists ---

    /// `GET /listas`: the active list set.
    pub async fn lists(&self) -> Result<Vec<ShoppingList>, CestaError> {
        let req = self.request(Method::GET, "/listas", true).await;
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `POST /listas {nome}`.
    pub async fn create_list(&self, name: &str) -> Result<ShoppingList, CestaError> {
        let req = self
            .request(Method::POST, "/listas", true)
            .await
            .json(&json!({ "nome": name }));
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `PUT /listas/{id} {nome}`.
    pub async fn rename_list(&self, id: i64, name: &str) -> Result<ShoppingList, CestaError> {
        let req = self
            .request(Method::PUT, &format!("/listas/{id}"), true)
            .await
            .json(&json!({ "nome": name }));
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `DELETE /listas/{id}`.
    pub async fn delete_list(&self, id: i64) -> Result<(), CestaError> {
        let req = self
            .request(Method::DELETE, &format!("/listas/{id}"), true)
            .await;
        self.no_content(self.send(req).await?, true).await
    }

    /// `GET /listas/{id}/resumo`: item/purchased counts.
    pub async fn list_summary(&self, id: i64) -> Result<ListSummary, CestaError> {
        let req = self
            .request(Method::GET, &format!("/listas/{id}/resumo"), true)
            .await;
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `POST /listas/{id}/finalizar {finalizada}`: finalize or reopen.
    pub async fn set_finalized(
        &self,
        id: i64,
        finalized: bool,
    ) -> Result<ShoppingList, CestaError> {
        let req = self
            .request(Method::POST, &format!("/listas/{id}/finalizar"), true)
            .await
            .json(&json!({ "finalizada": finalized }));
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `GET /listas/{id}/exportar?formato=`: unauthenticated binary fetch.
    ///
    /// The filename comes from `Content-Disposition`, falling back to a
    /// generated `lista-<id>.<ext>` name.
    pub async fn export_list(
        &self,
        id: i64,
        format: ExportFormat,
    ) -> Result<ExportPayload, CestaError> {
        let req = self
            .request(Method::GET, &format!("/listas/{id}/exportar"), false)
            .await
            .query(&[("formato", format.to_string())])
            // The export body is raw bytes, not JSON.
            .header(header::ACCEPT, "*/*");
        let response = self.check(self.send(req).await?, false).await?;

        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_attachment_filename)
            .unwrap_or_else(|| format!("lista-{id}.{}", format.extension()));
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CestaError::Network {
                message: format!("failed to read export body: {e}"),
                source: Some(Box::new(e)),
            })?
            .to_vec();

        Ok(ExportPayload {
            filename,
            content_type,
            bytes,
        })
    }

    // --- Items ---

    /// `GET /listas/{id}/itens` in rank order.
    pub async fn items(&self, list_id: i64) -> Result<Vec<ListItem>, CestaError> {
        let req = self
            .request(Method::GET, &format!("/listas/{list_id}/itens"), true)
            .await;
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `POST /listas/{id}/itens {nome, quantidade}`.
    pub async fn create_item(
        &self,
        list_id: i64,
        name: &str,
        quantity: u32,
    ) -> Result<ListItem, CestaError> {
        let req = self
            .request(Method::POST, &format!("/listas/{list_id}/itens"), true)
            .await
            .json(&json!({ "nome": name, "quantidade": quantity }));
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `PUT /listas/{id}/itens/{item_id}`: partial update. Purchased
    /// toggles and name/quantity edits all travel through this one path.
    pub async fn update_item(
        &self,
        list_id: i64,
        item_id: i64,
        patch: &ItemPatch,
    ) -> Result<ListItem, CestaError> {
        let req = self
            .request(
                Method::PUT,
                &format!("/listas/{list_id}/itens/{item_id}"),
                true,
            )
            .await
            .json(patch);
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `DELETE /listas/{id}/itens/{item_id}`.
    pub async fn delete_item(&self, list_id: i64, item_id: i64) -> Result<(), CestaError> {
        let req = self
            .request(
                Method::DELETE,
                &format!("/listas/{list_id}/itens/{item_id}"),
                true,
            )
            .await;
        self.no_content(self.send(req).await?, true).await
    }

    /// `PUT /listas/{id}/itens/ordenar {ordem}`: submits the complete new
    /// id sequence; the server reassigns ranks.
    pub async fn reorder_items(&self, list_id: i64, order: &[i64]) -> Result<(), CestaError> {
        let req = self
            .request(
                Method::PUT,
                &format!("/listas/{list_id}/itens/ordenar"),
                true,
            )
            .await
            .json(&json!({ "ordem": order }));
        self.no_content(self.send(req).await?, true).await
    }

    // --- History ---

    /// `GET /historico` with pagination and filters.
    pub async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, CestaError> {
        let req = self
            .request(Method::GET, "/historico", true)
            .await
            .query(&query.params());
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `POST /historico/restaurar/{id}`: returns the new active list.
    /// The server resets purchases and picks the final name.
    pub async fn restore_list(
        &self,
        id: i64,
        name: Option<&str>,
    ) -> Result<ShoppingList, CestaError> {
        let mut req = self
            .request(Method::POST, &format!("/historico/restaurar/{id}"), true)
            .await;
        if let Some(name) = name {
            req = req.json(&json!({ "nome": name }));
        }
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `POST /historico/duplicar/{id}`: returns an independent clone with
    /// purchased flags preserved.
    pub async fn duplicate_list(
        &self,
        id: i64,
        name: Option<&str>,
    ) -> Result<ShoppingList, CestaError> {
        let mut req = self
            .request(Method::POST, &format!("/historico/duplicar/{id}"), true)
            .await;
        if let Some(name) = name {
            req = req.json(&json!({ "nome": name }));
        }
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    // --- Preferences and deployment metadata ---

    /// `GET /config`.
    pub async fn get_prefs(&self) -> Result<ThemePrefs, CestaError> {
        let req = self.request(Method::GET, "/config", true).await;
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `PUT /config {tema}`.
    pub async fn set_prefs(&self, theme: Theme) -> Result<ThemePrefs, CestaError> {
        let req = self
            .request(Method::PUT, "/config", true)
            .await
            .json(&json!({ "tema": theme }));
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `GET /version`.
    pub async fn version(&self) -> Result<VersionInfo, CestaError> {
        let req = self.request(Method::GET, "/version", true).await;
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthInfo, CestaError> {
        let req = self.request(Method::GET, "/health", true).await;
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    // --- Auth ---

    /// `POST /auth/register {nome, email, senha}`: unauthenticated.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, CestaError> {
        let req = self
            .request(Method::POST, "/auth/register", false)
            .await
            .json(&json!({ "nome": name, "email": email, "senha": password }));
        let response = self.check(self.send(req).await?, false).await?;
        self.decode(response).await
    }

    /// `POST /auth/login {email, senha}`: unauthenticated. On success the
    /// returned token is saved into the credential store.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, CestaError> {
        let req = self
            .request(Method::POST, "/auth/login", false)
            .await
            .json(&json!({ "email": email, "senha": password }));
        let response = self.check(self.send(req).await?, false).await?;
        let token: TokenResponse = self.decode(response).await?;
        self.credentials.save(&token.access_token).await?;
        Ok(token)
    }

    /// `GET /auth/me`: the authenticated account.
    pub async fn me(&self) -> Result<Account, CestaError> {
        let req = self.request(Method::GET, "/auth/me", true).await;
        let response = self.check(self.send(req).await?, true).await?;
        self.decode(response).await
    }

    /// `POST /auth/logout`. The local token is cleared regardless of what
    /// the server answered; a 401 counts as already signed out.
    pub async fn logout(&self) -> Result<(), CestaError> {
        let req = self.request(Method::POST, "/auth/logout", true).await;
        let sent = self.send(req).await;
        self.credentials.clear().await?;
        match sent {
            Ok(response) => match self.check(response, true).await {
                Ok(_) | Err(CestaError::AuthRequired) => Ok(()),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }
}

/// Extracts a human-readable message from an error body: the `error` field,
/// then `detail`, then a status-derived fallback.
fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.error.filter(|m| !m.trim().is_empty()) {
            return msg;
        }
        if let Some(msg) = parsed.detail.filter(|m| !m.trim().is_empty()) {
            return msg;
        }
    }
    format!("HTTP error {status}")
}

/// Pulls the filename out of `attachment; filename="..."`.
fn parse_attachment_filename(value: &str) -> Option<String> {
    let marker = "filename=";
    let start = value.find(marker)? + marker.len();
    let raw = value[start..].trim();
    let raw = raw.split(';').next().unwrap_or(raw).trim();
    let name = raw.trim_matches('"').trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer, dir: &tempfile::TempDir) -> ApiClient {
        let config = ApiConfig {
            base_url: server.uri(),
            timeout_secs: 5,
        };
        let credentials = Arc::new(CredentialStore::new(dir.path().join("token")));
        ApiClient::new(&config, credentials).unwrap()
    }

    fn list_json(id: i64, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "nome": name,
            "criado_em": "2026-01-10T12:00:00+00:00",
            "finalizada": false,
            "finalizada_em": null,
            "itens_count": 0
        })
    }

    #[tokio::test]
    async fn lists_decodes_portuguese_wire_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listas"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([list_json(1, "Mercado")])),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        let lists = client.lists().await.unwrap();

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, 1);
        assert_eq!(lists[0].name, "Mercado");
        assert!(!lists[0].finalized);
    }

    #[tokio::test]
    async fn detail_field_is_extracted_from_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listas/99/resumo"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "Lista não encontrada"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        let err = client.list_summary(99).await.unwrap_err();

        match err {
            CestaError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Lista não encontrada");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_field_takes_precedence_over_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/listas"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "Nome é obrigatório"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        let err = client.create_list("").await.unwrap_err();
        assert_eq!(err.to_string(), "Nome é obrigatório");
    }

    #[tokio::test]
    async fn unparseable_error_body_falls_back_to_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listas"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        let err = client.lists().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error 500");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn unauthorized_clears_the_stored_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"detail": "Não autenticado"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        client.credentials().save("stale-token").await.unwrap();

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, CestaError::AuthRequired));
        assert_eq!(client.credentials().get().await, None);
    }

    #[tokio::test]
    async fn delete_accepts_a_bare_204() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/listas/3"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        client.delete_list(3).await.unwrap();
    }

    #[tokio::test]
    async fn delete_accepts_an_ok_true_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/listas/3/itens/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        client.delete_item(3, 7).await.unwrap();
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_stored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1, "nome": "Maria", "email": "maria@example.com"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        client.credentials().save("tok-123").await.unwrap();

        let account = client.me().await.unwrap();
        assert_eq!(account.email, "maria@example.com");
    }

    #[tokio::test]
    async fn login_saves_the_returned_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(
                serde_json::json!({"email": "maria@example.com", "senha": "segredo123"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-fresh", "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);

        let token = client.login("maria@example.com", "segredo123").await.unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(client.credentials().get().await.as_deref(), Some("tok-fresh"));
    }

    #[tokio::test]
    async fn logout_clears_the_token_even_when_the_server_rejects_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        client.credentials().save("tok-old").await.unwrap();

        client.logout().await.unwrap();
        assert_eq!(client.credentials().get().await, None);
    }

    #[tokio::test]
    async fn export_takes_the_filename_from_content_disposition() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listas/4/exportar"))
            .and(query_param("formato", "csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    // set_body_raw carries the mime; wiremock overrides any
                    // inserted content-type header with the body's mime.
                    .set_body_raw("nome,quantidade,comprado\n\"Leite\",2,0", "text/csv")
                    .insert_header(
                        "content-disposition",
                        "attachment; filename=\"lista-4-mercado.csv\"",
                    ),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        let payload = client.export_list(4, ExportFormat::Csv).await.unwrap();

        assert_eq!(payload.filename, "lista-4-mercado.csv");
        assert_eq!(payload.content_type.as_deref(), Some("text/csv"));
        assert!(payload.bytes.starts_with(b"nome,quantidade"));
    }

    #[tokio::test]
    async fn export_falls_back_to_a_generated_filename() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listas/7/exportar"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Lista: Mercado"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        let payload = client.export_list(7, ExportFormat::Txt).await.unwrap();
        assert_eq!(payload.filename, "lista-7.txt");
    }

    #[tokio::test]
    async fn export_sends_a_wildcard_accept_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listas/3/exportar"))
            .and(header("accept", "*/*"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Lista: Feira"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);

        let payload = client.export_list(3, ExportFormat::Txt).await.unwrap();
        assert_eq!(payload.bytes, b"Lista: Feira");
    }

    #[tokio::test]
    async fn history_query_sends_active_filters_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historico"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "10"))
            .and(query_param("periodo", "7d"))
            .and(query_param("busca", "feira"))
            .and(query_param_is_missing("data_inicio"))
            .and(query_param_is_missing("data_fim"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [], "meta": {"page": 2, "has_more": false}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        let query = HistoryQuery {
            page: 2,
            period: Period::Last7Days,
            search: "feira".into(),
            ..HistoryQuery::default()
        };

        let page = client.history(&query).await.unwrap();
        assert_eq!(page.meta.page, 2);
        assert!(!page.meta.has_more);
    }

    #[tokio::test]
    async fn history_query_omits_periodo_and_busca_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historico"))
            .and(query_param_is_missing("periodo"))
            .and(query_param_is_missing("busca"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [], "meta": {"page": 1, "has_more": false}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, &dir);
        client.history(&HistoryQuery::default()).await.unwrap();
    }

    #[test]
    fn custom_period_query_carries_both_dates() {
        let query = HistoryQuery {
            period: Period::Custom,
            from: NaiveDate::from_ymd_opt(2026, 1, 1),
            to: NaiveDate::from_ymd_opt(2026, 1, 31),
            ..HistoryQuery::default()
        };
        let params = query.params();
        assert!(params.contains(&("periodo", "custom".to_string())));
        assert!(params.contains(&("data_inicio", "2026-01-01".to_string())));
        assert!(params.contains(&("data_fim", "2026-01-31".to_string())));
    }

    #[test]
    fn attachment_filename_parsing_handles_quoting() {
        assert_eq!(
            parse_attachment_filename("attachment; filename=\"lista-1-mercado.txt\""),
            Some("lista-1-mercado.txt".to_string())
        );
        assert_eq!(
            parse_attachment_filename("attachment; filename=plain.csv"),
            Some("plain.csv".to_string())
        );
        assert_eq!(parse_attachment_filename("inline"), None);
        assert_eq!(parse_attachment_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn error_extraction_prefers_error_then_detail() {
        assert_eq!(
            extract_error_message(r#"{"error": "boom", "detail": "other"}"#, 400),
            "boom"
        );
        assert_eq!(
            extract_error_message(r#"{"detail": "Tema inválido"}"#, 400),
            "Tema inválido"
        );
        assert_eq!(extract_error_message("not json", 502), "HTTP error 502");
        assert_eq!(extract_error_message(r#"{"detail": ""}"#, 418), "HTTP error 418");
    }
}

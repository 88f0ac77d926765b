// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fake backend server: axum routes over [`BackendState`].
//!
//! [`FakeBackend`] binds an ephemeral port and serves the full REST
//! contract; [`FakeBackendHandle`] exposes the base URL, direct state
//! seeding, and the request log. The server task is aborted on drop.

use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use cesta_core::{Account, CestaError, HistoryPage, PageMeta, Theme, ThemePrefs};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::error;

use crate::state::{BackendState, StoredUser, PREVIEW_LIMIT};

type SharedState = Arc<Mutex<BackendState>>;

/// Builder for the fake backend.
#[derive(Debug)]
pub struct FakeBackend {
    theme: Theme,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            theme: Theme::Light,
        }
    }

    /// Initial theme served by `GET /config`.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Binds `127.0.0.1:0` and starts serving.
    pub async fn spawn(self) -> Result<FakeBackendHandle, CestaError> {
        let state: SharedState = Arc::new(Mutex::new(BackendState::new(self.theme)));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| CestaError::Internal(format!("failed to bind fake backend: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| CestaError::Internal(format!("failed to read bound address: {e}")))?;

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "fake backend stopped unexpectedly");
            }
        });

        Ok(FakeBackendHandle {
            base_url: format!("http://{addr}"),
            state,
            task,
        })
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Running fake backend. Tests talk to it over HTTP via [`base_url`]
/// (pass it as `api.base_url`) and seed or inspect state directly.
///
/// [`base_url`]: FakeBackendHandle::base_url
#[derive(Debug)]
pub struct FakeBackendHandle {
    base_url: String,
    state: SharedState,
    task: tokio::task::JoinHandle<()>,
}

impl FakeBackendHandle {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Inserts an active list directly, bypassing HTTP.
    pub async fn seed_list(&self, name: &str) -> i64 {
        self.state.lock().await.insert_list(name, None)
    }

    /// Inserts a finalized list whose finalization timestamp lies
    /// `days_ago` in the past.
    pub async fn seed_finalized_list(&self, name: &str, days_ago: i64) -> i64 {
        self.state
            .lock()
            .await
            .insert_list(name, Some(Utc::now() - Duration::days(days_ago)))
    }

    /// Inserts an item directly, assigning the next dense rank.
    pub async fn seed_item(&self, list_id: i64, name: &str, quantity: u32, purchased: bool) -> i64 {
        self.state
            .lock()
            .await
            .insert_item(list_id, name, quantity, purchased)
    }

    /// Registers a user directly so tests can log in without the register
    /// round trip.
    pub async fn seed_user(&self, name: &str, email: &str, password: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.next_user_id;
        state.next_user_id += 1;
        state.users.push(StoredUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        id
    }

    /// Deletes a list out-of-band, as another client would. Used to prove
    /// that a reload reflects the server's view.
    pub async fn delete_list_directly(&self, id: i64) {
        let mut state = self.state.lock().await;
        state.lists.retain(|l| l.id != id);
        state.items.retain(|i| i.list_id != id);
    }

    /// Snapshot of the request log (`"METHOD /path"` lines, in order).
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.request_log.clone()
    }

    pub async fn clear_requests(&self) {
        self.state.lock().await.request_log.clear();
    }
}

impl Drop for FakeBackendHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/listas", get(list_lists).post(create_list))
        .route("/listas/{list_id}", put(rename_list).delete(delete_list))
        .route("/listas/{list_id}/resumo", get(list_summary))
        .route("/listas/{list_id}/finalizar", post(set_finalized))
        .route("/listas/{list_id}/exportar", get(export_list))
        .route("/listas/{list_id}/itens", get(list_items).post(create_item))
        .route("/listas/{list_id}/itens/ordenar", put(reorder_items))
        .route(
            "/listas/{list_id}/itens/{item_id}",
            put(update_item).delete(delete_item),
        )
        .route("/historico", get(history))
        .route("/historico/restaurar/{list_id}", post(restore_list))
        .route("/historico/duplicar/{list_id}", post(duplicate_list))
        .route("/config", get(get_prefs).put(set_prefs))
        .route("/version", get(version))
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn log_requests(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    state.lock().await.request_log.push(line);
    next.run(request).await
}

// --- Response helpers (the backend's `{"detail": ...}` error shape) ---

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn not_found(message: &str) -> Response {
    detail(StatusCode::NOT_FOUND, message)
}

fn bad_request(message: &str) -> Response {
    detail(StatusCode::BAD_REQUEST, message)
}

fn unauthorized() -> Response {
    detail(StatusCode::UNAUTHORIZED, "Não autenticado")
}

fn ok_true() -> Response {
    Json(json!({ "ok": true })).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

fn body_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

// --- List handlers ---

async fn list_lists(State(state): State<SharedState>) -> Response {
    let state = state.lock().await;
    let lists: Vec<_> = state
        .active_lists()
        .iter()
        .map(|l| state.render_list(l))
        .collect();
    Json(lists).into_response()
}

async fn create_list(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let name = body_str(&body, "nome").unwrap_or("").trim().to_string();
    if name.is_empty() {
        return bad_request("Nome é obrigatório");
    }
    let mut state = state.lock().await;
    let id = state.insert_list(&name, None);
    let list = match state.list(id) {
        Some(list) => list.clone(),
        None => return not_found("Lista não encontrada"),
    };
    Json(state.render_list(&list)).into_response()
}

async fn rename_list(
    State(state): State<SharedState>,
    Path(list_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let name = body_str(&body, "nome").unwrap_or("").trim().to_string();
    if name.is_empty() {
        return bad_request("Nome é obrigatório");
    }
    let mut state = state.lock().await;
    match state.list_mut(list_id) {
        Some(list) => list.name = name,
        None => return not_found("Lista não encontrada"),
    }
    let list = match state.list(list_id) {
        Some(list) => list.clone(),
        None => return not_found("Lista não encontrada"),
    };
    Json(state.render_list(&list)).into_response()
}

async fn delete_list(State(state): State<SharedState>, Path(list_id): Path<i64>) -> Response {
    let mut state = state.lock().await;
    if state.list(list_id).is_none() {
        return not_found("Lista não encontrada");
    }
    state.lists.retain(|l| l.id != list_id);
    state.items.retain(|i| i.list_id != list_id);
    ok_true()
}

async fn list_summary(State(state): State<SharedState>, Path(list_id): Path<i64>) -> Response {
    let state = state.lock().await;
    if state.list(list_id).is_none() {
        return not_found("Lista não encontrada");
    }
    Json(json!({
        "id": list_id,
        "itens": state.item_count(list_id),
        "comprados": state.purchased_count(list_id),
    }))
    .into_response()
}

async fn set_finalized(
    State(state): State<SharedState>,
    Path(list_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Response {
    // Absent body and absent field both mean "finalize".
    let finalize = body
        .as_ref()
        .and_then(|Json(b)| b.get("finalizada"))
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let mut state = state.lock().await;
    match state.list_mut(list_id) {
        Some(list) => {
            if finalize {
                if !list.finalized {
                    list.finalized = true;
                    list.finalized_at = Some(Utc::now());
                }
            } else {
                list.finalized = false;
                list.finalized_at = None;
            }
        }
        None => return not_found("Lista não encontrada"),
    }
    let list = match state.list(list_id) {
        Some(list) => list.clone(),
        None => return not_found("Lista não encontrada"),
    };
    Json(state.render_list(&list)).into_response()
}

#[derive(Debug, Deserialize)]
struct ExportParams {
    #[serde(default)]
    formato: Option<String>,
}

async fn export_list(
    State(state): State<SharedState>,
    Path(list_id): Path<i64>,
    Query(params): Query<ExportParams>,
) -> Response {
    let state = state.lock().await;
    let list = match state.list(list_id) {
        Some(list) => list.clone(),
        None => return not_found("Lista não encontrada"),
    };
    let items = state.items_of(list_id);

    let slug = {
        let s = list.name.trim().to_lowercase().replace(' ', "-");
        if s.is_empty() { "itens".to_string() } else { s }
    };
    let base = format!("lista-{list_id}-{slug}");

    let format = params.formato.as_deref().unwrap_or("txt").to_lowercase();
    let (content, media_type, filename) = if format == "csv" {
        let mut lines = vec!["nome,quantidade,comprado".to_string()];
        for item in &items {
            let escaped = item.name.replace('"', "\"\"");
            lines.push(format!(
                "\"{escaped}\",{},{}",
                item.quantity,
                if item.purchased { 1 } else { 0 }
            ));
        }
        (lines.join("\n"), "text/csv", format!("{base}.csv"))
    } else {
        let mut lines = vec![format!("Lista: {}", list.name), String::new()];
        for (idx, item) in items.iter().enumerate() {
            let marker = if item.purchased { "[x]" } else { "[ ]" };
            lines.push(format!(
                "{:02}. {marker} {} (x{})",
                idx + 1,
                item.name,
                item.quantity
            ));
        }
        (lines.join("\n"), "text/plain", format!("{base}.txt"))
    };

    (
        [
            (header::CONTENT_TYPE, media_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        content,
    )
        .into_response()
}

// --- Item handlers ---

async fn list_items(State(state): State<SharedState>, Path(list_id): Path<i64>) -> Response {
    let state = state.lock().await;
    if state.list(list_id).is_none() {
        return not_found("Lista não encontrada");
    }
    let items: Vec<_> = state
        .items_of(list_id)
        .iter()
        .map(BackendState::render_item)
        .collect();
    Json(items).into_response()
}

async fn create_item(
    State(state): State<SharedState>,
    Path(list_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let name = body_str(&body, "nome").unwrap_or("").trim().to_string();
    if name.is_empty() {
        return bad_request("Nome do item é obrigatório");
    }
    let quantity = body
        .get("quantidade")
        .and_then(Value::as_u64)
        .unwrap_or(1) as u32;

    let mut state = state.lock().await;
    if state.list(list_id).is_none() {
        return not_found("Lista não encontrada");
    }
    let id = state.insert_item(list_id, &name, quantity, false);
    let item = match state.items.iter().find(|i| i.id == id) {
        Some(item) => BackendState::render_item(item),
        None => return not_found("Item não encontrado"),
    };
    Json(item).into_response()
}

async fn update_item(
    State(state): State<SharedState>,
    Path((list_id, item_id)): Path<(i64, i64)>,
    Json(body): Json<Value>,
) -> Response {
    // Partial update: only fields present in the body are touched.
    if let Some(name) = body.get("nome") {
        if name.as_str().map(str::trim).unwrap_or("").is_empty() {
            return bad_request("Nome do item é obrigatório");
        }
    }

    let mut state = state.lock().await;
    let item = state
        .items
        .iter_mut()
        .find(|i| i.id == item_id && i.list_id == list_id);
    let item = match item {
        Some(item) => item,
        None => return not_found("Item não encontrado"),
    };

    if let Some(name) = body_str(&body, "nome") {
        item.name = name.trim().to_string();
    }
    if let Some(quantity) = body.get("quantidade").and_then(Value::as_u64) {
        item.quantity = quantity as u32;
    }
    if let Some(purchased) = body.get("comprado").and_then(Value::as_bool) {
        item.purchased = purchased;
    }
    let rendered = BackendState::render_item(item);
    Json(rendered).into_response()
}

async fn delete_item(
    State(state): State<SharedState>,
    Path((list_id, item_id)): Path<(i64, i64)>,
) -> Response {
    let mut state = state.lock().await;
    let exists = state
        .items
        .iter()
        .any(|i| i.id == item_id && i.list_id == list_id);
    if !exists {
        return not_found("Item não encontrado");
    }
    state.items.retain(|i| i.id != item_id);
    ok_true()
}

async fn reorder_items(
    State(state): State<SharedState>,
    Path(list_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let order = match body.get("ordem").and_then(Value::as_array) {
        Some(ids) if !ids.is_empty() => ids.clone(),
        _ => return bad_request("Informe uma lista de IDs em 'ordem'"),
    };

    let mut state = state.lock().await;
    if state.list(list_id).is_none() {
        return not_found("Lista não encontrada");
    }

    let mut ids = Vec::with_capacity(order.len());
    for raw in &order {
        let id = match raw.as_i64() {
            Some(id) => id,
            None => return bad_request("IDs de item inválidos"),
        };
        let belongs = state.items.iter().any(|i| i.id == id && i.list_id == list_id);
        if !belongs {
            return bad_request(&format!("Item {id} não pertence à lista"));
        }
        ids.push(id);
    }

    // Submitted ids take positions 0..n; items left out keep their relative
    // order after them.
    for (pos, id) in ids.iter().enumerate() {
        if let Some(item) = state.items.iter_mut().find(|i| i.id == *id) {
            item.rank = pos as i64;
        }
    }
    let mut remaining: Vec<(i64, i64, chrono::DateTime<Utc>)> = state
        .items
        .iter()
        .filter(|i| i.list_id == list_id && !ids.contains(&i.id))
        .map(|i| (i.id, i.rank, i.created_at))
        .collect();
    remaining.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.cmp(&b.2)));
    let offset = ids.len() as i64;
    for (pos, (id, _, _)) in remaining.iter().enumerate() {
        if let Some(item) = state.items.iter_mut().find(|i| i.id == *id) {
            item.rank = offset + pos as i64;
        }
    }

    ok_true()
}

// --- History handlers ---

#[derive(Debug, Deserialize)]
struct HistoryParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    periodo: Option<String>,
    #[serde(default)]
    busca: Option<String>,
    #[serde(default)]
    data_inicio: Option<String>,
    #[serde(default)]
    data_fim: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

async fn history(State(state): State<SharedState>, Query(params): Query<HistoryParams>) -> Response {
    let period_days = match params.periodo.as_deref() {
        Some("7d") => Some(7),
        Some("30d") => Some(30),
        Some("90d") => Some(90),
        _ => None,
    };
    let (from, to) = if params.periodo.as_deref() == Some("custom") {
        (
            parse_date(params.data_inicio.as_deref()),
            parse_date(params.data_fim.as_deref()),
        )
    } else {
        (None, None)
    };

    let state = state.lock().await;
    let filtered = state.finalized_lists(params.busca.as_deref(), period_days, from, to);
    let total = filtered.len();

    let page = params.page.max(1);
    let limit = params.limit.max(1);
    let start = ((page - 1) * limit) as usize;
    let entries: Vec<_> = filtered
        .iter()
        .skip(start)
        .take(limit as usize)
        .map(|l| state.render_history_entry(l))
        .collect();
    let has_more = (page as usize) * (limit as usize) < total;

    Json(HistoryPage {
        entries,
        meta: PageMeta { page, has_more },
    })
    .into_response()
}

async fn restore_list(
    State(state): State<SharedState>,
    Path(list_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Response {
    clone_from_history(state, list_id, body, "restaurada", true).await
}

async fn duplicate_list(
    State(state): State<SharedState>,
    Path(list_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Response {
    clone_from_history(state, list_id, body, "cópia", false).await
}

/// Shared restore/duplicate path: copies a finalized list into a new active
/// one. Restore resets purchased flags; duplicate preserves them. The source
/// entry stays in history untouched.
async fn clone_from_history(
    state: SharedState,
    list_id: i64,
    body: Option<Json<Value>>,
    suffix: &str,
    reset_purchases: bool,
) -> Response {
    let requested = body
        .as_ref()
        .and_then(|Json(b)| body_str(b, "nome"))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let mut state = state.lock().await;
    let source = match state.list(list_id) {
        Some(list) if list.finalized => list.clone(),
        _ => return not_found("Lista não encontrada no histórico"),
    };

    let desired = requested.unwrap_or_else(|| source.name.clone());
    let name = state.unique_list_name(&desired, suffix);
    let new_id = state.insert_list(&name, None);

    for item in state.items_of(source.id) {
        let purchased = if reset_purchases { false } else { item.purchased };
        state.insert_item(new_id, &item.name, item.quantity, purchased);
    }

    let list = match state.list(new_id) {
        Some(list) => list.clone(),
        None => return not_found("Lista não encontrada"),
    };
    Json(state.render_list(&list)).into_response()
}

// --- Preferences, metadata, auth ---

async fn get_prefs(State(state): State<SharedState>) -> Response {
    let theme = state.lock().await.theme;
    Json(ThemePrefs { theme }).into_response()
}

async fn set_prefs(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let theme = match body_str(&body, "tema") {
        Some("claro") => Theme::Light,
        Some("escuro") => Theme::Dark,
        _ => return bad_request("Tema inválido"),
    };
    state.lock().await.theme = theme;
    Json(ThemePrefs { theme }).into_response()
}

async fn version() -> Response {
    Json(json!({
        "version": "0.1.0-testkit",
        "author": "Cesta Contributors",
        "docs": "https://example.com/docs",
        "privacy": "https://example.com/privacy",
    }))
    .into_response()
}

async fn health() -> Response {
    Json(json!({
        "status": "ok",
        "database": true,
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .into_response()
}

async fn register(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let name = body_str(&body, "nome").unwrap_or("").trim().to_string();
    let email = body_str(&body, "email").unwrap_or("").trim().to_lowercase();
    let password = body_str(&body, "senha").unwrap_or("").to_string();
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return bad_request("Nome, email e senha são obrigatórios");
    }

    let mut state = state.lock().await;
    if state.users.iter().any(|u| u.email == email) {
        return bad_request("Email já cadastrado");
    }
    let id = state.next_user_id;
    state.next_user_id += 1;
    state.users.push(StoredUser {
        id,
        name: name.clone(),
        email: email.clone(),
        password,
    });

    (
        StatusCode::CREATED,
        Json(Account { id, name, email }),
    )
        .into_response()
}

async fn login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let email = body_str(&body, "email").unwrap_or("").trim().to_lowercase();
    let password = body_str(&body, "senha").unwrap_or("");

    let mut state = state.lock().await;
    let user_id = match state
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
    {
        Some(user) => user.id,
        None => return detail(StatusCode::UNAUTHORIZED, "Credenciais inválidas"),
    };

    let token = format!("tok-{user_id}-{}", state.next_token_id);
    state.next_token_id += 1;
    state.tokens.push((token.clone(), user_id));

    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

async fn me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => return unauthorized(),
    };
    let state = state.lock().await;
    match state.user_by_token(&token) {
        Some(user) => Json(Account {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        })
        .into_response(),
        None => unauthorized(),
    }
}

async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => return unauthorized(),
    };
    let mut state = state.lock().await;
    let known = state.tokens.iter().any(|(t, _)| t == &token);
    if !known {
        return unauthorized();
    }
    state.tokens.retain(|(t, _)| t != &token);
    ok_true()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_lists_and_items_over_http() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let list_id = backend.seed_list("Mercado").await;
        backend.seed_item(list_id, "Leite", 2, false).await;

        let lists: Value = reqwest::get(format!("{}/listas", backend.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(lists[0]["nome"], "Mercado");
        assert_eq!(lists[0]["itens_count"], 1);

        let items: Value = reqwest::get(format!("{}/listas/{list_id}/itens", backend.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(items[0]["nome"], "Leite");
        assert_eq!(items[0]["quantidade"], 2);
        assert_eq!(items[0]["ordem"], 0);
    }

    #[tokio::test]
    async fn finalized_lists_leave_the_active_set() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let list_id = backend.seed_list("Feira").await;

        let client = reqwest::Client::new();
        let finalized: Value = client
            .post(format!("{}/listas/{list_id}/finalizar", backend.base_url()))
            .json(&json!({ "finalizada": true }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(finalized["finalizada"], true);

        let lists: Value = reqwest::get(format!("{}/listas", backend.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(lists.as_array().unwrap().len(), 0);

        let history: Value = reqwest::get(format!("{}/historico", backend.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(history["data"][0]["nome"], "Feira");
    }

    #[tokio::test]
    async fn restore_resets_purchases_and_suffixes_the_name() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        let source = backend.seed_finalized_list("Compras julho", 1).await;
        backend.seed_item(source, "Arroz", 1, true).await;
        backend.seed_item(source, "Feijão", 1, false).await;

        let client = reqwest::Client::new();
        let restored: Value = client
            .post(format!(
                "{}/historico/restaurar/{source}",
                backend.base_url()
            ))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(restored["finalizada"], false);
        assert!(restored["nome"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("restaurada"));

        let new_id = restored["id"].as_i64().unwrap();
        let items: Value = reqwest::get(format!("{}/listas/{new_id}/itens", backend.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i["comprado"] == false));
        assert_eq!(items[0]["nome"], "Arroz");
    }

    #[tokio::test]
    async fn request_log_records_served_calls() {
        let backend = FakeBackend::new().spawn().await.unwrap();
        reqwest::get(format!("{}/health", backend.base_url()))
            .await
            .unwrap();
        reqwest::get(format!("{}/historico", backend.base_url()))
            .await
            .unwrap();

        let log = backend.requests().await;
        assert_eq!(log, vec!["GET /health", "GET /historico"]);
    }

    #[tokio::test]
    async fn preview_limit_matches_the_backend_cap() {
        // Guard against the constant drifting from the rendered preview.
        assert_eq!(PREVIEW_LIMIT, 3);
    }
}

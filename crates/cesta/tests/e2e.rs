// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the full topology: a typed client talking through
//! the forwarding proxy to a backend. Each test spawns its own backend
//! and proxy on ephemeral ports, so tests stay independent and can run
//! in parallel.

use std::sync::Arc;

use cesta_api::{ApiClient, CredentialStore};
use cesta_config::model::{ApiConfig, ProxyConfig};
use cesta_core::{CestaError, ExportFormat};
use cesta_proxy::ProxyState;
use cesta_store::{HistoryPhase, Tab, Workspace};
use cesta_testkit::{FakeBackend, FakeBackendHandle};

struct Topology {
    backend: FakeBackendHandle,
    client: ApiClient,
    _dir: tempfile::TempDir,
}

/// Backend plus proxy; the returned client points at the proxy, never at
/// the backend directly.
async fn spawn_topology() -> Topology {
    let backend = FakeBackend::new().spawn().await.unwrap();

    let state = ProxyState::new(&ProxyConfig {
        listen: "127.0.0.1:0".to_string(),
        backend_url: Some(backend.base_url().to_string()),
        path_prefix: "/api".to_string(),
    })
    .unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, cesta_proxy::router(state)).await.unwrap();
    });

    let dir = tempfile::tempdir().unwrap();
    let credentials = Arc::new(CredentialStore::new(dir.path().join("token")));
    let client = ApiClient::new(
        &ApiConfig {
            base_url: format!("http://{addr}/api"),
            timeout_secs: 5,
        },
        credentials,
    )
    .unwrap();

    Topology {
        backend,
        client,
        _dir: dir,
    }
}

#[tokio::test]
async fn shopping_flow_through_the_proxy() {
    let topo = spawn_topology().await;
    let (mut workspace, _rx) = Workspace::new(topo.client.clone(), 10);

    workspace.load().await.unwrap();
    let list = workspace.create_list("Mercado").await.unwrap();
    workspace.open_detail(list.id).await.unwrap();

    let leite = workspace.create_item("Leite", 2).await.unwrap();
    workspace.create_item("Pão", 1).await.unwrap();
    workspace.toggle_item(leite.id).await.unwrap();

    let detail = workspace.detail().unwrap();
    assert_eq!(detail.items().len(), 2);
    assert!(detail.get(leite.id).unwrap().purchased);
    assert_eq!(workspace.lists().get(list.id).unwrap().item_count, 2);

    // The backend saw the exact same routes the client issued.
    let requests = topo.backend.requests().await;
    assert!(requests.iter().any(|r| r == "POST /listas"));
    assert!(requests.iter().any(|r| r.starts_with("PUT /listas/")));
}

#[tokio::test]
async fn export_streams_through_the_proxy() {
    let topo = spawn_topology().await;
    let id = topo.backend.seed_list("Mercado").await;
    topo.backend.seed_item(id, "Leite", 2, true).await;
    topo.backend.seed_item(id, "Pão", 1, false).await;

    let payload = topo
        .client
        .export_list(id, ExportFormat::Csv)
        .await
        .unwrap();

    assert!(payload.filename.starts_with("lista-"));
    assert!(payload.filename.ends_with(".csv"));
    let text = String::from_utf8(payload.bytes).unwrap();
    assert!(text.starts_with("nome,quantidade,comprado"));
    assert!(text.contains("\"Leite\",2,1"));
    assert!(text.contains("\"Pão\",1,0"));
}

#[tokio::test]
async fn history_paginates_through_the_proxy() {
    let topo = spawn_topology().await;
    for days in 1..=5 {
        topo.backend
            .seed_finalized_list(&format!("Feira {days}"), days)
            .await;
    }
    let (mut workspace, _rx) = Workspace::new(topo.client.clone(), 2);

    workspace.switch_tab(Tab::History).await.unwrap();
    assert_eq!(workspace.history().entries().len(), 2);
    assert_eq!(workspace.history().phase(), HistoryPhase::LoadedWithMore);

    assert!(workspace.load_more_history().await.unwrap());
    assert!(workspace.load_more_history().await.unwrap());
    assert_eq!(workspace.history().entries().len(), 5);
    assert_eq!(workspace.history().phase(), HistoryPhase::LoadedComplete);

    assert!(!workspace.load_more_history().await.unwrap());
}

#[tokio::test]
async fn auth_session_flows_through_the_proxy() {
    let topo = spawn_topology().await;
    topo.backend
        .seed_user("Ana", "ana@example.com", "s3nha!")
        .await;

    topo.client.login("ana@example.com", "s3nha!").await.unwrap();
    let account = topo.client.me().await.unwrap();
    assert_eq!(account.email, "ana@example.com");

    topo.client.logout().await.unwrap();
    let err = topo.client.me().await.unwrap_err();
    assert!(matches!(err, CestaError::AuthRequired));
}

#[tokio::test]
async fn health_and_version_flow_through_the_proxy() {
    let topo = spawn_topology().await;

    let health = topo.client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.database);

    let version = topo.client.version().await.unwrap();
    assert_eq!(version.version, "0.1.0-testkit");

    let requests = topo.backend.requests().await;
    assert!(requests.iter().any(|r| r == "GET /health"));
    assert!(requests.iter().any(|r| r == "GET /version"));
}

#[tokio::test]
async fn backend_errors_relay_verbatim() {
    let topo = spawn_topology().await;

    let err = topo.client.delete_list(404).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Lista não encontrada");
}

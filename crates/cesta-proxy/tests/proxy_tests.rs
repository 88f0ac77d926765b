// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proxy behavior against the in-process fake backend.

use cesta_config::model::ProxyConfig;
use cesta_proxy::{router, ProxyState};
use cesta_testkit::FakeBackend;
use serde_json::{json, Value};

/// Binds the proxy on an ephemeral port in front of `backend_url`.
async fn spawn_proxy(backend_url: &str) -> (String, tokio::task::JoinHandle<()>) {
    let state = ProxyState::new(&ProxyConfig {
        listen: "127.0.0.1:0".to_string(),
        backend_url: Some(backend_url.to_string()),
        path_prefix: "/api".to_string(),
    })
    .unwrap();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), task)
}

#[tokio::test]
async fn strips_the_prefix_and_relays_json() {
    let backend = FakeBackend::new().spawn().await.unwrap();
    backend.seed_list("Mercado").await;
    let (proxy, _task) = spawn_proxy(backend.base_url()).await;

    let lists: Value = reqwest::get(format!("{proxy}/api/listas"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(lists[0]["nome"], "Mercado");
    // The backend saw the path without the proxy prefix.
    assert_eq!(backend.requests().await, vec!["GET /listas"]);
}

#[tokio::test]
async fn request_bodies_pass_through() {
    let backend = FakeBackend::new().spawn().await.unwrap();
    let (proxy, _task) = spawn_proxy(backend.base_url()).await;

    let created: Value = reqwest::Client::new()
        .post(format!("{proxy}/api/listas"))
        .json(&json!({ "nome": "Via proxy" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(created["nome"], "Via proxy");
    assert!(created["id"].as_i64().is_some());
}

#[tokio::test]
async fn query_strings_reach_the_backend() {
    let backend = FakeBackend::new().spawn().await.unwrap();
    backend.seed_finalized_list("Feira", 2).await;
    backend.seed_finalized_list("Churrasco", 2).await;
    let (proxy, _task) = spawn_proxy(backend.base_url()).await;

    let page: Value = reqwest::get(format!("{proxy}/api/historico?busca=feira"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let entries = page["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["nome"], "Feira");
}

#[tokio::test]
async fn backend_error_statuses_are_relayed_verbatim() {
    let backend = FakeBackend::new().spawn().await.unwrap();
    let (proxy, _task) = spawn_proxy(backend.base_url()).await;

    let response = reqwest::get(format!("{proxy}/api/listas/999/resumo"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Lista não encontrada");
}

#[tokio::test]
async fn export_headers_survive_the_relay() {
    let backend = FakeBackend::new().spawn().await.unwrap();
    let list = backend.seed_list("Mercado da Ana").await;
    backend.seed_item(list, "Leite", 2, true).await;
    let (proxy, _task) = spawn_proxy(backend.base_url()).await;

    let response = reqwest::get(format!("{proxy}/api/listas/{list}/exportar?formato=csv"))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("lista-"));

    let body = response.text().await.unwrap();
    assert!(body.starts_with("nome,quantidade,comprado"));
    assert!(body.contains("\"Leite\",2,1"));
}

#[tokio::test]
async fn unreachable_backend_becomes_a_bad_gateway() {
    // Port 9 is discard; nothing listens there in the test environment.
    let (proxy, _task) = spawn_proxy("http://127.0.0.1:9").await;

    let response = reqwest::get(format!("{proxy}/api/listas")).await.unwrap();
    assert_eq!(response.status().as_u16(), 502);

    let body = response.text().await.unwrap();
    assert!(body.contains("failed to reach backend"));
}

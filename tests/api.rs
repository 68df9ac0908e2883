// tests/api.rs
//
// Testes de roteamento que não precisam de banco: o pool é preguiçoso
// e nenhum destes caminhos chega a abrir conexão.

mod support;

use axum::http::{Method, StatusCode};
use pos_backend::models::auth::TokenType;
use serde_json::json;
use support::{app, lazy_state, send, send_with_headers};
use uuid::Uuid;

#[tokio::test]
async fn health_is_public() {
    let app = app(lazy_state());
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = app(lazy_state());

    for uri in [
        "/api/profile/",
        "/api/products/",
        "/api/categories/",
        "/api/customers/",
        "/api/sales/",
        "/api/dashboard/stats/",
        "/api/dashboard/sales/daily/",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Authentication token is invalid or missing.");
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sales/create/",
        None,
        Some(json!({ "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_token_is_rejected() {
    let app = app(lazy_state());
    let (status, _) = send(&app, Method::GET, "/api/products/", Some("nao-e-um-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_access_token() {
    let state = lazy_state();
    let refresh = state
        .auth_service
        .create_token(Uuid::new_v4(), TokenType::Refresh)
        .unwrap();
    let app = app(state);

    let (status, _) = send(&app, Method::GET, "/api/sales/", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_cannot_be_refreshed() {
    let state = lazy_state();
    let access = state
        .auth_service
        .create_token(Uuid::new_v4(), TokenType::Access)
        .unwrap();
    let app = app(state);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/token/refresh/",
        None,
        Some(json!({ "refresh": access })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validates_fields() {
    let app = app(lazy_state());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register/",
        None,
        Some(json!({ "username": "ab", "password": "123", "email": "nao-e-email" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "One or more fields are invalid.");
    let details = &body["details"];
    assert_eq!(details["username"][0], "Username must be between 3 and 150 characters.");
    assert_eq!(details["password"][0], "Password must be at least 6 characters long.");
    assert_eq!(details["email"][0], "Enter a valid email address.");
}

#[tokio::test]
async fn errors_follow_accept_language() {
    let app = app(lazy_state());

    let (status, body) = send_with_headers(
        &app,
        Method::GET,
        "/api/products/",
        None,
        None,
        &[("accept-language", "pt-BR,pt;q=0.9")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");

    let (status, body) = send_with_headers(
        &app,
        Method::POST,
        "/api/register/",
        None,
        Some(json!({ "username": "ab", "password": "segredo123", "email": "a@b.com" })),
        &[("accept-language", "es")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["username"][0],
        "El nombre de usuario debe tener entre 3 y 150 caracteres."
    );
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = app(lazy_state());
    let (status, _) = send(&app, Method::GET, "/api/nao-existe/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_lists_the_sale_routes() {
    let app = app(lazy_state());
    let (status, body) = send(&app, Method::GET, "/api/docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/sales/create/"));
    assert!(paths.contains_key("/api/sales/{id}/status/"));
    assert!(paths.contains_key("/api/dashboard/sales/monthly/"));
}

//! Web API Authentication Tests
//!
//! Integration tests for registration, login, and external-identity login.

use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use taskdeck::web::handlers::AppState;
use taskdeck::web::router::create_router;
use taskdeck::Database;

/// Create a test server with an in-memory database.
async fn create_test_server() -> TestServer {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state = Arc::new(AppState::new(db, "test-secret-key-for-testing-only", 900));
    let router = create_router(app_state, &[]);

    TestServer::new(router).expect("Failed to create test server")
}

/// Helper to register a test user and return the response body.
async fn register_test_user(server: &TestServer, name: &str, email: &str, password: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .await;

    response.json::<Value>()
}

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Test User",
            "email": "test@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["expires_in"], 900);
    assert_eq!(body["data"]["user"]["name"], "Test User");
    assert_eq!(body["data"]["user"]["email"], "test@example.com");
    // The password digest never appears in a response
    assert!(body["data"]["user"].get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = create_test_server().await;

    server
        .post("/api/auth/register")
        .json(&json!({
            "name": "First",
            "email": "taken@example.com",
            "password": "password123"
        }))
        .await
        .assert_status_ok();

    // Same email, different case
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Second",
            "email": "TAKEN@Example.com",
            "password": "password456"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");

    // No second record was created: the original credentials still log in
    let login = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "taken@example.com",
            "password": "password123"
        }))
        .await;
    login.assert_status_ok();
    let login_body: Value = login.json();
    assert_eq!(login_body["data"]["user"]["name"], "First");
}

#[tokio::test]
async fn test_register_short_password() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Test User",
            "email": "short@example.com",
            "password": "short"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_invalid_input() {
    let server = create_test_server().await;

    // Empty name
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "",
            "email": "a@example.com",
            "password": "password123"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    // Malformed email
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "A",
            "email": "not-an-email",
            "password": "password123"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = create_test_server().await;

    register_test_user(&server, "Login User", "login@example.com", "password123").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "login@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "login@example.com");
}

#[tokio::test]
async fn test_login_email_case_insensitive() {
    let server = create_test_server().await;

    register_test_user(&server, "Case User", "case@example.com", "password123").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "CASE@Example.COM",
            "password": "password123"
        }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_login_failures_indistinguishable() {
    let server = create_test_server().await;

    register_test_user(&server, "Login User", "login@example.com", "password123").await;

    // Wrong password
    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "login@example.com",
            "password": "wrongpassword"
        }))
        .await;
    wrong_password.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    // Unknown email
    let unknown_email = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": "password123"
        }))
        .await;
    unknown_email.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    // Identical error bodies: the caller cannot tell which part was wrong
    let a: Value = wrong_password.json();
    let b: Value = unknown_email.json();
    assert_eq!(a["error"]["code"], b["error"]["code"]);
    assert_eq!(a["error"]["message"], b["error"]["message"]);
}

#[tokio::test]
async fn test_login_empty_credentials() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "",
            "password": ""
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

// ============================================================================
// External Identity Tests
// ============================================================================

#[tokio::test]
async fn test_external_login_registers_new_account() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/external")
        .json(&json!({
            "email": "oauth@example.com",
            "name": "OAuth User",
            "avatar_url": "https://cdn.example.com/pic.png"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "oauth@example.com");
    assert_eq!(
        body["data"]["user"]["avatar_url"],
        "https://cdn.example.com/pic.png"
    );

    // The generated password is never exposed
    assert!(body["data"]["user"].get("password").is_none());
}

#[tokio::test]
async fn test_external_login_reuses_existing_account() {
    let server = create_test_server().await;

    let first: Value = server
        .post("/api/auth/external")
        .json(&json!({
            "email": "repeat@example.com",
            "name": "Repeat User"
        }))
        .await
        .json();

    let second: Value = server
        .post("/api/auth/external")
        .json(&json!({
            "email": "Repeat@Example.com",
            "name": "Renamed Elsewhere"
        }))
        .await
        .json();

    // Same account both times; profile attributes from the first registration
    assert_eq!(first["data"]["user"]["id"], second["data"]["user"]["id"]);
    assert_eq!(second["data"]["user"]["name"], "Repeat User");
}

#[tokio::test]
async fn test_external_login_matches_locally_registered_email() {
    let server = create_test_server().await;

    let registered =
        register_test_user(&server, "Local User", "both@example.com", "password123").await;

    let external: Value = server
        .post("/api/auth/external")
        .json(&json!({
            "email": "both@example.com",
            "name": "External Name"
        }))
        .await
        .json();

    assert_eq!(
        registered["data"]["user"]["id"],
        external["data"]["user"]["id"]
    );
}

// ============================================================================
// Token Tests
// ============================================================================

#[tokio::test]
async fn test_token_grants_access() {
    let server = create_test_server().await;

    let body = register_test_user(&server, "Me User", "me@example.com", "password123").await;
    let token = body["data"]["token"].as_str().expect("No token");

    let response = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;

    response.assert_status_ok();

    let me: Value = response.json();
    assert_eq!(me["data"]["email"], "me@example.com");
}

#[tokio::test]
async fn test_missing_token_unauthorized() {
    let server = create_test_server().await;

    let response = server.get("/api/users/me").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_unauthorized() {
    let server = create_test_server().await;

    let response = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, "Bearer invalid-token")
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    // Malformed header (no Bearer prefix) is also rejected
    let response = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, "Token something")
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_contains_expected_claims() {
    let server = create_test_server().await;

    let body = register_test_user(&server, "Claims User", "claims@example.com", "password123").await;
    let token = body["data"]["token"].as_str().expect("No token");
    let user_id = body["data"]["user"]["id"].as_i64().expect("No user id");

    // Decode JWT payload (base64 decode the middle part)
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "JWT should have 3 parts");

    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let payload = engine
        .decode(parts[1])
        .expect("Failed to decode JWT payload");
    let claims: Value = serde_json::from_slice(&payload).expect("Failed to parse claims");

    assert_eq!(claims["sub"], user_id);
    assert!(claims["iat"].is_number());
    assert!(claims["exp"].is_number());
    assert!(claims["jti"].is_string());
    // Expiry matches the configured TTL
    assert_eq!(
        claims["exp"].as_u64().unwrap() - claims["iat"].as_u64().unwrap(),
        900
    );
}

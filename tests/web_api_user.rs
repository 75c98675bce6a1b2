//! Web API User Profile Tests
//!
//! Integration tests for profile reads/updates and password changes.

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

/// Register a user and return their bearer token.
async fn register_and_token(server: &TestServer, name: &str, email: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["token"].as_str().expect("No token").to_string()
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

// ============================================================================
// Profile Tests
// ============================================================================

#[tokio::test]
async fn test_get_profile() {
    let server = create_test_server().await;
    let token = register_and_token(&server, "Profile User", "profile@example.com", "password123").await;

    let response = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Profile User");
    assert_eq!(body["data"]["email"], "profile@example.com");
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_update_profile_name_and_avatar() {
    let server = create_test_server().await;
    let token = register_and_token(&server, "Old Name", "rename@example.com", "password123").await;

    let response = server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "name": "New Name",
            "avatar_url": "https://cdn.example.com/me.png"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "New Name");
    assert_eq!(body["data"]["avatar_url"], "https://cdn.example.com/me.png");
    // Email untouched
    assert_eq!(body["data"]["email"], "rename@example.com");

    // Clearing the avatar with an empty string
    let cleared: Value = server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"avatar_url": ""}))
        .await
        .json();
    assert!(cleared["data"].get("avatar_url").is_none());
}

#[tokio::test]
async fn test_update_profile_email_change() {
    let server = create_test_server().await;
    let token = register_and_token(&server, "Mover", "old@example.com", "password123").await;

    let response = server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"email": "new@example.com"}))
        .await;
    response.assert_status_ok();

    // Login works with the new email, not the old one
    server
        .post("/api/auth/login")
        .json(&json!({"email": "new@example.com", "password": "password123"}))
        .await
        .assert_status_ok();

    server
        .post("/api/auth/login")
        .json(&json!({"email": "old@example.com", "password": "password123"}))
        .await
        .assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_email_conflict() {
    let server = create_test_server().await;
    register_and_token(&server, "Holder", "held@example.com", "password123").await;
    let token = register_and_token(&server, "Wants It", "wants@example.com", "password123").await;

    // Case-insensitive collision with an existing account
    let response = server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"email": "HELD@example.com"}))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_update_profile_invalid_values() {
    let server = create_test_server().await;
    let token = register_and_token(&server, "Valid", "valid@example.com", "password123").await;

    let response = server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "   "}))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let response = server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"email": "not-an-email"}))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

// ============================================================================
// Password Change Tests
// ============================================================================

#[tokio::test]
async fn test_change_password_success() {
    let server = create_test_server().await;
    let token = register_and_token(&server, "Changer", "changer@example.com", "oldpassword1").await;

    let response = server
        .put("/api/users/me/password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "current_password": "oldpassword1",
            "new_password": "newpassword1"
        }))
        .await;

    response.assert_status_ok();

    // Old password no longer works, new one does
    server
        .post("/api/auth/login")
        .json(&json!({"email": "changer@example.com", "password": "oldpassword1"}))
        .await
        .assert_status(axum::http::StatusCode::UNAUTHORIZED);

    server
        .post("/api/auth/login")
        .json(&json!({"email": "changer@example.com", "password": "newpassword1"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_change_password_wrong_current() {
    let server = create_test_server().await;
    let token = register_and_token(&server, "Guarded", "guarded@example.com", "password123").await;

    let response = server
        .put("/api/users/me/password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "current_password": "wrongpassword",
            "new_password": "newpassword1"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    // Password unchanged
    server
        .post("/api/auth/login")
        .json(&json!({"email": "guarded@example.com", "password": "password123"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_change_password_too_short() {
    let server = create_test_server().await;
    let token = register_and_token(&server, "Shorty", "shorty@example.com", "password123").await;

    let response = server
        .put("/api/users/me/password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "current_password": "password123",
            "new_password": "short"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_existing_token_still_valid_after_password_change() {
    // Tokens are stateless and not revocable; a password change does not
    // invalidate already-issued tokens until they expire naturally.
    let server = create_test_server().await;
    let token = register_and_token(&server, "Keeper", "keeper@example.com", "password123").await;

    server
        .put("/api/users/me/password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "current_password": "password123",
            "new_password": "newpassword1"
        }))
        .await
        .assert_status_ok();

    server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_subtask, change_password, create_task, delete_subtask, delete_task, external_login,
    get_my_profile, get_task, list_tasks, login, register, update_my_profile, update_subtask,
    update_task, AppState,
};
use super::middleware::{create_cors_layer, token_auth};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    // Auth routes (no authentication required)
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/external", post(external_login));

    // User profile routes (authentication required)
    let user_routes = Router::new()
        .route("/me", get(get_my_profile).put(update_my_profile))
        .route("/me/password", put(change_password));

    // Task routes (authentication required)
    let task_routes = Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/:id/subtasks", post(add_subtask))
        .route(
            "/:id/subtasks/:subtask_id",
            put(update_subtask).delete(delete_subtask),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes);

    // Clone the codec for the middleware closure
    let codec = app_state.tokens.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let codec = codec.clone();
                    token_auth(codec, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

//! Web server for taskdeck.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{AuthConfig, ServerConfig};
use crate::Database;

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(server: &ServerConfig, auth: &AuthConfig, db: Database) -> Self {
        let addr = format!("{}:{}", server.host, server.port)
            .parse()
            .expect("Invalid web server address");

        let app_state = AppState::new(db, &auth.jwt_secret, auth.token_ttl_secs)
            .with_expose_internal_errors(server.expose_internal_errors);

        Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: server.cors_origins.clone(),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(&self) -> Router {
        create_router(self.app_state.clone(), &self.cors_origins).merge(create_health_router())
    }

    /// Run the web server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_configs() -> (ServerConfig, AuthConfig) {
        (
            ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Use random port
                cors_origins: vec![],
                expose_internal_errors: false,
            },
            AuthConfig {
                jwt_secret: "test-secret-key".to_string(),
                token_ttl_secs: 900,
            },
        )
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let (server_cfg, auth_cfg) = test_configs();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&server_cfg, &auth_cfg, db);
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_health() {
        let (server_cfg, auth_cfg) = test_configs();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&server_cfg, &auth_cfg, db);
        let addr = server.run_with_addr().await.unwrap();

        let stream = tokio::net::TcpStream::connect(addr).await;
        assert!(stream.is_ok());
    }
}

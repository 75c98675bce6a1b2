use tracing::info;

use taskdeck::web::WebServer;
use taskdeck::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = taskdeck::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        taskdeck::logging::init_console_only(&config.logging.level);
    }

    info!("taskdeck - collaborative task tracking");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let server = WebServer::new(&config.server, &config.auth, db);
    info!("Server configured on {}", server.addr());

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

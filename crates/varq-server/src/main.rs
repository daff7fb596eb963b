//! Varq HTTP server.
//!
//! A read-only query API over the occurrences schema.

use anyhow::Result;
use axum::http::Method;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use varq_core::AppConfig;
use varq_server::{router, AppState, Repository};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "varq=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::from_env();
    info!("Starting varq server");
    info!("Database: {}", mask_db_url(&config.db_url));

    // Create database pool
    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_pool_size)
        .connect(&config.db_url)
        .await?;

    info!("Connected to database");

    // Create app state
    let state = Arc::new(AppState {
        repository: Repository::new(pool),
        config: config.clone(),
    });

    // Build router
    let app = router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Mask database URL credentials for logging.
fn mask_db_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            return format!("{}://***@{}", &url[..proto_end], &url[at_pos + 1..]);
        }
    }
    url.to_string()
}

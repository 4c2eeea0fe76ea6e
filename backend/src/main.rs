use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod db;
mod error;
mod middleware;
mod routes;
mod state;


use config::AppConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AgriVerse Backend...");

    let config = AppConfig::from_env();

    let pool = match db::init_pool(&config) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to configure database pool: {}", e);
            return;
        }
    };

    if config.run_migrations {
        if let Err(e) = db::init_database(&pool).await {
            tracing::error!("Failed to run migrations: {}", e);
            return;
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let app_state = match AppState::new(pool, config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application state: {}", e);
            return;
        }
    };

    let app = routes::create_app(app_state);

    tracing::info!("listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

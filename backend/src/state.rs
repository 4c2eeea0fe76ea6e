use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::{AgriError, AgriResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client, // Shared for outbound AI gateway calls
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> AgriResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.ai.timeout)
            .build()
            .map_err(|e| AgriError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(AppState {
            pool,
            config: Arc::new(config),
            http,
        })
    }
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AgriError, AgriResult};

pub type DbPool = Pool<Postgres>;

pub fn init_pool_with_options(
    opts: PgConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
) -> DbPool {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(Duration::from_secs(120))
        .max_lifetime(Duration::from_secs(300))
        .connect_lazy_with(opts)
}

pub fn init_pool(config: &AppConfig) -> AgriResult<DbPool> {
    let opts = PgConnectOptions::from_str(&config.database_url)
        .map_err(|e| AgriError::Internal(format!("Invalid DB URL: {}", e)))?;

    Ok(init_pool_with_options(
        opts,
        config.db_max_connections,
        config.db_acquire_timeout,
    ))
}

pub async fn init_database(pool: &DbPool) -> AgriResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// One question/answer exchange with the AI advisor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdvisoryQuery {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub query_text: String,
    pub response: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

/// A registered produce batch. Rows are written once and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Produce {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub batch_id: String,
    pub crop_type: String,
    pub harvest_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub farmer_name: String,
    pub tx_hash: String,
    pub qr_data: String,
    pub qr_image: String,
    pub status: String,
    #[sqlx(default)]
    pub certificate_url: Option<String>,
    #[sqlx(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

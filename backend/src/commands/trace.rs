use crate::commands::produce::{is_tx_hash, QR_DELIMITER, STATUS_VERIFIED};
use crate::db::{DbPool, Produce};
use crate::error::{AgriError, AgriResult};
use axum::extract::{Json, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceParams {
    pub code: Option<String>,
    pub batch_id: Option<String>,
    pub tx_hash: Option<String>,
}

/// How a trace request identifies its batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLookup {
    BatchId(String),
    TxHash(String),
}

impl TraceLookup {
    /// `code` wins over `batchId`, which wins over `txHash`.
    pub fn from_params(params: TraceParams) -> AgriResult<Self> {
        let present = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(code) = present(params.code) {
            let batch_id = split_qr_code(&code);
            if batch_id.is_empty() {
                return Err(AgriError::Validation(
                    "QR code does not contain a batch id".to_string(),
                ));
            }
            return Ok(TraceLookup::BatchId(batch_id.to_string()));
        }
        if let Some(batch_id) = present(params.batch_id) {
            return Ok(TraceLookup::BatchId(batch_id));
        }
        if let Some(tx_hash) = present(params.tx_hash) {
            let tx_hash = tx_hash.to_ascii_lowercase();
            if !is_tx_hash(&tx_hash) {
                return Err(AgriError::Validation(format!(
                    "Invalid transaction hash: {}",
                    tx_hash
                )));
            }
            return Ok(TraceLookup::TxHash(tx_hash));
        }

        Err(AgriError::Validation(
            "Missing code, batchId, or txHash parameter".to_string(),
        ))
    }
}

/// Batch id portion of a `<batch id>|<tx hash>` QR payload.
pub fn split_qr_code(code: &str) -> &str {
    code.split(QR_DELIMITER).next().unwrap_or_default().trim()
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineStage {
    pub stage: &'static str,
    pub date: String,
    pub location: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResponse {
    pub ok: bool,
    pub farmer: String,
    pub crop: String,
    pub harvest_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub batch_id: String,
    pub tx_hash: String,
    pub status: &'static str,
    pub timeline: Vec<TimelineStage>,
    pub certificate_url: Option<String>,
    pub image_url: Option<String>,
}

/// Fixed three-stage history derived from the stored dates.
pub fn build_timeline(produce: &Produce) -> Vec<TimelineStage> {
    let recorded = produce.created_at.to_rfc3339();
    let harvested = produce
        .harvest_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| recorded.clone());

    vec![
        TimelineStage {
            stage: "Harvested",
            date: harvested,
            location: produce
                .location
                .clone()
                .unwrap_or_else(|| "Farm Location".to_string()),
            status: "completed",
        },
        TimelineStage {
            stage: "Recorded on Blockchain",
            date: recorded.clone(),
            location: "Blockchain Network".to_string(),
            status: "completed",
        },
        TimelineStage {
            stage: "Quality Verified",
            date: recorded,
            location: "AgriVerse Platform".to_string(),
            status: "completed",
        },
    ]
}

impl From<Produce> for TraceResponse {
    fn from(produce: Produce) -> Self {
        let timeline = build_timeline(&produce);
        TraceResponse {
            ok: true,
            farmer: produce.farmer_name,
            crop: produce.crop_type,
            harvest_date: produce.harvest_date,
            location: produce.location,
            batch_id: produce.batch_id,
            tx_hash: produce.tx_hash,
            status: "Verified",
            timeline,
            certificate_url: produce.certificate_url,
            image_url: produce.image_url,
        }
    }
}

pub async fn find_verified_produce(
    pool: &DbPool,
    lookup: &TraceLookup,
) -> AgriResult<Option<Produce>> {
    let (sql, value) = match lookup {
        TraceLookup::BatchId(v) => (
            "SELECT * FROM produce WHERE status = $1 AND batch_id = $2 ORDER BY created_at DESC LIMIT 1",
            v,
        ),
        TraceLookup::TxHash(v) => (
            "SELECT * FROM produce WHERE status = $1 AND tx_hash = $2 ORDER BY created_at DESC LIMIT 1",
            v,
        ),
    };

    let row = sqlx::query_as::<_, Produce>(sql)
        .bind(STATUS_VERIFIED)
        .bind(value)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn trace_produce_axum(
    State(pool): State<DbPool>,
    Query(params): Query<TraceParams>,
) -> AgriResult<Json<TraceResponse>> {
    let lookup = TraceLookup::from_params(params)?;

    let produce = find_verified_produce(&pool, &lookup)
        .await
        .map_err(|e| e.or_db_message("Failed to fetch produce data"))?
        .ok_or_else(|| AgriError::NotFound("Produce not found or not verified".to_string()))?;

    Ok(Json(TraceResponse::from(produce)))
}

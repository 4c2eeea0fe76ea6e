use crate::commands::utils::{non_blank, parse_date_safe};
use crate::db::{DbPool, Produce};
use crate::error::{AgriError, AgriResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::Extension;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_VERIFIED: &str = "verified";
pub const QR_DELIMITER: char = '|';

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceRequest {
    #[serde(default)]
    pub farmer: Option<String>,
    #[serde(default)]
    pub crop: Option<String>,
    #[serde(default)]
    pub harvest_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceResponse {
    pub ok: bool,
    pub batch_id: String,
    pub tx_hash: String,
    pub qr_image: String,
    pub data: Produce,
}

#[derive(Debug, Serialize)]
pub struct ProduceListResponse {
    pub ok: bool,
    pub data: Vec<Produce>,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct NewProduce {
    pub farmer_name: String,
    pub crop_type: String,
    pub harvest_date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl TryFrom<ProduceRequest> for NewProduce {
    type Error = AgriError;

    fn try_from(req: ProduceRequest) -> AgriResult<Self> {
        let farmer_name = non_blank(req.farmer)
            .ok_or_else(|| AgriError::Validation("Farmer name is required".to_string()))?;
        let crop_type = non_blank(req.crop)
            .ok_or_else(|| AgriError::Validation("Crop type is required".to_string()))?;

        let harvest_date = match non_blank(req.harvest_date) {
            Some(raw) => Some(parse_date_safe(&raw).ok_or_else(|| {
                AgriError::Validation(format!("Invalid harvest date: {}", raw))
            })?),
            None => None,
        };

        Ok(NewProduce {
            farmer_name,
            crop_type,
            harvest_date,
            location: non_blank(req.location),
        })
    }
}

/// `BATCH-<unix millis>-<9 base36 chars>`
pub fn generate_batch_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("BATCH-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// 32 random bytes as `0x`-prefixed lowercase hex. Not backed by any chain.
pub fn generate_tx_hash() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    format!("0x{}", hex::encode(bytes))
}

pub fn is_tx_hash(value: &str) -> bool {
    // Stored hashes are lowercase; hex::decode alone would accept either case.
    match value.strip_prefix("0x") {
        Some(digits) => {
            !digits.bytes().any(|b| b.is_ascii_uppercase())
                && hex::decode(digits).map_or(false, |bytes| bytes.len() == 32)
        }
        None => false,
    }
}

pub fn qr_payload(batch_id: &str, tx_hash: &str) -> String {
    format!("{}{}{}", batch_id, QR_DELIMITER, tx_hash)
}

/// Placeholder QR image: an SVG labelled with the batch id, as a data URI.
pub fn qr_image(batch_id: &str) -> String {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200"><rect width="200" height="200" fill="white"/><text x="100" y="100" text-anchor="middle" font-size="12" fill="black">QR: {}</text></svg>"#,
        batch_id
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

pub async fn register_produce(
    pool: &DbPool,
    farmer_id: Uuid,
    input: NewProduce,
) -> AgriResult<Produce> {
    let batch_id = generate_batch_id();
    let tx_hash = generate_tx_hash();
    let qr_data = qr_payload(&batch_id, &tx_hash);
    let image = qr_image(&batch_id);

    let row = sqlx::query_as::<_, Produce>(
        "INSERT INTO produce (farmer_id, batch_id, crop_type, harvest_date, location, farmer_name, tx_hash, qr_data, qr_image, status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(farmer_id)
    .bind(&batch_id)
    .bind(&input.crop_type)
    .bind(input.harvest_date)
    .bind(&input.location)
    .bind(&input.farmer_name)
    .bind(&tx_hash)
    .bind(&qr_data)
    .bind(&image)
    .bind(STATUS_VERIFIED)
    .fetch_one(pool)
    .await?;

    tracing::info!("Registered produce batch {} for {}", row.batch_id, farmer_id);
    Ok(row)
}

pub async fn get_produce_by_farmer(pool: &DbPool, farmer_id: Uuid) -> AgriResult<Vec<Produce>> {
    let rows = sqlx::query_as::<_, Produce>(
        "SELECT * FROM produce WHERE farmer_id = $1 ORDER BY created_at DESC",
    )
    .bind(farmer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn register_produce_axum(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<ProduceRequest>, JsonRejection>,
) -> AgriResult<Json<ProduceResponse>> {
    let farmer_id = claims.user_id()?;
    let Json(req) = payload.map_err(|e| AgriError::Validation(e.body_text()))?;
    let input = NewProduce::try_from(req)?;

    let row = register_produce(&state.pool, farmer_id, input)
        .await
        .map_err(|e| e.or_db_message("Failed to save produce data"))?;

    Ok(Json(ProduceResponse {
        ok: true,
        batch_id: row.batch_id.clone(),
        tx_hash: row.tx_hash.clone(),
        qr_image: row.qr_image.clone(),
        data: row,
    }))
}

pub async fn get_produce_axum(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AgriResult<Json<ProduceListResponse>> {
    let farmer_id = claims.user_id()?;
    let data = get_produce_by_farmer(&state.pool, farmer_id)
        .await
        .map_err(|e| e.or_db_message("Failed to fetch produce data"))?;
    Ok(Json(ProduceListResponse { ok: true, data }))
}

use crate::commands::ai::call_chat_completion;
use crate::db::{AdvisoryQuery, DbPool};
use crate::error::{AgriError, AgriResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HISTORY_LIMIT: i64 = 20;

const SYSTEM_PROMPT_EN: &str = "You are an AI agricultural advisor for farmers in Kerala, India. You have detailed knowledge about Kerala's climate, soil conditions, traditional farming practices, and modern agricultural techniques. Provide clear, practical advice for local farming conditions.";

const SYSTEM_PROMPT_ML: &str = "നിങ്ങൾ കേരളത്തിലെ കർഷകർക്കുള്ള ഒരു AI കൃഷി ഉപദേശകനാണ്. കേരളത്തിലെ കാലാവസ്ഥ, മണ്ണ്, പരമ്പരാഗത കൃഷി രീതികൾ എന്നിവയെക്കുറിച്ച് നിങ്ങൾക്ക് വിശദമായ അറിവുണ്ട്. വ്യക്തവും പ്രായോഗികവുമായ ഉപദേശം നൽകുക.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ml,
}

impl Language {
    /// Absent tag means English.
    pub fn parse(tag: Option<&str>) -> AgriResult<Self> {
        match tag.map(str::trim) {
            None | Some("") | Some("en") => Ok(Language::En),
            Some("ml") => Ok(Language::Ml),
            Some(other) => Err(AgriError::Validation(format!(
                "Unsupported language: {}",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ml => "ml",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Language::En => SYSTEM_PROMPT_EN,
            Language::Ml => SYSTEM_PROMPT_ML,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdvisoryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdvisoryResponse {
    pub ok: bool,
    pub answer: String,
    pub language: Language,
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct AdvisoryHistoryResponse {
    pub ok: bool,
    pub data: Vec<AdvisoryQuery>,
}

pub async fn save_advisory_query(
    pool: &DbPool,
    farmer_id: Uuid,
    query_text: &str,
    response: &str,
    language: Language,
) -> AgriResult<AdvisoryQuery> {
    let row = sqlx::query_as::<_, AdvisoryQuery>(
        "INSERT INTO advisory_queries (farmer_id, query_text, response, language) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(farmer_id)
    .bind(query_text)
    .bind(response)
    .bind(language.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get_advisory_history(
    pool: &DbPool,
    farmer_id: Uuid,
) -> AgriResult<Vec<AdvisoryQuery>> {
    let rows = sqlx::query_as::<_, AdvisoryQuery>(
        "SELECT * FROM advisory_queries WHERE farmer_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(farmer_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn ask_advisory_axum(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<AdvisoryRequest>, JsonRejection>,
) -> AgriResult<Json<AdvisoryResponse>> {
    let farmer_id = claims.user_id()?;
    let Json(req) = payload.map_err(|e| AgriError::Validation(e.body_text()))?;

    let query = req
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AgriError::Validation("Query must not be empty".to_string()))?
        .to_string();
    let language = Language::parse(req.language.as_deref())?;

    let answer = call_chat_completion(
        &state.http,
        &state.config.ai,
        language.system_prompt(),
        &query,
    )
    .await?;

    // The answer is returned even if it could not be recorded.
    let saved = match save_advisory_query(&state.pool, farmer_id, &query, &answer, language).await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Advisory exchange for {} not saved: {}", farmer_id, e);
            false
        }
    };

    Ok(Json(AdvisoryResponse {
        ok: true,
        answer,
        language,
        saved,
    }))
}

pub async fn get_advisory_history_axum(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AgriResult<Json<AdvisoryHistoryResponse>> {
    let farmer_id = claims.user_id()?;
    let data = get_advisory_history(&state.pool, farmer_id)
        .await
        .map_err(|e| e.or_db_message("Failed to fetch advisory history"))?;
    Ok(Json(AdvisoryHistoryResponse { ok: true, data }))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream rate limit exceeded")]
    RateLimited,

    #[error("Upstream payment required")]
    PaymentRequired,

    #[error("AI gateway error ({status}): {body}")]
    Gateway { status: u16, body: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgriError {
    /// Replaces a database failure with the client-facing message of the
    /// operation that failed. Other errors pass through.
    pub fn or_db_message(self, message: &str) -> Self {
        match self {
            AgriError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                AgriError::Internal(message.to_string())
            }
            other => other,
        }
    }
}

pub type AgriResult<T> = Result<T, AgriError>;

impl IntoResponse for AgriError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AgriError::Auth(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            AgriError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AgriError::NotFound(msg) => {
                let body = Json(json!({
                    "ok": false,
                    "error": msg,
                    "status": "Not Found",
                }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AgriError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limits exceeded, please try again later.".to_string(),
            ),
            AgriError::PaymentRequired => (
                StatusCode::PAYMENT_REQUIRED,
                "Payment required, please add funds to your AI workspace.".to_string(),
            ),
            AgriError::Gateway { status, ref body } => {
                tracing::error!("AI gateway error: {} {}", status, body);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI gateway error".to_string(),
                )
            }
            AgriError::Internal(msg) => {
                tracing::error!("Internal Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AgriError::Network(ref e) => {
                tracing::error!("AI gateway unreachable: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI gateway error".to_string(),
                )
            }
            _ => {
                tracing::error!("Unhandled Error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "ok": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

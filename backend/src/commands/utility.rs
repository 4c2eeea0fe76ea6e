use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> &'static str {
    "AgriVerse backend is running"
}

pub async fn ping() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

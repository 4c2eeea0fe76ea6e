use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/advisory",
        get(commands::advisory::get_advisory_history_axum)
            .post(commands::advisory::ask_advisory_axum),
    )
}

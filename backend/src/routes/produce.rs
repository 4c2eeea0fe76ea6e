use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/produce",
        get(commands::produce::get_produce_axum)
            .post(commands::produce::register_produce_axum),
    )
}

use crate::middleware::{auth::auth_middleware, response::json_error_middleware};
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, Method},
    middleware, Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod advisory;
pub mod produce;
pub mod trace;
pub mod utility;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(utility::router())
        .merge(advisory::router())
        .merge(produce::router())
        .merge(trace::router())
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Full application: routes, auth, JSON error bodies and CORS, bound to `state`.
pub fn create_app(state: AppState) -> Router {
    create_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(cors_layer())
        .with_state(state)
}

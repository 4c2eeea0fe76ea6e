use crate::error::{AgriError, AgriResult};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PUBLIC_ROUTES: &[&str] = &["/api/ping", "/api/trace"];

/// Claims carried by access tokens from the hosted auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
}

impl Claims {
    /// The caller's farmer id. Tokens whose subject is not a UUID are rejected.
    pub fn user_id(&self) -> AgriResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AgriError::Auth(format!("subject is not a user id: {}", self.sub)))
    }
}

pub fn verify_token(token: &str, secret: &[u8], audience: &str) -> AgriResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| AgriError::Auth(format!("invalid token: {}", e)))?;

    // Fail here rather than in every handler.
    token_data.claims.user_id()?;
    Ok(token_data.claims)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AgriResult<Response> {
    let path = request.uri().path();

    // OPTIONS never carries credentials.
    if request.method() == Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_ROUTES.contains(&path)
    {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AgriError::Auth("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AgriError::Auth("malformed Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AgriError::Auth("expected a Bearer token".to_string()))?;

    let claims = verify_token(
        token.trim(),
        &state.config.jwt_secret,
        &state.config.jwt_audience,
    )?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::json;

/// Rewrites non-JSON error responses under `/api` (framework rejections such as
/// 405 or an unknown route) into the `{ ok: false, error }` shape.
pub async fn json_error_middleware(req: Request, next: Next) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let res = next.run(req).await;

    let status = res.status();
    if !path.starts_with("/api") || !(status.is_client_error() || status.is_server_error()) {
        return Ok(res);
    }

    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .map_or(false, |ct| ct.contains("application/json"));
    if is_json {
        return Ok(res);
    }

    let (mut parts, body) = res.into_parts();

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    let msg = String::from_utf8_lossy(&bytes).trim().to_string();
    let error = if !msg.is_empty() {
        msg
    } else {
        default_message(status)
    };

    let new_bytes = serde_json::to_vec(&json!({ "ok": false, "error": error }))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    parts.headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    parts.headers.insert(header::CONTENT_LENGTH, new_bytes.len().into());

    Ok(Response::from_parts(parts, Body::from(new_bytes)))
}

fn default_message(status: StatusCode) -> String {
    match status {
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed".to_string(),
        StatusCode::NOT_FOUND => "Not found".to_string(),
        StatusCode::UNAUTHORIZED => "Unauthorized".to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Internal server error")
            .to_string(),
    }
}

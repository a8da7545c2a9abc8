use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{errors::HttpError, state::HttpState};

const API_KEY_HEADER: &str = "x-api-key";
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Resolves the caller's project and stores it as a request extension.
pub async fn require_api_key(
    State(state): State<HttpState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(api_key) = presented_api_key(req.headers()) else {
        return Err(HttpError::new(
            StatusCode::UNAUTHORIZED,
            "missing API key",
            Some("missing_api_key".to_string()),
        ));
    };
    let project = app_api::authenticate(&state.context, &api_key)?;
    req.extensions_mut().insert(project);
    Ok(next.run(req).await)
}

pub async fn require_admin_token(
    State(state): State<HttpState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(HttpError::not_found());
    };
    let token = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    if token != Some(expected) {
        return Err(HttpError::new(
            StatusCode::UNAUTHORIZED,
            "missing or invalid admin token",
            Some("invalid_admin_token".to_string()),
        ));
    }
    Ok(next.run(req).await)
}

/// `X-API-Key` wins over `Authorization: Bearer`.
fn presented_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return Some(key.to_string());
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

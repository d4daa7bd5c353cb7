//! Bearer-token extraction and admin-API-backed verification.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use opsgate_core::service::ExecService;

use crate::error::AppError;

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(AppError::unauthorized)
}

/// Extract the bearer token and verify it against the admin API. Every
/// request is verified upstream — this service holds no credential state of
/// its own.
pub async fn require_admin(service: &ExecService, headers: &HeaderMap) -> Result<String, AppError> {
    let token = bearer_token(headers)?;
    if !service.verify_token(&token).await? {
        return Err(AppError::unauthorized());
    }
    Ok(token)
}

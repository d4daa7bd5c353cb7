use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use opsgate_core::OpsgateError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Wraps `anyhow::Error` so handlers
/// can use `?` freely; the status code is derived by downcasting to
/// [`OpsgateError`]. The core never produces HTTP semantics — this mapping
/// is the transport's job.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn unauthorized() -> Self {
        Self(OpsgateError::Unauthorized.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(OpsgateError::Invalid(msg.into()).into())
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<OpsgateError>() {
            match e {
                OpsgateError::Unauthorized => StatusCode::UNAUTHORIZED,
                OpsgateError::Invalid(_)
                | OpsgateError::InvalidActionType(_)
                | OpsgateError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
                OpsgateError::Gateway(_) | OpsgateError::Planner(_) => StatusCode::BAD_GATEWAY,
                OpsgateError::Storage(_) | OpsgateError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "ok": false, "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

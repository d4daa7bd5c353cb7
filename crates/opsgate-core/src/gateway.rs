//! Admin API gateway seam.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// GatewayResponse
// ---------------------------------------------------------------------------

/// Uniform shape for admin API responses. Non-2xx statuses are recovered
/// into `ok: false` with `error: "admin_api_error"` — callers branch on
/// `ok`, never on exceptions. Only network-level failures surface as `Err`.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub ok: bool,
    pub status: u16,
    pub body: Option<Value>,
    pub error: Option<String>,
}

impl GatewayResponse {
    pub fn success(status: u16, body: Option<Value>) -> Self {
        Self {
            ok: true,
            status,
            body,
            error: None,
        }
    }

    pub fn failure(status: u16, body: Option<Value>) -> Self {
        Self {
            ok: false,
            status,
            body,
            error: Some("admin_api_error".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// AdminGateway
// ---------------------------------------------------------------------------

/// Thin client over the admin service's REST surface. All admin endpoints
/// require `Authorization: Bearer <token>`.
#[async_trait]
pub trait AdminGateway: Send + Sync {
    /// POST `/api/auth` — exchange credentials for a bearer token.
    async fn issue_token(&self, username: &str, password: &str) -> Result<String>;

    /// GET `/api/auth/me` — true when the token is accepted.
    async fn verify_token(&self, token: &str) -> Result<bool>;

    /// GET `/api/admin/users/{userId}/detail`.
    async fn user_detail(&self, token: &str, user_id: &str) -> Result<GatewayResponse>;

    /// GET `/api/admin/orgs/{orgId}`.
    async fn org_summary(&self, token: &str, org_id: &str) -> Result<GatewayResponse>;

    /// POST a resolved action endpoint path with the stored payload.
    async fn execute(
        &self,
        token: &str,
        path: &str,
        payload: &Map<String, Value>,
    ) -> Result<GatewayResponse>;
}

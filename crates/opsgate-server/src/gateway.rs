//! reqwest-backed implementation of the core [`AdminGateway`] seam.

use async_trait::async_trait;
use opsgate_core::gateway::{AdminGateway, GatewayResponse};
use opsgate_core::{OpsgateError, Result};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// HttpAdminGateway
// ---------------------------------------------------------------------------

pub struct HttpAdminGateway {
    base_url: String,
    client: reqwest::Client,
}

enum Method {
    Get,
    Post,
}

impl HttpAdminGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Issue an authenticated request and shape the response uniformly:
    /// non-2xx becomes `ok:false, error:"admin_api_error"` without an `Err`;
    /// only network-level failures (connect, timeout) surface as
    /// `OpsgateError::Gateway`.
    async fn request_json(
        &self,
        method: Method,
        path: &str,
        token: &str,
        payload: Option<&Map<String, Value>>,
    ) -> Result<GatewayResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| OpsgateError::Gateway(e.to_string()))?;

        let status = response.status();
        let body = response.json::<Value>().await.ok();
        if status.is_success() {
            Ok(GatewayResponse::success(status.as_u16(), body))
        } else {
            tracing::warn!(status = status.as_u16(), path, "admin api error");
            Ok(GatewayResponse::failure(status.as_u16(), body))
        }
    }
}

#[async_trait]
impl AdminGateway for HttpAdminGateway {
    async fn issue_token(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/auth", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| OpsgateError::Gateway(e.to_string()))?;

        let ok = response.status().is_success();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| OpsgateError::Gateway(e.to_string()))?;

        let token = body
            .get("accessToken")
            .and_then(Value::as_str)
            .map(str::to_string);
        match token {
            Some(token) if ok && body["ok"] == true => Ok(token),
            _ => Err(OpsgateError::Gateway("admin_auth_failed".to_string())),
        }
    }

    async fn verify_token(&self, token: &str) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/auth/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| OpsgateError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(false);
        }
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(body["ok"] == true)
    }

    async fn user_detail(&self, token: &str, user_id: &str) -> Result<GatewayResponse> {
        self.request_json(
            Method::Get,
            &format!("/api/admin/users/{user_id}/detail"),
            token,
            None,
        )
        .await
    }

    async fn org_summary(&self, token: &str, org_id: &str) -> Result<GatewayResponse> {
        self.request_json(Method::Get, &format!("/api/admin/orgs/{org_id}"), token, None)
            .await
    }

    async fn execute(
        &self,
        token: &str,
        path: &str,
        payload: &Map<String, Value>,
    ) -> Result<GatewayResponse> {
        self.request_json(Method::Post, path, token, Some(payload)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

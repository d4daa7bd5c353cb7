//! `opsgate-planner` — OpenAI-backed implementation of the core
//! [`Planner`] seam.
//!
//! Two independent capabilities, each one HTTP call to the Responses API with
//! output constrained by a strict JSON schema:
//!
//! ```text
//! ContextObject ──► extract_target ──► TargetExtraction (user|org|unknown)
//!                        │
//!                        ▼  (+ state snapshot fetched by the caller)
//!                   decide_plan   ──► ExecutionPlan (action or none)
//! ```
//!
//! Failure contract: transport/HTTP errors propagate as
//! `OpsgateError::Planner`; malformed or schema-violating output never
//! errors — it parses to the safe defaults (`unknown` target, `none` plan),
//! which the service treats as a hold. No retries here.

mod schema;
mod wire;

use async_trait::async_trait;
use opsgate_core::context::ContextObject;
use opsgate_core::planner::Planner;
use opsgate_core::types::{ExecutionPlan, TargetExtraction};
use opsgate_core::{OpsgateError, Result};
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const TARGET_SYSTEM_PROMPT: &str =
    "Extract admin execution intent and target identifiers from the event. Return JSON only.";
const PLAN_SYSTEM_PROMPT: &str =
    "Decide which admin API action to execute based on target and current state. Return JSON only.";

// ---------------------------------------------------------------------------
// PlannerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl PlannerConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point at a non-default API host (proxy, compatible server, test mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// ---------------------------------------------------------------------------
// OpenAiPlanner
// ---------------------------------------------------------------------------

pub struct OpenAiPlanner {
    config: PlannerConfig,
    client: reqwest::Client,
}

impl OpenAiPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn responses(
        &self,
        system: &str,
        user: String,
        format: wire::TextFormat,
        max_output_tokens: u32,
    ) -> Result<String> {
        let request = wire::ResponsesRequest {
            model: self.config.model.clone(),
            input: vec![
                wire::InputMessage {
                    role: "system",
                    content: system.to_string(),
                },
                wire::InputMessage {
                    role: "user",
                    content: user,
                },
            ],
            text: wire::TextConfig { format },
            temperature: 0.2,
            max_output_tokens,
            store: false,
        };

        let response = self
            .client
            .post(format!("{}/responses", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OpsgateError::Planner(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "responses api error");
            return Err(OpsgateError::Planner(format!(
                "responses api returned {status}"
            )));
        }

        let reply: wire::ResponsesReply = response
            .json()
            .await
            .map_err(|e| OpsgateError::Planner(e.to_string()))?;
        Ok(wire::output_text(&reply))
    }
}

#[async_trait]
impl Planner for OpenAiPlanner {
    async fn extract_target(&self, context: &ContextObject) -> Result<TargetExtraction> {
        let text = self
            .responses(
                TARGET_SYSTEM_PROMPT,
                context.prompt_text(),
                wire::TextFormat::json_schema("admin_target", schema::target_schema()),
                200,
            )
            .await?;
        Ok(schema::parse_target(&text))
    }

    async fn decide_plan(
        &self,
        context: &ContextObject,
        target: &TargetExtraction,
        snapshot: Option<&Value>,
    ) -> Result<ExecutionPlan> {
        let user = [
            context.prompt_text(),
            format!("target: {}", serde_json::to_string(target)?),
            format!(
                "state: {}",
                snapshot
                    .map(Value::to_string)
                    .unwrap_or_else(|| "null".to_string())
            ),
        ]
        .join("\n");

        let text = self
            .responses(
                PLAN_SYSTEM_PROMPT,
                user,
                wire::TextFormat::json_schema("admin_plan", schema::plan_schema()),
                240,
            )
            .await?;
        Ok(schema::parse_plan(&text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

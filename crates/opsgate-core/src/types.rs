use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// Closed enumeration of admin actions the pipeline is allowed to execute.
///
/// Deserialization is fail-closed: any string outside the enumeration maps to
/// `ActionType::None`, so unresolved model output can never leak through as a
/// live action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    GrantProPlan,
    UpdateOrgTier,
    UpdateOrgCredit,
    AssignOrg,
    #[serde(other)]
    None,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::GrantProPlan => "grant_pro_plan",
            ActionType::UpdateOrgTier => "update_org_tier",
            ActionType::UpdateOrgCredit => "update_org_credit",
            ActionType::AssignOrg => "assign_org",
            ActionType::None => "none",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionType {
    type Err = crate::error::OpsgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grant_pro_plan" => Ok(ActionType::GrantProPlan),
            "update_org_tier" => Ok(ActionType::UpdateOrgTier),
            "update_org_credit" => Ok(ActionType::UpdateOrgCredit),
            "assign_org" => Ok(ActionType::AssignOrg),
            "none" => Ok(ActionType::None),
            _ => Err(crate::error::OpsgateError::InvalidActionType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle of an [`ExecutionRequest`].
///
/// Transitions only move forward:
/// `PENDING_APPROVAL → {APPROVED → EXECUTED | FAILED} | REJECTED`.
/// `APPROVED` is a durable checkpoint written before the admin API call is
/// attempted, so a crash between approval and execution leaves an
/// inspectable record instead of silently losing the approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    PendingApproval,
    Approved,
    Rejected,
    Executed,
    Failed,
}

impl RequestStatus {
    /// Terminal states are absorbing: no further transition is allowed.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Rejected | RequestStatus::Executed | RequestStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::PendingApproval => "PENDING_APPROVAL",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Executed => "EXECUTED",
            RequestStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = crate::error::OpsgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_APPROVAL" => Ok(RequestStatus::PendingApproval),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "EXECUTED" => Ok(RequestStatus::Executed),
            "FAILED" => Ok(RequestStatus::Failed),
            _ => Err(crate::error::OpsgateError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TargetType / Intent
// ---------------------------------------------------------------------------

/// What kind of entity a candidate refers to. Fail-closed to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    User,
    Org,
    #[serde(other)]
    #[default]
    Unknown,
}

/// The action the extractor believes the candidate asks for. Advisory only:
/// the concrete action comes from [`ExecutionPlan::action_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    GrantProPlan,
    UpdateOrgTier,
    UpdateOrgCredit,
    AssignOrg,
    #[serde(other)]
    #[default]
    Unknown,
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// An obligation proposal generated upstream (Slack classification or manual
/// API input). Only `id`, `title` and `source` feed the planner context; the
/// rest is carried for audit rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub inferred_reason: String,
    #[serde(default)]
    pub risk_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_owner: Option<String>,
}

// ---------------------------------------------------------------------------
// TargetExtraction
// ---------------------------------------------------------------------------

/// Desired end-state hints the extractor picked up from the candidate text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

/// First-stage planner output: which entity the candidate talks about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetExtraction {
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired: Option<DesiredState>,
}

impl TargetExtraction {
    /// The safe default when model output cannot be parsed.
    pub fn unknown() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// ExecutionPlan
// ---------------------------------------------------------------------------

/// Second-stage planner output: a concrete admin action with its parameters
/// and payload, plus the model's reasoning strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub action_type: ActionType,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub rationale: Vec<String>,
}

impl ExecutionPlan {
    /// The safe default when model output cannot be parsed: no action.
    pub fn hold() -> Self {
        Self {
            action_type: ActionType::None,
            params: BTreeMap::new(),
            payload: Map::new(),
            rationale: Vec::new(),
        }
    }

    pub fn joined_rationale(&self) -> String {
        self.rationale.join(" | ")
    }
}

// ---------------------------------------------------------------------------
// ExecutionRequest
// ---------------------------------------------------------------------------

/// The central persisted entity: one admin action awaiting (or past) human
/// approval. Created exactly once by the service; `status` is the only field
/// mutated after creation, and records are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub id: Uuid,
    pub candidate_id: String,
    pub status: RequestStatus,
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_org_id: Option<String>,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

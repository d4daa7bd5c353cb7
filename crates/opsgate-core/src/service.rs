//! The admin-exec approval state machine.
//!
//! Orchestrates planner → guard → persistence → human approval → gateway
//! execution. Holds no mutable state of its own: the persisted request
//! record is the single source of truth, and every status change is claimed
//! through the store's atomic conditional transition.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::audit::DecisionLogEntry;
use crate::context::ContextObject;
use crate::endpoint::resolve_endpoint;
use crate::error::Result;
use crate::gateway::AdminGateway;
use crate::guard::validate_plan;
use crate::planner::Planner;
use crate::registry::tool_definition;
use crate::store::{DecisionLogStore, ExecutionRequestStore};
use crate::types::{
    ActionType, Candidate, ExecutionPlan, ExecutionRequest, RequestStatus, TargetType,
};

// ---------------------------------------------------------------------------
// ExecService
// ---------------------------------------------------------------------------

pub struct ExecService {
    planner: Arc<dyn Planner>,
    gateway: Arc<dyn AdminGateway>,
    requests: Arc<dyn ExecutionRequestStore>,
    decisions: Arc<dyn DecisionLogStore>,
}

impl ExecService {
    pub fn new(
        planner: Arc<dyn Planner>,
        gateway: Arc<dyn AdminGateway>,
        requests: Arc<dyn ExecutionRequestStore>,
        decisions: Arc<dyn DecisionLogStore>,
    ) -> Self {
        Self {
            planner,
            gateway,
            requests,
            decisions,
        }
    }

    /// True when the admin API accepts `token`.
    pub async fn verify_token(&self, token: &str) -> Result<bool> {
        self.gateway.verify_token(token).await
    }

    pub async fn list_pending(&self) -> Result<Vec<ExecutionRequest>> {
        self.requests.list_pending().await
    }

    pub async fn list_pending_by_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<ExecutionRequest>> {
        self.requests.list_pending_by_candidate(candidate_id).await
    }

    /// Turn a candidate into a `PENDING_APPROVAL` request.
    ///
    /// Returns `Ok(None)` on every deliberate hold path (unknown target, no
    /// actionable plan, guard rejection): the candidate stays unresolved and
    /// the hold is recorded in the decision log. Nothing is persisted on a
    /// hold.
    pub async fn create_execution_request(
        &self,
        candidate: &Candidate,
        token: &str,
        requested_by_user_id: Option<&str>,
    ) -> Result<Option<ExecutionRequest>> {
        let context = ContextObject::from_candidate(candidate);

        let target = self.planner.extract_target(&context).await?;
        if target.target_type == TargetType::Unknown {
            tracing::info!(candidate = %candidate.id, "admin target unknown, holding");
            self.decisions
                .append(
                    &DecisionLogEntry::ai_hold("Admin target unknown"),
                    Some(&candidate.id),
                )
                .await?;
            return Ok(None);
        }

        let snapshot = self.fetch_state_snapshot(&target, token).await;

        let plan = self
            .planner
            .decide_plan(&context, &target, snapshot.as_ref())
            .await?;
        if plan.action_type == ActionType::None {
            tracing::info!(candidate = %candidate.id, "no actionable plan, holding");
            self.decisions
                .append(
                    &DecisionLogEntry::ai_hold(plan.joined_rationale()),
                    Some(&candidate.id),
                )
                .await?;
            return Ok(None);
        }

        let tool = tool_definition(plan.action_type);
        let validation = validate_plan(&plan, tool);
        if !validation.ok {
            tracing::warn!(
                candidate = %candidate.id,
                errors = %validation.joined_errors(),
                "plan failed guard validation, holding"
            );
            self.decisions
                .append(
                    &DecisionLogEntry::ai_hold(format!(
                        "Admin plan invalid: {}",
                        validation.joined_errors()
                    )),
                    Some(&candidate.id),
                )
                .await?;
            return Ok(None);
        }

        let request = ExecutionRequest {
            id: Uuid::new_v4(),
            candidate_id: candidate.id.clone(),
            status: RequestStatus::PendingApproval,
            action_type: plan.action_type,
            requested_by_user_id: requested_by_user_id.map(str::to_string),
            target_user_id: plan.params.get("userId").cloned(),
            target_org_id: plan.params.get("orgId").cloned(),
            payload: plan.payload.clone(),
            rationale: plan.joined_rationale(),
            created_at: Utc::now(),
        };

        self.requests.create(&request).await?;
        // HOLD, not CREATE: the candidate's obligation is unresolved until a
        // human approves.
        self.decisions
            .append(
                &DecisionLogEntry::ai_hold(format!("Admin exec pending: {}", plan.action_type)),
                Some(&candidate.id),
            )
            .await?;

        tracing::info!(
            request = %request.id,
            action = %request.action_type,
            "execution request created, pending approval"
        );
        Ok(Some(request))
    }

    /// Approve a pending request and execute it against the admin API.
    ///
    /// Unknown ids are a silent no-op. The stored record is re-validated
    /// before execution — approval does not trust it blindly — and the
    /// `PENDING_APPROVAL → APPROVED` transition is claimed atomically, so a
    /// concurrent approval of the same request executes at most once.
    pub async fn approve_and_execute(&self, request_id: Uuid, token: &str) -> Result<()> {
        let Some(request) = self.requests.get(request_id).await? else {
            tracing::debug!(request = %request_id, "approve on unknown request id, ignoring");
            return Ok(());
        };

        let stored_plan = ExecutionPlan {
            action_type: request.action_type,
            params: stored_params(&request),
            payload: request.payload.clone(),
            rationale: Vec::new(),
        };
        let validation = validate_plan(&stored_plan, tool_definition(request.action_type));
        if !validation.ok {
            tracing::warn!(
                request = %request_id,
                errors = %validation.joined_errors(),
                "stored request failed re-validation"
            );
            let failed = self
                .requests
                .transition(
                    request_id,
                    RequestStatus::PendingApproval,
                    RequestStatus::Failed,
                )
                .await?;
            if failed {
                self.decisions
                    .append(
                        &DecisionLogEntry::human_hold(format!(
                            "Admin exec invalid: {}",
                            validation.joined_errors()
                        )),
                        None,
                    )
                    .await?;
            }
            return Ok(());
        }

        // Durable checkpoint before any external call. Losing the claim means
        // another approver got here first (or the request is terminal).
        let claimed = self
            .requests
            .transition(
                request_id,
                RequestStatus::PendingApproval,
                RequestStatus::Approved,
            )
            .await?;
        if !claimed {
            tracing::info!(request = %request_id, "approval not claimed, skipping execution");
            return Ok(());
        }

        let path = resolve_endpoint(request.action_type, &stored_plan.params)
            .unwrap_or_default();

        let response = match self.gateway.execute(token, &path, &request.payload).await {
            Ok(response) => response,
            Err(e) => {
                self.requests
                    .transition(request_id, RequestStatus::Approved, RequestStatus::Failed)
                    .await?;
                self.decisions
                    .append(&DecisionLogEntry::human_hold("Admin exec failed"), None)
                    .await?;
                return Err(e);
            }
        };

        if !response.ok {
            tracing::warn!(request = %request_id, status = response.status, "admin exec failed");
            self.requests
                .transition(request_id, RequestStatus::Approved, RequestStatus::Failed)
                .await?;
            self.decisions
                .append(&DecisionLogEntry::human_hold("Admin exec failed"), None)
                .await?;
            return Ok(());
        }

        self.requests
            .transition(request_id, RequestStatus::Approved, RequestStatus::Executed)
            .await?;
        self.decisions
            .append(
                &DecisionLogEntry::human_create(format!(
                    "Admin exec executed: {}",
                    request.action_type
                )),
                None,
            )
            .await?;
        tracing::info!(request = %request_id, action = %request.action_type, "executed");
        Ok(())
    }

    /// Reject a pending request. Always safe: no guard re-check. Unknown ids
    /// and already-terminal requests are a silent no-op — the conditional
    /// transition keeps terminal states absorbing.
    pub async fn reject(&self, request_id: Uuid) -> Result<()> {
        let rejected = self
            .requests
            .transition(
                request_id,
                RequestStatus::PendingApproval,
                RequestStatus::Rejected,
            )
            .await?;
        if !rejected {
            tracing::debug!(request = %request_id, "reject on non-pending request, ignoring");
        }
        Ok(())
    }

    /// Fetch the target's current state via the gateway. Any failure leaves
    /// the snapshot empty and the planner proceeds with what it has.
    async fn fetch_state_snapshot(
        &self,
        target: &crate::types::TargetExtraction,
        token: &str,
    ) -> Option<Value> {
        let response = match (target.target_type, &target.user_id, &target.org_id) {
            (TargetType::User, Some(user_id), _) => {
                self.gateway.user_detail(token, user_id).await
            }
            (TargetType::Org, _, Some(org_id)) => self.gateway.org_summary(token, org_id).await,
            _ => return None,
        };
        match response {
            Ok(resp) => resp.body,
            Err(e) => {
                tracing::warn!(error = %e, "state snapshot fetch failed, proceeding without");
                None
            }
        }
    }
}

/// Params synthesized from the stored target fields. Absent fields become
/// empty strings, which the guard treats as missing — a request whose target
/// was never populated fails re-validation instead of executing with an empty
/// path parameter.
fn stored_params(request: &ExecutionRequest) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert(
        "userId".to_string(),
        request.target_user_id.clone().unwrap_or_default(),
    );
    params.insert(
        "orgId".to_string(),
        request.target_org_id.clone().unwrap_or_default(),
    );
    params
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

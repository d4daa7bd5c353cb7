//! In-memory collaborators for service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::audit::DecisionLogEntry;
use crate::context::ContextObject;
use crate::error::{OpsgateError, Result};
use crate::gateway::{AdminGateway, GatewayResponse};
use crate::planner::Planner;
use crate::store::{DecisionLogStore, ExecutionRequestStore};
use crate::types::{ExecutionPlan, ExecutionRequest, RequestStatus, TargetExtraction};

// ---------------------------------------------------------------------------
// MemoryRequestStore
// ---------------------------------------------------------------------------

pub(crate) struct MemoryRequestStore {
    inner: Mutex<HashMap<Uuid, ExecutionRequest>>,
}

impl MemoryRequestStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    pub(crate) fn get_sync(&self, id: Uuid) -> Option<ExecutionRequest> {
        self.inner.lock().unwrap().get(&id).cloned()
    }

    /// Mutate a stored record in place, simulating external corruption or
    /// staleness between creation and approval.
    pub(crate) fn corrupt(&self, id: Uuid, f: impl FnOnce(&mut ExecutionRequest)) {
        let mut inner = self.inner.lock().unwrap();
        f(inner.get_mut(&id).expect("request must exist"));
    }
}

#[async_trait]
impl ExecutionRequestStore for MemoryRequestStore {
    async fn create(&self, request: &ExecutionRequest) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ExecutionRequest>> {
        Ok(self.get_sync(id))
    }

    async fn list_pending(&self) -> Result<Vec<ExecutionRequest>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == RequestStatus::PendingApproval)
            .cloned()
            .collect())
    }

    async fn list_pending_by_candidate(&self, candidate_id: &str) -> Result<Vec<ExecutionRequest>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                r.status == RequestStatus::PendingApproval && r.candidate_id == candidate_id
            })
            .cloned()
            .collect())
    }

    async fn transition(&self, id: Uuid, from: RequestStatus, to: RequestStatus) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.get_mut(&id) {
            Some(request) if request.status == from => {
                request.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryDecisionLog
// ---------------------------------------------------------------------------

pub(crate) struct MemoryDecisionLog {
    entries: Mutex<Vec<(DecisionLogEntry, Option<String>)>>,
}

impl MemoryDecisionLog {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn entries(&self) -> Vec<(DecisionLogEntry, Option<String>)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionLogStore for MemoryDecisionLog {
    async fn append(&self, entry: &DecisionLogEntry, candidate_id: Option<&str>) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .push((entry.clone(), candidate_id.map(str::to_string)));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StubPlanner
// ---------------------------------------------------------------------------

pub(crate) struct StubPlanner {
    target: TargetExtraction,
    plan: ExecutionPlan,
}

impl StubPlanner {
    pub(crate) fn new(target: TargetExtraction, plan: ExecutionPlan) -> Self {
        Self { target, plan }
    }
}

#[async_trait]
impl Planner for StubPlanner {
    async fn extract_target(&self, _context: &ContextObject) -> Result<TargetExtraction> {
        Ok(self.target.clone())
    }

    async fn decide_plan(
        &self,
        _context: &ContextObject,
        _target: &TargetExtraction,
        _snapshot: Option<&Value>,
    ) -> Result<ExecutionPlan> {
        Ok(self.plan.clone())
    }
}

// ---------------------------------------------------------------------------
// StubGateway
// ---------------------------------------------------------------------------

pub(crate) struct StubGateway {
    snapshot_error: bool,
    execute_failure: bool,
    execute_error: bool,
    user_detail_calls: Mutex<Vec<String>>,
    execute_calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl StubGateway {
    pub(crate) fn ok() -> Self {
        Self {
            snapshot_error: false,
            execute_failure: false,
            execute_error: false,
            user_detail_calls: Mutex::new(Vec::new()),
            execute_calls: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot reads return a network-level error.
    pub(crate) fn with_snapshot_error(mut self) -> Self {
        self.snapshot_error = true;
        self
    }

    /// `execute` returns a non-2xx gateway failure.
    pub(crate) fn with_execute_failure(mut self) -> Self {
        self.execute_failure = true;
        self
    }

    /// `execute` returns a network-level error.
    pub(crate) fn with_execute_error(mut self) -> Self {
        self.execute_error = true;
        self
    }

    pub(crate) fn user_detail_calls(&self) -> Vec<String> {
        self.user_detail_calls.lock().unwrap().clone()
    }

    pub(crate) fn execute_calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.execute_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdminGateway for StubGateway {
    async fn issue_token(&self, _username: &str, _password: &str) -> Result<String> {
        Ok("stub-token".to_string())
    }

    async fn verify_token(&self, token: &str) -> Result<bool> {
        Ok(!token.is_empty())
    }

    async fn user_detail(&self, _token: &str, user_id: &str) -> Result<GatewayResponse> {
        if self.snapshot_error {
            return Err(OpsgateError::Gateway("connection refused".to_string()));
        }
        self.user_detail_calls
            .lock()
            .unwrap()
            .push(user_id.to_string());
        Ok(GatewayResponse::success(
            200,
            Some(json!({"userId": user_id, "plan": "free"})),
        ))
    }

    async fn org_summary(&self, _token: &str, org_id: &str) -> Result<GatewayResponse> {
        if self.snapshot_error {
            return Err(OpsgateError::Gateway("connection refused".to_string()));
        }
        Ok(GatewayResponse::success(
            200,
            Some(json!({"orgId": org_id, "tier": "starter"})),
        ))
    }

    async fn execute(
        &self,
        _token: &str,
        path: &str,
        payload: &Map<String, Value>,
    ) -> Result<GatewayResponse> {
        if self.execute_error {
            return Err(OpsgateError::Gateway("connection reset".to_string()));
        }
        if self.execute_failure {
            return Ok(GatewayResponse::failure(500, None));
        }
        self.execute_calls
            .lock()
            .unwrap()
            .push((path.to_string(), payload.clone()));
        Ok(GatewayResponse::success(200, Some(json!({"ok": true}))))
    }
}

//! Persistence seams for execution requests and the decision log.

use crate::audit::DecisionLogEntry;
use crate::error::Result;
use crate::types::{ExecutionRequest, RequestStatus};
use async_trait::async_trait;
use uuid::Uuid;

/// Store for [`ExecutionRequest`] records.
///
/// Requests are created once and only their status is ever mutated. Status
/// changes go through [`transition`](Self::transition), an atomic conditional
/// update (`UPDATE … WHERE status = from` semantics): read-modify-write races
/// between concurrent approvers are closed at the storage layer, not in
/// application code.
#[async_trait]
pub trait ExecutionRequestStore: Send + Sync {
    async fn create(&self, request: &ExecutionRequest) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<ExecutionRequest>>;

    async fn list_pending(&self) -> Result<Vec<ExecutionRequest>>;

    async fn list_pending_by_candidate(&self, candidate_id: &str) -> Result<Vec<ExecutionRequest>>;

    /// Atomically move `id` from `from` to `to`. Returns `false` when the
    /// request does not exist or is no longer in `from` — the caller lost
    /// the claim and must not proceed with the transition's side effects.
    async fn transition(&self, id: Uuid, from: RequestStatus, to: RequestStatus) -> Result<bool>;
}

/// Append-only audit log. Entries are loosely associated to a candidate and
/// never mutated or deleted.
#[async_trait]
pub trait DecisionLogStore: Send + Sync {
    async fn append(&self, entry: &DecisionLogEntry, candidate_id: Option<&str>) -> Result<()>;
}

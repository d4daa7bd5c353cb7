//! Planner seam: free text in, structured intent out.

use crate::context::ContextObject;
use crate::error::Result;
use crate::types::{ExecutionPlan, TargetExtraction};
use async_trait::async_trait;
use serde_json::Value;

/// Two-stage translation from candidate context to a structured admin plan.
///
/// Implementations are read-only with respect to system state: they never
/// call the admin API themselves. The caller fetches the target's state
/// snapshot and passes it in, keeping the planner a pure text-to-structure
/// translator.
///
/// Parse or schema mismatches must fail closed (`TargetExtraction::unknown`
/// / `ExecutionPlan::hold`) rather than error; only transport-level failures
/// surface as `Err`.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Classify the context into a target type, identifiers and intent.
    async fn extract_target(&self, context: &ContextObject) -> Result<TargetExtraction>;

    /// Decide a concrete action given the target and a live snapshot of its
    /// current state (`None` when the snapshot fetch failed).
    async fn decide_plan(
        &self,
        context: &ContextObject,
        target: &TargetExtraction,
        snapshot: Option<&Value>,
    ) -> Result<ExecutionPlan>;
}

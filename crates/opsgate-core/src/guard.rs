//! Plan guard: validates a planner-produced [`ExecutionPlan`] against a
//! [`ToolDefinition`] before any side-effecting call is allowed.
//!
//! Pure and deterministic. Apart from the tool-existence check, validation
//! never short-circuits: every violation is collected so a human reviewer
//! sees all problems at once.

use crate::registry::ToolDefinition;
use crate::types::{ActionType, ExecutionPlan};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub ok: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }

    pub fn joined_errors(&self) -> String {
        self.errors.join(" | ")
    }
}

// ---------------------------------------------------------------------------
// validate_plan
// ---------------------------------------------------------------------------

/// Validate `plan` against `tool`.
///
/// Error codes:
/// - `no_matching_tool` — no tool definition (the only short-circuit)
/// - `missing_param:<name>` — required param absent or empty string
/// - `missing_payload:<name>` — required payload key absent or null
/// - `missing_payload:credit|creditDelta` — neither credit field present
/// - `credit_conflict` — both credit fields present
/// - `invalid_payload:<key>` — credit field present but not numeric
pub fn validate_plan(plan: &ExecutionPlan, tool: Option<&ToolDefinition>) -> Validation {
    let Some(tool) = tool else {
        return Validation::from_errors(vec!["no_matching_tool".to_string()]);
    };

    let mut errors = Vec::new();

    for &param in tool.required_params {
        let present = plan.params.get(param).is_some_and(|v| !v.is_empty());
        if !present {
            errors.push(format!("missing_param:{param}"));
        }
    }

    for &key in tool.required_payload_keys {
        if !payload_present(plan, key) {
            errors.push(format!("missing_payload:{key}"));
        }
    }

    if tool.action_type == ActionType::UpdateOrgCredit {
        validate_credit_payload(plan, &mut errors);
    }

    Validation::from_errors(errors)
}

/// Exactly one of `credit` (absolute) / `creditDelta` (relative), numeric.
fn validate_credit_payload(plan: &ExecutionPlan, errors: &mut Vec<String>) {
    let credit = payload_value(plan, "credit");
    let delta = payload_value(plan, "creditDelta");

    match (credit, delta) {
        (None, None) => errors.push("missing_payload:credit|creditDelta".to_string()),
        (Some(_), Some(_)) => errors.push("credit_conflict".to_string()),
        (Some(v), None) => {
            if !v.is_number() {
                errors.push("invalid_payload:credit".to_string());
            }
        }
        (None, Some(v)) => {
            if !v.is_number() {
                errors.push("invalid_payload:creditDelta".to_string());
            }
        }
    }
}

fn payload_present(plan: &ExecutionPlan, key: &str) -> bool {
    payload_value(plan, key).is_some()
}

/// A payload value counts as present only when the key exists and is not null.
fn payload_value<'a>(plan: &'a ExecutionPlan, key: &str) -> Option<&'a Value> {
    plan.payload.get(key).filter(|v| !v.is_null())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

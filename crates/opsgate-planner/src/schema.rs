//! JSON schemas constraining model output, and the fail-closed parsers that
//! turn output text back into domain types.

use opsgate_core::types::{ExecutionPlan, TargetExtraction};
use serde_json::{json, Value};

/// Schema for the target-extraction call.
pub(crate) fn target_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "targetType": { "type": "string", "enum": ["user", "org", "unknown"] },
            "userId": { "type": "string" },
            "orgId": { "type": "string" },
            "intent": {
                "type": "string",
                "enum": [
                    "grant_pro_plan",
                    "update_org_tier",
                    "update_org_credit",
                    "assign_org",
                    "unknown"
                ]
            },
            "desired": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "plan": { "type": "string" },
                    "tier": { "type": "string" },
                    "credit": { "type": "number" },
                    "creditDelta": { "type": "number" },
                    "orgId": { "type": "string" }
                }
            }
        },
        "required": ["targetType", "intent"]
    })
}

/// Schema for the plan-decision call.
pub(crate) fn plan_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "actionType": {
                "type": "string",
                "enum": [
                    "grant_pro_plan",
                    "update_org_tier",
                    "update_org_credit",
                    "assign_org",
                    "none"
                ]
            },
            "params": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            },
            "payload": {
                "type": "object",
                "additionalProperties": true
            },
            "rationale": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["actionType", "params", "rationale"]
    })
}

/// Parse target-extraction output. Any parse or schema mismatch yields the
/// safe `unknown` default — unresolved enums must never leak downstream as
/// live values.
pub(crate) fn parse_target(text: &str) -> TargetExtraction {
    match serde_json::from_str(text) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable target extraction, defaulting to unknown");
            TargetExtraction::unknown()
        }
    }
}

/// Parse plan-decision output. Failures yield `ExecutionPlan::hold()`
/// (action `none`), which the service treats as "no actionable plan".
pub(crate) fn parse_plan(text: &str) -> ExecutionPlan {
    match serde_json::from_str(text) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable execution plan, defaulting to hold");
            ExecutionPlan::hold()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsgate_core::types::{ActionType, Intent, TargetType};

    #[test]
    fn parses_well_formed_target() {
        let target = parse_target(
            r#"{"targetType":"user","userId":"user-42","intent":"grant_pro_plan"}"#,
        );
        assert_eq!(target.target_type, TargetType::User);
        assert_eq!(target.user_id.as_deref(), Some("user-42"));
        assert_eq!(target.intent, Intent::GrantProPlan);
    }

    #[test]
    fn garbage_target_fails_closed() {
        let target = parse_target("not json at all");
        assert_eq!(target.target_type, TargetType::Unknown);
        assert_eq!(target.intent, Intent::Unknown);
    }

    #[test]
    fn unrecognized_enum_values_fail_closed() {
        let target = parse_target(r#"{"targetType":"galaxy","intent":"terraform"}"#);
        assert_eq!(target.target_type, TargetType::Unknown);
        assert_eq!(target.intent, Intent::Unknown);
    }

    #[test]
    fn parses_well_formed_plan() {
        let plan = parse_plan(
            r#"{"actionType":"update_org_tier","params":{"orgId":"org-9"},"payload":{"tier":"scale"},"rationale":["tier upgrade requested"]}"#,
        );
        assert_eq!(plan.action_type, ActionType::UpdateOrgTier);
        assert_eq!(plan.params["orgId"], "org-9");
        assert_eq!(plan.payload["tier"], "scale");
    }

    #[test]
    fn garbage_plan_defaults_to_hold() {
        let plan = parse_plan("{\"actionType\": 42}");
        assert_eq!(plan.action_type, ActionType::None);
        assert!(plan.params.is_empty());
    }

    #[test]
    fn unknown_action_string_defaults_to_none() {
        let plan = parse_plan(r#"{"actionType":"drop_database","params":{},"rationale":[]}"#);
        assert_eq!(plan.action_type, ActionType::None);
    }

    #[test]
    fn schemas_close_their_enums() {
        let target = target_schema();
        assert_eq!(target["properties"]["targetType"]["enum"][2], "unknown");
        let plan = plan_schema();
        assert_eq!(plan["properties"]["actionType"]["enum"][4], "none");
        assert_eq!(plan["additionalProperties"], false);
    }
}

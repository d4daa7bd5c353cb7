use crate::types::ActionType;

// ---------------------------------------------------------------------------
// ToolDefinition
// ---------------------------------------------------------------------------

/// Static schema for one admin action: which params and payload keys a plan
/// must carry before it can be trusted. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDefinition {
    pub action_type: ActionType,
    pub required_params: &'static [&'static str],
    pub required_payload_keys: &'static [&'static str],
    pub optional_payload_keys: &'static [&'static str],
}

/// The full declarative tool table. `update_org_credit` declares its payload
/// keys as optional because exactly one of them must be present; the guard
/// enforces the at-least/at-most-one rule.
pub const ADMIN_TOOLS: &[ToolDefinition] = &[
    ToolDefinition {
        action_type: ActionType::GrantProPlan,
        required_params: &["userId"],
        required_payload_keys: &["plan"],
        optional_payload_keys: &[],
    },
    ToolDefinition {
        action_type: ActionType::UpdateOrgTier,
        required_params: &["orgId"],
        required_payload_keys: &["tier"],
        optional_payload_keys: &[],
    },
    ToolDefinition {
        action_type: ActionType::UpdateOrgCredit,
        required_params: &["orgId"],
        required_payload_keys: &[],
        optional_payload_keys: &["credit", "creditDelta"],
    },
    ToolDefinition {
        action_type: ActionType::AssignOrg,
        required_params: &["userId"],
        required_payload_keys: &["orgId"],
        optional_payload_keys: &[],
    },
];

/// Look up the tool definition for an action. `None` for `ActionType::None`.
pub fn tool_definition(action: ActionType) -> Option<&'static ToolDefinition> {
    ADMIN_TOOLS.iter().find(|tool| tool.action_type == action)
}

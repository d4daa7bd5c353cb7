//! Admin API path templates for executable actions.

use crate::types::ActionType;
use std::collections::BTreeMap;

/// Path template for an executable action. `None` for `ActionType::None`.
pub fn endpoint_template(action: ActionType) -> Option<&'static str> {
    match action {
        ActionType::GrantProPlan => Some("/api/admin/users/{userId}/plan/grant"),
        ActionType::UpdateOrgTier => Some("/api/admin/orgs/{orgId}/tier/update"),
        ActionType::UpdateOrgCredit => Some("/api/admin/orgs/{orgId}/credit/update"),
        ActionType::AssignOrg => Some("/api/admin/users/{userId}/org/assign"),
        ActionType::None => None,
    }
}

/// Resolve the endpoint path for `action`, substituting `{userId}`/`{orgId}`
/// placeholders from `params`. Callers must guard-validate first: a missing
/// param would otherwise leave its placeholder in the path.
pub fn resolve_endpoint(action: ActionType, params: &BTreeMap<String, String>) -> Option<String> {
    let template = endpoint_template(action)?;
    let mut path = template.to_string();
    for (key, value) in params {
        path = path.replace(&format!("{{{key}}}"), value);
    }
    Some(path)
}

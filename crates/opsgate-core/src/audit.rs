use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Actor / DecisionAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    Human,
    Ai,
}

impl Actor {
    pub fn as_str(self) -> &'static str {
        match self {
            Actor::Human => "HUMAN",
            Actor::Ai => "AI",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Actor {
    type Err = crate::error::OpsgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HUMAN" => Ok(Actor::Human),
            "AI" => Ok(Actor::Ai),
            _ => Err(crate::error::OpsgateError::Invalid(format!(
                "unknown actor: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionAction {
    Create,
    Hold,
    Ignore,
    Execute,
}

impl DecisionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionAction::Create => "CREATE",
            DecisionAction::Hold => "HOLD",
            DecisionAction::Ignore => "IGNORE",
            DecisionAction::Execute => "EXECUTE",
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DecisionAction {
    type Err = crate::error::OpsgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(DecisionAction::Create),
            "HOLD" => Ok(DecisionAction::Hold),
            "IGNORE" => Ok(DecisionAction::Ignore),
            "EXECUTE" => Ok(DecisionAction::Execute),
            _ => Err(crate::error::OpsgateError::Invalid(format!(
                "unknown decision action: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// DecisionLogEntry
// ---------------------------------------------------------------------------

/// One append-only audit record. Loosely associated to a candidate by id at
/// the store level; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLogEntry {
    pub actor: Actor,
    pub action: DecisionAction,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl DecisionLogEntry {
    pub fn ai_hold(reason: impl Into<String>) -> Self {
        Self {
            actor: Actor::Ai,
            action: DecisionAction::Hold,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn human_hold(reason: impl Into<String>) -> Self {
        Self {
            actor: Actor::Human,
            action: DecisionAction::Hold,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn human_create(reason: impl Into<String>) -> Self {
        Self {
            actor: Actor::Human,
            action: DecisionAction::Create,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}

//! Planner input context built from a candidate.

use crate::types::Candidate;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-text context handed to the planner. Pure data: the planner renders it
/// to prompt text and never looks anywhere else for candidate state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextObject {
    pub source: String,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_text: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub recent_signals: Vec<String>,
}

impl ContextObject {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            source: candidate.source.clone(),
            event_id: candidate.id.clone(),
            timestamp: Utc::now(),
            normalized_text: Some(candidate.title.clone()),
            metadata: BTreeMap::new(),
            recent_signals: Vec::new(),
        }
    }

    /// Deterministic line-per-field rendering used as the user message in
    /// both planner calls. Empty optional fields are omitted entirely.
    pub fn prompt_text(&self) -> String {
        let mut lines = vec![
            format!("source: {}", self.source),
            format!("eventId: {}", self.event_id),
            format!(
                "timestamp: {}",
                self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        ];
        if let Some(text) = &self.normalized_text {
            lines.push(format!("text: {text}"));
        }
        if !self.metadata.is_empty() {
            let json = serde_json::to_string(&self.metadata).unwrap_or_default();
            lines.push(format!("metadata: {json}"));
        }
        if !self.recent_signals.is_empty() {
            lines.push(format!("recentSignals: {}", self.recent_signals.join(" | ")));
        }
        lines.join("\n")
    }
}

//! Reasoning trace: an inspectable record of one loop run.
//!
//! The transcript is what the model sees. The trace is what a human reads:
//! one entry per Thoughts block, Action block, Observation, and the final
//! answer, each stamped with the time it was produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the reasoning trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub kind: TraceKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TraceEntry {
    pub fn new(kind: TraceKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Kind of trace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceKind {
    Thought,
    Action,
    Observation,
    FinalAnswer,
}

impl std::fmt::Display for TraceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thought => write!(f, "Thought"),
            Self::Action => write!(f, "Action"),
            Self::Observation => write!(f, "Observation"),
            Self::FinalAnswer => write!(f, "Final Answer"),
        }
    }
}

/// Render a trace as readable text, one block per entry.
pub fn render(trace: &[TraceEntry]) -> String {
    let mut out = String::new();
    for entry in trace {
        out.push_str(&format!("**{}:** {}\n\n", entry.kind, entry.content.trim()));
    }
    out
}

//! Audit records appended to the run's step log.
//!
//! Each completed activity contributes exactly one step, in invocation
//! order. Steps are never reordered or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An argv-style command: an ordered list of string tokens with no shell
/// interpretation implied.
pub type CommandLine = Vec<String>;

/// A single high-level step executed by the workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step name (e.g. "clone-repository")
    pub name: String,

    /// Human-readable description of what happened
    pub description: String,

    /// Commands the activity constructed, in execution order
    pub commands: Vec<CommandLine>,

    /// When the step was appended to the log
    pub recorded_at: DateTime<Utc>,
}

impl WorkflowStep {
    /// Create a step recorded at the current time
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        commands: Vec<CommandLine>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            commands,
            recorded_at: Utc::now(),
        }
    }
}

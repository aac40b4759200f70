//! Workflow error kinds.
//!
//! The orchestrator never retries or recovers locally; retry is an
//! engine-configured policy per activity. Invariant violations indicate a
//! programming defect and are fatal.

use thiserror::Error;

/// Errors surfaced by the workflow and the engine boundary
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A payload could not cross the engine boundary
    #[error("Invalid activity input: {0}")]
    InvalidInput(String),

    /// An activity's external operation failed; propagated unchanged
    #[error("Activity '{activity}' failed: {source}")]
    ActivityFailure {
        activity: String,
        #[source]
        source: anyhow::Error,
    },

    /// An activity was invoked out of order or a normalization invariant
    /// was broken; unrecoverable
    #[error("Orchestration invariant violated: {0}")]
    InvariantViolation(String),
}

impl WorkflowError {
    /// Wrap an engine-origin failure for a named activity
    pub fn activity_failure(activity: impl Into<String>, source: anyhow::Error) -> Self {
        Self::ActivityFailure {
            activity: activity.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_failure_display() {
        let err = WorkflowError::activity_failure(
            "pr_creator.clone_repository",
            anyhow::anyhow!("network unreachable"),
        );

        let message = err.to_string();
        assert!(message.contains("pr_creator.clone_repository"));
        assert!(message.contains("network unreachable"));
    }

    #[test]
    fn test_invariant_violation_display() {
        let err = WorkflowError::InvariantViolation("empty token in command".to_string());

        assert!(err.to_string().starts_with("Orchestration invariant violated"));
    }
}

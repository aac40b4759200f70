//! Adapter interfaces for the durable-execution engine.
//!
//! The engine is an external collaborator: it owns activity dispatch,
//! suspension, retries, and timeouts. The orchestrator consumes exactly
//! two primitives from it: invoke an activity by name with a payload and
//! await the result, and log a message.

pub mod inprocess;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::core::error::WorkflowError;

// Re-export the in-process engine
pub use inprocess::InProcessEngine;

/// Boundary against the durable-execution engine
#[async_trait]
pub trait ActivityDispatcher: Send + Sync {
    /// Invoke an activity by qualified name and await its result.
    ///
    /// Payloads cross the boundary as JSON; the engine applies the
    /// activity's registered timeout and retry configuration.
    async fn dispatch(&self, name: &str, input: Value) -> Result<Value, WorkflowError>;

    /// Emit a log message attributed to the current run
    fn log(&self, message: &str);
}

/// Typed dispatch helper.
///
/// Serializes the input record, dispatches by name, and deserializes the
/// output record, so callers work in typed contracts only. A malformed
/// output is a contract breach between orchestrator and registry, reported
/// as an invariant violation.
pub async fn execute_activity<I, O>(
    engine: &dyn ActivityDispatcher,
    name: &str,
    input: &I,
) -> Result<O, WorkflowError>
where
    I: Serialize + Sync,
    O: DeserializeOwned,
{
    let payload = serde_json::to_value(input)
        .map_err(|e| WorkflowError::InvalidInput(format!("activity '{}': {}", name, e)))?;

    let output = engine.dispatch(name, payload).await?;

    serde_json::from_value(output).map_err(|e| {
        WorkflowError::InvariantViolation(format!(
            "activity '{}' returned a malformed output payload: {}",
            name, e
        ))
    })
}

//! In-process engine for tests and CLI runs.
//!
//! Implements the dispatcher boundary by invoking registered handlers
//! directly, while still honoring the engine-level contract: per-attempt
//! timeouts, retry with backoff, and replay-safe result recording.
//!
//! Completed invocations are recorded under an idempotency key derived
//! from the qualified name and the input payload. Re-dispatching an
//! identical invocation replays the recorded result instead of re-running
//! the handler, so randomly minted identifiers stay stable when a run is
//! re-executed after a crash. One engine instance is scoped to one run;
//! separate runs use separate instances and therefore mint fresh
//! identifiers.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::core::error::WorkflowError;
use crate::core::registry::{ActivityRegistry, RegisteredActivity};

use super::ActivityDispatcher;

/// Engine that dispatches to registered handlers in-process
pub struct InProcessEngine {
    registry: ActivityRegistry,
    completed: Mutex<HashMap<String, Value>>,
}

impl InProcessEngine {
    /// Create an engine over a registry
    pub fn new(registry: ActivityRegistry) -> Self {
        Self {
            registry,
            completed: Mutex::new(HashMap::new()),
        }
    }

    /// The registry this engine dispatches into
    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    async fn invoke_with_retry(
        &self,
        activity: &RegisteredActivity,
        input: Value,
    ) -> Result<Value, WorkflowError> {
        let attempt_budget = activity.options.start_to_close();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result = match timeout(attempt_budget, activity.invoke(input.clone())).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!(
                    "activity timed out after {:?}",
                    attempt_budget
                )),
            };

            match result {
                Ok(output) => return Ok(output),
                Err(e) => {
                    if activity.options.retry.should_retry(attempt) {
                        let delay = activity.options.retry.delay_for_attempt(attempt);

                        warn!(
                            activity = %activity.name,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Activity failed, retrying"
                        );

                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    error!(
                        activity = %activity.name,
                        attempt,
                        error = %e,
                        "Activity failed permanently"
                    );

                    return Err(WorkflowError::activity_failure(activity.name.clone(), e));
                }
            }
        }
    }
}

#[async_trait]
impl ActivityDispatcher for InProcessEngine {
    async fn dispatch(&self, name: &str, input: Value) -> Result<Value, WorkflowError> {
        let activity = self.registry.get(name).ok_or_else(|| {
            WorkflowError::activity_failure(name, anyhow!("activity is not registered"))
        })?;

        let key = idempotency_key(name, &input);

        {
            let completed = self.completed.lock().await;
            if let Some(recorded) = completed.get(&key) {
                debug!(activity = %name, "Activity already completed, replaying recorded result");
                return Ok(recorded.clone());
            }
        }

        let output = self.invoke_with_retry(activity, input).await?;

        self.completed.lock().await.insert(key, output.clone());
        info!(activity = %name, "Activity completed");

        Ok(output)
    }

    fn log(&self, message: &str) {
        info!("{message}");
    }
}

/// Idempotency key format: "{activity}:{payload_hash16}"
fn idempotency_key(name: &str, input: &Value) -> String {
    format!("{}:{}", name, hash_payload(input))
}

/// Hash a payload (first 16 hex chars of SHA256 over the canonical JSON)
fn hash_payload(input: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.to_string().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::ids::SequenceIdProvider;
    use crate::core::registry::builtin_registry;

    #[tokio::test]
    async fn test_unregistered_activity_is_a_failure() {
        let engine = InProcessEngine::new(ActivityRegistry::new());

        let result = engine.dispatch("pr_creator.unknown", Value::Null).await;

        assert!(matches!(
            result,
            Err(WorkflowError::ActivityFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_dispatch_records_and_replays() {
        let engine = InProcessEngine::new(builtin_registry(Arc::new(SequenceIdProvider::new())));
        let config = crate::domain::ContainerConfig::new("ghcr.io/pr-creator/worker:latest");
        let payload = serde_json::to_value(&config).unwrap();

        let first = engine
            .dispatch("pr_creator.start_caas_container", payload.clone())
            .await
            .unwrap();
        let replayed = engine
            .dispatch("pr_creator.start_caas_container", payload)
            .await
            .unwrap();

        assert_eq!(first, replayed);
    }

    #[test]
    fn test_idempotency_key_format() {
        let payload = serde_json::json!({"image": "worker:latest"});

        let key = idempotency_key("pr_creator.start_caas_container", &payload);

        let parts: Vec<&str> = key.rsplitn(2, ':').collect();
        assert_eq!(parts[1], "pr_creator.start_caas_container");
        assert_eq!(parts[0].len(), 16);
    }

    #[test]
    fn test_payload_hash_consistency() {
        let a = serde_json::json!({"image": "worker:latest"});
        let b = serde_json::json!({"image": "worker:latest"});
        let c = serde_json::json!({"image": "worker:v2"});

        assert_eq!(hash_payload(&a), hash_payload(&b));
        assert_ne!(hash_payload(&a), hash_payload(&c));
    }
}

//! Explicit activity registry.
//!
//! The registry maps each stable qualified activity name to its handler
//! and the engine-level configuration attached to it. It is built once at
//! process startup and handed to the engine adapter; the orchestrator
//! invokes activities purely by name and never inspects the options.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::activities;
use super::ids::IdProvider;

/// Retry policy the engine applies to a failing activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including first try)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Backoff multiplier (delay *= multiplier after each retry)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_max_delay() -> u64 {
    30000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Calculate delay for a specific attempt (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::from_millis(self.initial_delay_ms);
        }

        let delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);

        let capped = delay.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(capped)
    }

    /// Check if we should retry based on attempt count
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Engine-level knobs attached to a registered activity.
///
/// Consumed only by the engine; the orchestrator never reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOptions {
    /// Overall budget from scheduling to completion, in seconds
    pub schedule_to_close_seconds: Option<u64>,

    /// Budget for a single attempt, in seconds
    #[serde(default = "default_start_to_close")]
    pub start_to_close_seconds: u64,

    /// Heartbeat interval for long-running activities, in seconds
    pub heartbeat_seconds: Option<u64>,

    /// Retry policy applied by the engine
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_start_to_close() -> u64 {
    60
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self {
            schedule_to_close_seconds: None,
            start_to_close_seconds: default_start_to_close(),
            heartbeat_seconds: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl ActivityOptions {
    /// Single-attempt budget as a [`Duration`]
    pub fn start_to_close(&self) -> Duration {
        Duration::from_secs(self.start_to_close_seconds)
    }
}

/// Future returned by an activity handler
pub type ActivityFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

type ActivityHandler = Arc<dyn Fn(Value) -> ActivityFuture + Send + Sync>;

/// A handler plus its engine configuration, keyed by qualified name
#[derive(Clone)]
pub struct RegisteredActivity {
    /// Stable qualified name (e.g. "pr_creator.clone_repository")
    pub name: String,

    /// Engine-level configuration
    pub options: ActivityOptions,

    handler: ActivityHandler,
}

impl RegisteredActivity {
    /// Invoke the handler with a JSON payload
    pub fn invoke(&self, payload: Value) -> ActivityFuture {
        (self.handler)(payload)
    }
}

/// Mapping from stable activity name to handler and options.
///
/// Constructed explicitly at startup; there is no global registration
/// state.
#[derive(Clone, Default)]
pub struct ActivityRegistry {
    activities: HashMap<String, RegisteredActivity>,
}

impl ActivityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler under a qualified name.
    ///
    /// The handler is wrapped so payloads are decoded/encoded at the
    /// boundary; a payload that does not match the input type fails the
    /// invocation.
    pub fn register<I, O, F>(&mut self, name: &str, options: ActivityOptions, handler: F)
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + 'static,
        F: Fn(I) -> Result<O> + Send + Sync + 'static,
    {
        let activity_name = name.to_string();
        let wrapped: ActivityHandler = Arc::new(move |payload: Value| {
            let decoded: Result<I> = serde_json::from_value(payload)
                .with_context(|| format!("Malformed input payload for activity '{}'", activity_name));
            let result = decoded
                .and_then(|input| handler(input))
                .and_then(|output| {
                    serde_json::to_value(output).context("Failed to encode activity output")
                });
            Box::pin(async move { result }) as ActivityFuture
        });

        self.activities.insert(
            name.to_string(),
            RegisteredActivity {
                name: name.to_string(),
                options,
                handler: wrapped,
            },
        );
    }

    /// Look up an activity by qualified name
    pub fn get(&self, name: &str) -> Option<&RegisteredActivity> {
        self.activities.get(name)
    }

    /// Registered qualified names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.activities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over registered activities in name order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredActivity> {
        let mut entries: Vec<&RegisteredActivity> = self.activities.values().collect();
        entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        entries.into_iter()
    }

    /// Number of registered activities
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// Build the registry for the PR-creation workflow.
///
/// Identifier minting is injected so tests and replay-consistent engines
/// can substitute deterministic providers.
pub fn builtin_registry(ids: Arc<dyn IdProvider>) -> ActivityRegistry {
    let mut registry = ActivityRegistry::new();

    let provider = ids.clone();
    registry.register(
        activities::START_CAAS_CONTAINER,
        ActivityOptions {
            schedule_to_close_seconds: Some(600),
            start_to_close_seconds: 120,
            heartbeat_seconds: Some(30),
            retry: RetryPolicy::default(),
        },
        move |config: crate::domain::ContainerConfig| {
            Ok(activities::start_caas_container(provider.as_ref(), &config))
        },
    );

    registry.register(
        activities::CLONE_REPOSITORY,
        ActivityOptions {
            schedule_to_close_seconds: Some(900),
            start_to_close_seconds: 300,
            heartbeat_seconds: None,
            retry: RetryPolicy::default(),
        },
        |input: activities::CloneRepositoryInput| Ok(activities::clone_repository(&input)),
    );

    registry.register(
        activities::APPLY_SEDIMENT_PATCH,
        ActivityOptions {
            schedule_to_close_seconds: None,
            start_to_close_seconds: 120,
            heartbeat_seconds: None,
            retry: RetryPolicy::default(),
        },
        |input: activities::ApplySedimentInput| Ok(activities::apply_sediment_patch(&input)),
    );

    let provider = ids;
    registry.register(
        activities::CREATE_BRANCH_AND_PUSH,
        ActivityOptions {
            schedule_to_close_seconds: None,
            start_to_close_seconds: 180,
            heartbeat_seconds: None,
            retry: RetryPolicy::default(),
        },
        move |input: activities::CreateBranchAndPushInput| {
            Ok(activities::create_branch_and_push(provider.as_ref(), &input))
        },
    );

    registry
}

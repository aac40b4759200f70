//! Core orchestration logic.
//!
//! This module contains:
//! - Commands: pure argv-style command construction
//! - Activities: typed activity contracts and their handlers
//! - Registry: explicit name -> handler/options mapping
//! - Ids: injected identifier generation
//! - Orchestrator: the run state machine

pub mod activities;
pub mod commands;
pub mod error;
pub mod ids;
pub mod orchestrator;
pub mod registry;

// Re-export commonly used types
pub use error::WorkflowError;
pub use ids::{IdProvider, SequenceIdProvider, UuidIdProvider};
pub use orchestrator::Orchestrator;
pub use registry::{builtin_registry, ActivityOptions, ActivityRegistry, RetryPolicy};

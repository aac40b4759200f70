//! pr-creator - durable PR-creation workflow orchestrator
//!
//! A Rust core for a workflow that prepares a pull request inside a CaaS
//! container: provision the container, clone the target repository, apply
//! a precomputed sediment diff, then create a branch, commit, and push it.
//!
//! # Architecture
//!
//! The crate only constructs exact command argument lists and records them
//! in an ordered step log; executing commands, retrying activities, and
//! recovering from crashes belong to an external durable-execution engine:
//! - Activities are pure typed contracts registered by stable name
//! - The orchestrator sequences them through a strict state machine
//! - The engine boundary is a two-primitive dispatcher trait
//!
//! # Modules
//!
//! - `adapters`: Engine boundary (dispatcher trait, in-process engine)
//! - `core`: Orchestration logic (commands, activities, registry, state machine)
//! - `domain`: Data structures (container, git options, steps, run states)
//! - `controller`: The `create_pull_request` entry point
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create a PR through the CaaS workflow
//! pr-creator create --repository-url https://example.com/repo.git \
//!     --new-branch feature/apply-sediment --sediment-key builds/1234/diff \
//!     -m "Apply sediment" --author-name Ada --author-email ada@example.com \
//!     --use-workflow
//!
//! # Inspect the registered activities
//! pr-creator activities
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod controller;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{ActivityDispatcher, InProcessEngine};
pub use controller::{
    ControllerError, CreatePullRequestRequest, CreatePullRequestResponse, EngineWorkflowRunner,
    FeatureFlags, InProcessWorkflowRunner, PullRequestController, WorkflowRunner,
};
pub use core::{Orchestrator, WorkflowError};
pub use domain::{
    ContainerConfig, ContainerHandle, GitCloneOptions, GitCommitOptions, PushOptions, RunState,
    SedimentArtifact, WorkflowInput, WorkflowResult, WorkflowStep,
};

//! Controller for pull request creation.
//!
//! The controller keeps the legacy behaviour as the default path. When
//! `enable_caas_workflow` is set it builds a workflow input from the
//! request and delegates to an injected runner, which either drives the
//! orchestrator in-process or hands the run to a durable-execution
//! engine. Engine-origin failures are wrapped into [`ControllerError`]
//! before they reach callers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::adapters::{ActivityDispatcher, InProcessEngine};
use crate::core::error::WorkflowError;
use crate::core::ids::{IdProvider, UuidIdProvider};
use crate::core::registry::builtin_registry;
use crate::core::Orchestrator;
use crate::domain::{
    ContainerConfig, GitCloneOptions, GitCommitOptions, PushOptions, SedimentArtifact,
    WorkflowInput, WorkflowResult, WorkflowStep,
};

/// Feature flags for the controller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Route PR creation through the CaaS workflow
    #[serde(default)]
    pub enable_caas_workflow: bool,
}

/// Input payload for [`PullRequestController::create_pull_request`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePullRequestRequest {
    /// Target repository URL
    pub repository_url: String,

    /// Branch the work is based on
    pub base_branch: String,

    /// Branch to create
    pub new_branch: String,

    /// Storage key of the sediment diff
    pub sediment_storage_key: String,

    /// Commit message
    pub commit_message: String,

    /// Commit author name
    pub author_name: String,

    /// Commit author email
    pub author_email: String,

    /// Push configuration; defaults apply when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_options: Option<PushOptions>,
}

/// Response returned after creating the PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePullRequestResponse {
    /// The branch carrying the change
    pub branch: String,

    /// Commit identifier; empty on the legacy path
    pub commit_sha: String,

    /// Whether the orchestrated workflow produced this response
    pub used_workflow: bool,

    /// Ordered step log; empty on the legacy path
    pub steps: Vec<WorkflowStep>,
}

/// Errors surfaced to controller callers
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The request failed validation before any activity was invoked
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The workflow run failed
    #[error("Pull request workflow failed: {0}")]
    Workflow(#[from] WorkflowError),
}

/// Abstraction over how a workflow run is executed
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    /// Execute one run to completion
    async fn run(&self, input: WorkflowInput) -> Result<WorkflowResult, WorkflowError>;
}

/// Runner that drives the orchestrator over a fresh in-process engine.
///
/// A new engine is created per run, so the replay cache never leaks
/// recorded identifiers between runs.
pub struct InProcessWorkflowRunner {
    ids: Arc<dyn IdProvider>,
}

impl Default for InProcessWorkflowRunner {
    fn default() -> Self {
        Self::new(Arc::new(UuidIdProvider))
    }
}

impl InProcessWorkflowRunner {
    /// Create a runner with the given identifier provider
    pub fn new(ids: Arc<dyn IdProvider>) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl WorkflowRunner for InProcessWorkflowRunner {
    async fn run(&self, input: WorkflowInput) -> Result<WorkflowResult, WorkflowError> {
        let engine = Arc::new(InProcessEngine::new(builtin_registry(self.ids.clone())));
        Orchestrator::new(engine).run(input).await
    }
}

/// Runner that drives the orchestrator over an externally supplied engine.
///
/// The dispatcher is whatever adapter connects this process to the durable
/// execution service; its lifetime and replay scoping are owned by the
/// caller.
pub struct EngineWorkflowRunner {
    engine: Arc<dyn ActivityDispatcher>,
}

impl EngineWorkflowRunner {
    /// Create a runner over an engine adapter
    pub fn new(engine: Arc<dyn ActivityDispatcher>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl WorkflowRunner for EngineWorkflowRunner {
    async fn run(&self, input: WorkflowInput) -> Result<WorkflowResult, WorkflowError> {
        Orchestrator::new(self.engine.clone()).run(input).await
    }
}

/// High level controller used by the API surface
pub struct PullRequestController {
    flags: FeatureFlags,
    runner: Arc<dyn WorkflowRunner>,
    container: ContainerConfig,
}

impl PullRequestController {
    /// Create a controller with explicit flags, runner, and container config
    pub fn new(
        flags: FeatureFlags,
        runner: Arc<dyn WorkflowRunner>,
        container: ContainerConfig,
    ) -> Self {
        Self {
            flags,
            runner,
            container,
        }
    }

    /// Create the PR either via the workflow or the legacy path
    pub async fn create_pull_request(
        &self,
        request: CreatePullRequestRequest,
    ) -> Result<CreatePullRequestResponse, ControllerError> {
        if !self.flags.enable_caas_workflow {
            info!(branch = %request.new_branch, "CaaS workflow disabled, using legacy path");
            return Ok(self.legacy_create_pull_request(request));
        }

        validate_request(&request)?;

        let input = WorkflowInput {
            container: self.container.clone(),
            clone: GitCloneOptions::new(request.repository_url, request.base_branch),
            sediment: SedimentArtifact::new(request.sediment_storage_key),
            new_branch: request.new_branch,
            commit: GitCommitOptions {
                message: request.commit_message,
                author_name: request.author_name,
                author_email: request.author_email,
            },
            push: request.push_options.unwrap_or_default(),
        };

        let result = self.runner.run(input).await?;

        Ok(CreatePullRequestResponse {
            branch: result.new_branch,
            commit_sha: result.commit_sha,
            used_workflow: true,
            steps: result.steps,
        })
    }

    /// Placeholder for the existing PR creation path
    fn legacy_create_pull_request(
        &self,
        request: CreatePullRequestRequest,
    ) -> CreatePullRequestResponse {
        CreatePullRequestResponse {
            branch: request.new_branch,
            commit_sha: String::new(),
            used_workflow: false,
            steps: Vec::new(),
        }
    }
}

fn validate_request(request: &CreatePullRequestRequest) -> Result<(), ControllerError> {
    if request.repository_url.is_empty() {
        return Err(ControllerError::InvalidRequest(
            "repository_url must not be empty".to_string(),
        ));
    }
    if request.base_branch.is_empty() || request.new_branch.is_empty() {
        return Err(ControllerError::InvalidRequest(
            "base_branch and new_branch must not be empty".to_string(),
        ));
    }
    if request.sediment_storage_key.is_empty() {
        return Err(ControllerError::InvalidRequest(
            "sediment_storage_key must not be empty".to_string(),
        ));
    }
    if !request.author_email.contains('@') {
        return Err(ControllerError::InvalidRequest(format!(
            "author_email '{}' is not an email address",
            request.author_email
        )));
    }
    Ok(())
}

//! Controller Integration Tests
//!
//! Feature-flag routing, request validation, and error wrapping.

use std::sync::Arc;

use async_trait::async_trait;
use pr_creator::core::ids::SequenceIdProvider;
use pr_creator::{
    ContainerConfig, ControllerError, CreatePullRequestRequest, FeatureFlags,
    InProcessWorkflowRunner, PullRequestController, WorkflowError, WorkflowInput, WorkflowResult,
    WorkflowRunner,
};

fn request() -> CreatePullRequestRequest {
    CreatePullRequestRequest {
        repository_url: "https://example.com/repo.git".to_string(),
        base_branch: "main".to_string(),
        new_branch: "feature/apply-sediment".to_string(),
        sediment_storage_key: "builds/1234/diff".to_string(),
        commit_message: "Apply sediment".to_string(),
        author_name: "Ada Lovelace".to_string(),
        author_email: "ada@example.com".to_string(),
        push_options: None,
    }
}

fn container() -> ContainerConfig {
    ContainerConfig::new("ghcr.io/pr-creator/worker:latest")
}

fn controller(enable_caas_workflow: bool) -> PullRequestController {
    PullRequestController::new(
        FeatureFlags {
            enable_caas_workflow,
        },
        Arc::new(InProcessWorkflowRunner::new(Arc::new(
            SequenceIdProvider::new(),
        ))),
        container(),
    )
}

#[tokio::test]
async fn test_flag_off_uses_legacy_path() {
    let response = controller(false).create_pull_request(request()).await.unwrap();

    assert!(!response.used_workflow);
    assert_eq!(response.branch, "feature/apply-sediment");
    assert_eq!(response.commit_sha, "");
    assert!(response.steps.is_empty());
}

#[tokio::test]
async fn test_flag_off_ignores_request_contents() {
    let mut bad = request();
    bad.repository_url = String::new();
    bad.author_email = "nonsense".to_string();

    let response = controller(false).create_pull_request(bad).await.unwrap();

    assert!(!response.used_workflow);
}

#[tokio::test]
async fn test_flag_on_runs_the_workflow() {
    let response = controller(true).create_pull_request(request()).await.unwrap();

    assert!(response.used_workflow);
    assert!(!response.commit_sha.is_empty());

    let names: Vec<&str> = response.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "start-container",
            "clone-repository",
            "apply-sediment",
            "push-branch",
        ]
    );
}

#[tokio::test]
async fn test_flag_on_rejects_malformed_request() {
    let mut bad = request();
    bad.repository_url = String::new();

    let result = controller(true).create_pull_request(bad).await;

    assert!(matches!(result, Err(ControllerError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_custom_push_options_reach_the_step_log() {
    let mut forced = request();
    forced.push_options = Some(pr_creator::PushOptions {
        remote: "upstream".to_string(),
        force: true,
    });

    let response = controller(true).create_pull_request(forced).await.unwrap();

    let push_command = response.steps[3].commands.last().unwrap();
    assert!(push_command.iter().any(|t| t == "upstream"));
    assert_eq!(push_command.last().unwrap(), "--force");
}

/// Runner that fails every run, standing in for a broken engine
struct FailingRunner;

#[async_trait]
impl WorkflowRunner for FailingRunner {
    async fn run(&self, _input: WorkflowInput) -> Result<WorkflowResult, WorkflowError> {
        Err(WorkflowError::activity_failure(
            "pr_creator.clone_repository",
            anyhow::anyhow!("engine unavailable"),
        ))
    }
}

#[tokio::test]
async fn test_workflow_failure_is_wrapped_for_callers() {
    let controller = PullRequestController::new(
        FeatureFlags {
            enable_caas_workflow: true,
        },
        Arc::new(FailingRunner),
        container(),
    );

    let result = controller.create_pull_request(request()).await;

    match result {
        Err(ControllerError::Workflow(WorkflowError::ActivityFailure { activity, .. })) => {
            assert_eq!(activity, "pr_creator.clone_repository");
        }
        other => panic!("expected wrapped activity failure, got {:?}", other.map(|_| ())),
    }
}

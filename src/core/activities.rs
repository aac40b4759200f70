//! Activity contracts for the PR-creation workflow.
//!
//! Each activity is a named, typed, externally retryable operation. The
//! functions here only construct command lists and mint identifiers; the
//! engine owns dispatch, retry, and timeouts. Inputs and outputs cross the
//! engine boundary as JSON, so every record derives serde traits.

use serde::{Deserialize, Serialize};

use crate::domain::{
    CommandLine, ContainerConfig, ContainerHandle, GitCloneOptions, GitCommitOptions, PushOptions,
    SedimentArtifact,
};

use super::commands;
use super::ids::IdProvider;

/// Qualified name of the container provisioning activity
pub const START_CAAS_CONTAINER: &str = "pr_creator.start_caas_container";

/// Qualified name of the clone activity
pub const CLONE_REPOSITORY: &str = "pr_creator.clone_repository";

/// Qualified name of the patch-apply activity
pub const APPLY_SEDIMENT_PATCH: &str = "pr_creator.apply_sediment_patch";

/// Qualified name of the branch-and-push activity
pub const CREATE_BRANCH_AND_PUSH: &str = "pr_creator.create_branch_and_push";

/// Input for the clone activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneRepositoryInput {
    /// Container the clone runs in
    pub container: ContainerHandle,

    /// Clone options
    pub options: GitCloneOptions,

    /// Checkout directory relative to the container workspace
    #[serde(default = "default_checkout_path")]
    pub checkout_path: String,
}

fn default_checkout_path() -> String {
    "repo".to_string()
}

impl CloneRepositoryInput {
    /// Create an input with the default checkout path
    pub fn new(container: ContainerHandle, options: GitCloneOptions) -> Self {
        Self {
            container,
            options,
            checkout_path: default_checkout_path(),
        }
    }
}

/// Output of the clone activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneRepositoryOutput {
    /// Resolved path of the checkout inside the container
    pub repository_path: String,

    /// Commands required to perform the clone
    pub commands: Vec<CommandLine>,
}

/// Input for the patch-apply activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplySedimentInput {
    /// Container the patch is applied in
    pub container: ContainerHandle,

    /// Path of the repository checkout
    pub repository_path: String,

    /// Sediment artifact to download and apply
    pub sediment: SedimentArtifact,
}

/// Output of the patch-apply activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplySedimentOutput {
    /// Download, upload, and apply commands, in that order
    pub commands: Vec<CommandLine>,
}

/// Input for the branch-and-push activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBranchAndPushInput {
    /// Container the commands run in
    pub container: ContainerHandle,

    /// Path of the repository checkout
    pub repository_path: String,

    /// Branch to create
    pub new_branch: String,

    /// Branch the work is based on
    pub base_branch: String,

    /// Commit message and author
    pub commit: GitCommitOptions,

    /// Push configuration
    pub push: PushOptions,
}

/// Output of the branch-and-push activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBranchAndPushOutput {
    /// Checkout, branch, commit, and push commands, in that order
    pub commands: Vec<CommandLine>,

    /// Commit identifier minted for the push
    pub commit_sha: String,
}

/// Provision a container and return its handle.
///
/// Each call mints a distinct identifier even for identical input; handle
/// reuse across runs is never valid. Making replay return the same handle
/// is the engine's job (see the in-process engine's idempotency cache).
pub fn start_caas_container(ids: &dyn IdProvider, config: &ContainerConfig) -> ContainerHandle {
    ContainerHandle {
        container_id: ids.container_id(),
        workspace_dir: config.workspace_dir.clone(),
    }
}

/// Construct the commands for the clone step
pub fn clone_repository(input: &CloneRepositoryInput) -> CloneRepositoryOutput {
    let repository_path =
        commands::resolve_checkout_path(&input.container.workspace_dir, &input.checkout_path);
    let command_list = commands::clone_commands(&input.options, &repository_path);

    CloneRepositoryOutput {
        repository_path,
        commands: command_list,
    }
}

/// Construct the commands for downloading and applying the sediment diff
pub fn apply_sediment_patch(input: &ApplySedimentInput) -> ApplySedimentOutput {
    ApplySedimentOutput {
        commands: commands::sediment_commands(&input.repository_path, &input.sediment),
    }
}

/// Construct the commands for creating the branch and pushing it
pub fn create_branch_and_push(
    ids: &dyn IdProvider,
    input: &CreateBranchAndPushInput,
) -> CreateBranchAndPushOutput {
    CreateBranchAndPushOutput {
        commands: commands::branch_and_push_commands(
            &input.repository_path,
            &input.new_branch,
            &input.base_branch,
            &input.commit,
            &input.push,
        ),
        commit_sha: ids.commit_sha(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::SequenceIdProvider;

    fn handle() -> ContainerHandle {
        ContainerHandle {
            container_id: "caas-test".to_string(),
            workspace_dir: "/workspace".to_string(),
        }
    }

    #[test]
    fn test_start_container_uses_configured_workspace() {
        let ids = SequenceIdProvider::new();
        let config = ContainerConfig::new("ghcr.io/pr-creator/worker:latest")
            .with_workspace_dir("/scratch");

        let handle = start_caas_container(&ids, &config);

        assert_eq!(handle.workspace_dir, "/scratch");
        assert!(handle.container_id.starts_with("caas-"));
    }

    #[test]
    fn test_start_container_mints_distinct_ids() {
        let ids = SequenceIdProvider::new();
        let config = ContainerConfig::new("ghcr.io/pr-creator/worker:latest");

        let first = start_caas_container(&ids, &config);
        let second = start_caas_container(&ids, &config);

        assert_ne!(first.container_id, second.container_id);
    }

    #[test]
    fn test_clone_resolves_repository_path() {
        let input = CloneRepositoryInput::new(
            handle(),
            GitCloneOptions::new("https://example.com/repo.git", "main"),
        );

        let output = clone_repository(&input);

        assert_eq!(output.repository_path, "/workspace/repo");
        assert_eq!(output.commands.len(), 1);
    }

    #[test]
    fn test_clone_input_deserializes_default_checkout_path() {
        let json = serde_json::json!({
            "container": {"container_id": "caas-test", "workspace_dir": "/workspace"},
            "options": {"repository_url": "https://example.com/repo.git", "branch": "main"},
        });

        let input: CloneRepositoryInput = serde_json::from_value(json).unwrap();

        assert_eq!(input.checkout_path, "repo");
    }

    #[test]
    fn test_apply_sediment_builds_three_commands() {
        let input = ApplySedimentInput {
            container: handle(),
            repository_path: "/workspace/repo".to_string(),
            sediment: SedimentArtifact::new("builds/1234/diff"),
        };

        let output = apply_sediment_patch(&input);

        assert_eq!(output.commands.len(), 3);
    }

    #[test]
    fn test_create_branch_and_push_mints_commit_sha() {
        let ids = SequenceIdProvider::new();
        let input = CreateBranchAndPushInput {
            container: handle(),
            repository_path: "/workspace/repo".to_string(),
            new_branch: "feature/x".to_string(),
            base_branch: "main".to_string(),
            commit: GitCommitOptions {
                message: "Apply sediment".to_string(),
                author_name: "Ada Lovelace".to_string(),
                author_email: "ada@example.com".to_string(),
            },
            push: PushOptions::default(),
        };

        let output = create_branch_and_push(&ids, &input);

        assert_eq!(output.commands.len(), 4);
        assert_eq!(output.commit_sha.len(), 40);
    }
}

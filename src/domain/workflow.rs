//! Aggregate workflow input/output and the run state machine.

use serde::{Deserialize, Serialize};

use super::container::ContainerConfig;
use super::git::{GitCloneOptions, GitCommitOptions, PushOptions, SedimentArtifact};
use super::step::WorkflowStep;

/// Aggregated configuration for one workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInput {
    /// Container to provision for the run
    pub container: ContainerConfig,

    /// How to clone the target repository
    pub clone: GitCloneOptions,

    /// Sediment diff to apply to the checkout
    pub sediment: SedimentArtifact,

    /// Name of the branch to create
    pub new_branch: String,

    /// Commit message and author
    pub commit: GitCommitOptions,

    /// Push configuration
    #[serde(default)]
    pub push: PushOptions,
}

/// Result returned when the workflow reaches `Completed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    /// The branch that was created and pushed
    pub new_branch: String,

    /// Identifier of the container the run executed in
    pub container_id: String,

    /// Commit identifier minted for the new branch
    pub commit_sha: String,

    /// Ordered step log for audit and testing
    pub steps: Vec<WorkflowStep>,
}

/// State of a workflow run.
///
/// Transitions occur strictly in declaration order, one per completed
/// activity; there is no branching within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No activity has completed yet
    NotStarted,

    /// The CaaS container is provisioned
    ContainerStarted,

    /// The repository checkout exists in the container
    Cloned,

    /// The sediment diff has been applied
    PatchApplied,

    /// The new branch has been committed and pushed
    Pushed,

    /// Terminal state: the aggregate result is available
    Completed,
}

impl RunState {
    /// The only state reachable from this one
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::NotStarted => Some(RunState::ContainerStarted),
            RunState::ContainerStarted => Some(RunState::Cloned),
            RunState::Cloned => Some(RunState::PatchApplied),
            RunState::PatchApplied => Some(RunState::Pushed),
            RunState::Pushed => Some(RunState::Completed),
            RunState::Completed => None,
        }
    }

    /// Whether the run has reached its terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_order() {
        let mut state = RunState::NotStarted;
        let mut visited = vec![state];

        while let Some(next) = state.next() {
            state = next;
            visited.push(state);
        }

        assert_eq!(
            visited,
            vec![
                RunState::NotStarted,
                RunState::ContainerStarted,
                RunState::Cloned,
                RunState::PatchApplied,
                RunState::Pushed,
                RunState::Completed,
            ]
        );
        assert!(state.is_terminal());
    }

    #[test]
    fn test_terminal_state_has_no_successor() {
        assert_eq!(RunState::Completed.next(), None);
    }

    #[test]
    fn test_input_deserializes_with_default_push() {
        let yaml = r#"
container:
  image: "ghcr.io/pr-creator/worker:latest"
clone:
  repository_url: "https://example.com/repo.git"
  branch: main
sediment:
  storage_key: "builds/1234/diff"
new_branch: feature/apply-sediment
commit:
  message: "Apply sediment"
  author_name: "Ada Lovelace"
  author_email: "ada@example.com"
"#;
        let input: WorkflowInput = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(input.push.remote, "origin");
        assert_eq!(input.clone.depth, 1);
        assert_eq!(input.sediment.filename, "sediment.patch");
    }
}

//! Workflow orchestrator for pull request creation.
//!
//! Sequences the four activities exactly once each, in a fixed order,
//! appending one audit step per completed activity. Suspension happens at
//! every dispatch boundary; the engine may interleave unrelated runs but
//! delivers a single run's results in order.

use std::sync::Arc;

use tracing::instrument;

use crate::adapters::{execute_activity, ActivityDispatcher};
use crate::domain::{
    CommandLine, ContainerHandle, RunState, WorkflowInput, WorkflowResult, WorkflowStep,
};

use super::activities::{
    self, ApplySedimentInput, ApplySedimentOutput, CloneRepositoryInput, CloneRepositoryOutput,
    CreateBranchAndPushInput, CreateBranchAndPushOutput,
};
use super::commands::find_empty_token;
use super::error::WorkflowError;

/// Drives one PR-creation run over an engine boundary.
///
/// The orchestrator never retries and never compensates: a failed activity
/// halts the run in its last reached state and the failure propagates
/// unchanged. Tearing down an already-provisioned container is left to an
/// external operator.
pub struct Orchestrator {
    engine: Arc<dyn ActivityDispatcher>,
}

impl Orchestrator {
    /// Create an orchestrator over the given engine
    pub fn new(engine: Arc<dyn ActivityDispatcher>) -> Self {
        Self { engine }
    }

    /// Execute the workflow to completion
    #[instrument(skip(self, input), fields(new_branch = %input.new_branch))]
    pub async fn run(&self, input: WorkflowInput) -> Result<WorkflowResult, WorkflowError> {
        self.engine.log(&format!(
            "Starting PR creation workflow for branch {}",
            input.new_branch
        ));

        let mut state = RunState::NotStarted;
        let mut steps: Vec<WorkflowStep> = Vec::new();

        let handle: ContainerHandle = execute_activity(
            self.engine.as_ref(),
            activities::START_CAAS_CONTAINER,
            &input.container,
        )
        .await?;
        self.record(
            &mut state,
            &mut steps,
            RunState::ContainerStarted,
            WorkflowStep::new(
                "start-container",
                format!("Started CaaS container {}", handle.container_id),
                Vec::new(),
            ),
        )?;

        let clone_result: CloneRepositoryOutput = execute_activity(
            self.engine.as_ref(),
            activities::CLONE_REPOSITORY,
            &CloneRepositoryInput::new(handle.clone(), input.clone.clone()),
        )
        .await?;
        self.record(
            &mut state,
            &mut steps,
            RunState::Cloned,
            WorkflowStep::new(
                "clone-repository",
                "Cloned repository into the container workspace",
                clone_result.commands.clone(),
            ),
        )?;

        let apply_result: ApplySedimentOutput = execute_activity(
            self.engine.as_ref(),
            activities::APPLY_SEDIMENT_PATCH,
            &ApplySedimentInput {
                container: handle.clone(),
                repository_path: clone_result.repository_path.clone(),
                sediment: input.sediment.clone(),
            },
        )
        .await?;
        self.record(
            &mut state,
            &mut steps,
            RunState::PatchApplied,
            WorkflowStep::new(
                "apply-sediment",
                "Downloaded sediment diff and applied it to the checkout",
                apply_result.commands.clone(),
            ),
        )?;

        let push_result: CreateBranchAndPushOutput = execute_activity(
            self.engine.as_ref(),
            activities::CREATE_BRANCH_AND_PUSH,
            &CreateBranchAndPushInput {
                container: handle.clone(),
                repository_path: clone_result.repository_path,
                new_branch: input.new_branch.clone(),
                base_branch: input.clone.branch.clone(),
                commit: input.commit.clone(),
                push: input.push.clone(),
            },
        )
        .await?;
        self.record(
            &mut state,
            &mut steps,
            RunState::Pushed,
            WorkflowStep::new(
                "push-branch",
                "Created the branch and pushed it to the remote",
                push_result.commands.clone(),
            ),
        )?;

        transition(&mut state, RunState::Completed)?;

        self.engine.log(&format!(
            "Finished PR creation workflow for branch {} from container {}",
            input.new_branch, handle.container_id
        ));

        Ok(WorkflowResult {
            new_branch: input.new_branch,
            container_id: handle.container_id,
            commit_sha: push_result.commit_sha,
            steps,
        })
    }

    /// Advance the state machine and append the step for it.
    ///
    /// Rejects out-of-order transitions and command lists carrying empty
    /// tokens; both are programming defects, not runtime conditions.
    fn record(
        &self,
        state: &mut RunState,
        steps: &mut Vec<WorkflowStep>,
        to: RunState,
        step: WorkflowStep,
    ) -> Result<(), WorkflowError> {
        verify_no_empty_tokens(&step.name, &step.commands)?;
        transition(state, to)?;
        steps.push(step);
        Ok(())
    }
}

fn transition(state: &mut RunState, to: RunState) -> Result<(), WorkflowError> {
    if state.next() != Some(to) {
        return Err(WorkflowError::InvariantViolation(format!(
            "illegal transition {:?} -> {:?}",
            state, to
        )));
    }
    *state = to;
    Ok(())
}

fn verify_no_empty_tokens(step_name: &str, commands: &[CommandLine]) -> Result<(), WorkflowError> {
    if let Some((command, token)) = find_empty_token(commands) {
        return Err(WorkflowError::InvariantViolation(format!(
            "step '{}' command {} carries an empty token at position {}",
            step_name, command, token
        )));
    }
    Ok(())
}

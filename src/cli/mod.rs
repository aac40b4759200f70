//! Command-line interface for pr-creator.
//!
//! Provides commands for creating a pull request via the in-process
//! runner, listing the registered activities, and inspecting the resolved
//! configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::controller::{
    CreatePullRequestRequest, CreatePullRequestResponse, FeatureFlags, InProcessWorkflowRunner,
    PullRequestController,
};
use crate::core::ids::UuidIdProvider;
use crate::core::registry::builtin_registry;
use crate::domain::PushOptions;

/// pr-creator - durable PR-creation workflow orchestrator
#[derive(Parser, Debug)]
#[command(name = "pr-creator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (searches .pr-creator/config.yaml if not provided)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a pull request from a sediment artifact
    Create {
        /// Target repository URL
        #[arg(long)]
        repository_url: String,

        /// Branch the work is based on
        #[arg(long, default_value = "main")]
        base_branch: String,

        /// Branch to create
        #[arg(long)]
        new_branch: String,

        /// Storage key of the sediment diff
        #[arg(long)]
        sediment_key: String,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Commit author name
        #[arg(long, env = "PR_CREATOR_AUTHOR_NAME")]
        author_name: String,

        /// Commit author email
        #[arg(long, env = "PR_CREATOR_AUTHOR_EMAIL")]
        author_email: String,

        /// Remote to push to
        #[arg(long, default_value = "origin")]
        remote: String,

        /// Force-push the branch
        #[arg(long)]
        force: bool,

        /// Run the CaaS workflow even if the config flag is off
        #[arg(long)]
        use_workflow: bool,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered activities and their engine configuration
    Activities,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load()?,
        };

        match self.command {
            Commands::Create {
                repository_url,
                base_branch,
                new_branch,
                sediment_key,
                message,
                author_name,
                author_email,
                remote,
                force,
                use_workflow,
                json,
            } => {
                let request = CreatePullRequestRequest {
                    repository_url,
                    base_branch,
                    new_branch,
                    sediment_storage_key: sediment_key,
                    commit_message: message,
                    author_name,
                    author_email,
                    push_options: Some(PushOptions { remote, force }),
                };
                create_pull_request(config, request, use_workflow, json).await
            }
            Commands::Activities => list_activities(),
            Commands::Config => show_config(&config),
        }
    }
}

async fn create_pull_request(
    config: Config,
    request: CreatePullRequestRequest,
    use_workflow: bool,
    json: bool,
) -> Result<()> {
    let flags = if use_workflow {
        FeatureFlags {
            enable_caas_workflow: true,
        }
    } else {
        config.flags
    };

    let controller = PullRequestController::new(
        flags,
        Arc::new(InProcessWorkflowRunner::default()),
        config.container,
    );

    let response = controller
        .create_pull_request(request)
        .await
        .context("Failed to create pull request")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    Ok(())
}

fn print_response(response: &CreatePullRequestResponse) {
    if !response.used_workflow {
        println!("Branch {} handled by the legacy path", response.branch);
        return;
    }

    println!("Branch:     {}", response.branch);
    println!("Commit:     {}", response.commit_sha);
    println!("Steps:");
    for step in &response.steps {
        println!("  {} - {}", step.name, step.description);
        for command in &step.commands {
            println!("      $ {}", command.join(" "));
        }
    }
}

fn list_activities() -> Result<()> {
    let registry = builtin_registry(Arc::new(UuidIdProvider));

    for activity in registry.iter() {
        let options = &activity.options;
        println!("{}", activity.name);
        println!("    start_to_close:    {}s", options.start_to_close_seconds);
        match options.schedule_to_close_seconds {
            Some(seconds) => println!("    schedule_to_close: {}s", seconds),
            None => println!("    schedule_to_close: unset"),
        }
        println!(
            "    retry:             {} attempts, {}ms initial backoff",
            options.retry.max_attempts, options.retry.initial_delay_ms
        );
    }

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: none (defaults)"),
    }
    println!("Image:            {}", config.container.image);
    println!("Workspace:        {}", config.container.workspace_dir);
    println!("Idle timeout:     {}s", config.container.idle_timeout_seconds);
    println!(
        "CaaS workflow:    {}",
        if config.flags.enable_caas_workflow {
            "enabled"
        } else {
            "disabled"
        }
    );

    Ok(())
}

//! CaaS container configuration and handles.
//!
//! A container is provisioned once per run and never reused.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration used when provisioning a CaaS container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Image reference (e.g. "ghcr.io/pr-creator/worker:latest")
    pub image: String,

    /// Startup command tokens
    #[serde(default)]
    pub command: Vec<String>,

    /// Environment variables injected into the container
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Workspace directory inside the container
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: String,

    /// Seconds of inactivity before the CaaS reclaims the container
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

fn default_workspace_dir() -> String {
    "/workspace".to_string()
}

fn default_idle_timeout() -> u64 {
    600
}

impl ContainerConfig {
    /// Create a config for an image with defaults for everything else
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            command: Vec::new(),
            environment: HashMap::new(),
            workspace_dir: default_workspace_dir(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }

    /// Set the startup command
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// Set the workspace directory
    pub fn with_workspace_dir(mut self, workspace_dir: impl Into<String>) -> Self {
        self.workspace_dir = workspace_dir.into();
        self
    }
}

/// Reference to a provisioned container.
///
/// Handles are scoped to a single run. The identifier is minted by the
/// provisioning activity and is unique per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHandle {
    /// Opaque container identifier assigned by the CaaS
    pub container_id: String,

    /// Workspace directory inside the container
    pub workspace_dir: String,
}

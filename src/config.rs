//! Configuration for the PR-creation controller.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PR_CREATOR_CONTAINER_IMAGE, PR_CREATOR_ENABLE_WORKFLOW)
//! 2. Config file (.pr-creator/config.yaml)
//! 3. Defaults
//!
//! Config file discovery searches the current directory and its parents
//! for .pr-creator/config.yaml.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::controller::FeatureFlags;
use crate::domain::ContainerConfig;

/// Default worker image used when neither file nor environment sets one
pub const DEFAULT_IMAGE: &str = "ghcr.io/pr-creator/worker:latest";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub container: ContainerSection,
    #[serde(default)]
    pub features: FeaturesSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerSection {
    pub image: Option<String>,
    pub command: Option<Vec<String>>,
    pub workspace_dir: Option<String>,
    pub idle_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub environment: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeaturesSection {
    pub enable_caas_workflow: Option<bool>,
}

/// Resolved configuration for the controller
#[derive(Debug, Clone)]
pub struct Config {
    /// Container provisioned for each run
    pub container: ContainerConfig,

    /// Feature flags
    pub flags: FeatureFlags,

    /// Path to the config file (if one was found)
    pub config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        resolve(ConfigFile::default(), None)
    }
}

impl Config {
    /// Load configuration, searching for a config file from the current
    /// directory upward and applying environment overrides
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(resolve(file, Some(path.to_path_buf())))
    }

    /// Parse configuration from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        Ok(resolve(file, None))
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".pr-creator").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

fn resolve(file: ConfigFile, config_file: Option<PathBuf>) -> Config {
    let image = env_var("PR_CREATOR_CONTAINER_IMAGE")
        .or(file.container.image)
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string());

    let mut container = ContainerConfig::new(image);
    if let Some(command) = file.container.command {
        container.command = command;
    }
    if let Some(workspace_dir) = file.container.workspace_dir {
        container.workspace_dir = workspace_dir;
    }
    if let Some(idle) = file.container.idle_timeout_seconds {
        container.idle_timeout_seconds = idle;
    }
    container.environment = file.container.environment;

    let enable_caas_workflow = env_var("PR_CREATOR_ENABLE_WORKFLOW")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .or(file.features.enable_caas_workflow)
        .unwrap_or(false);

    Config {
        container,
        flags: FeatureFlags {
            enable_caas_workflow,
        },
        config_file,
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

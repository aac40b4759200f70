//! Git and sediment options consumed by the workflow activities.

use serde::{Deserialize, Serialize};

/// Options describing how the target repository is cloned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCloneOptions {
    /// Source repository URL
    pub repository_url: String,

    /// Branch to clone (also the base branch for the new work)
    pub branch: String,

    /// Clone depth
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Paths for a sparse checkout; a full checkout when unset or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_paths: Option<Vec<String>>,
}

fn default_depth() -> u32 {
    1
}

impl GitCloneOptions {
    /// Create clone options for a repository and branch
    pub fn new(repository_url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repository_url: repository_url.into(),
            branch: branch.into(),
            depth: default_depth(),
            sparse_paths: None,
        }
    }

    /// Restrict the checkout to the given paths
    pub fn with_sparse_paths(mut self, paths: Vec<String>) -> Self {
        self.sparse_paths = Some(paths);
        self
    }
}

/// Reference to the sediment diff that should be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SedimentArtifact {
    /// Key under which the artifact is stored
    pub storage_key: String,

    /// Filename the artifact is downloaded to
    #[serde(default = "default_sediment_filename")]
    pub filename: String,
}

fn default_sediment_filename() -> String {
    "sediment.patch".to_string()
}

impl SedimentArtifact {
    /// Reference an artifact by storage key with the default filename
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            filename: default_sediment_filename(),
        }
    }
}

/// Data used when creating the commit on the new branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommitOptions {
    /// Commit message
    pub message: String,

    /// Author name
    pub author_name: String,

    /// Author email
    pub author_email: String,
}

impl GitCommitOptions {
    /// Format the author as git expects it: "Name <email>"
    pub fn author(&self) -> String {
        format!("{} <{}>", self.author_name, self.author_email)
    }
}

/// Configuration for pushing the prepared branch to the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushOptions {
    /// Remote name
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Force-push the branch
    #[serde(default)]
    pub force: bool,
}

fn default_remote() -> String {
    "origin".to_string()
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            force: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_options_defaults() {
        let options = GitCloneOptions::new("https://example.com/repo.git", "main");

        assert_eq!(options.depth, 1);
        assert!(options.sparse_paths.is_none());
    }

    #[test]
    fn test_sediment_default_filename() {
        let sediment = SedimentArtifact::new("builds/1234/diff");

        assert_eq!(sediment.filename, "sediment.patch");
    }

    #[test]
    fn test_author_formatting() {
        let commit = GitCommitOptions {
            message: "Apply sediment".to_string(),
            author_name: "Ada Lovelace".to_string(),
            author_email: "ada@example.com".to_string(),
        };

        assert_eq!(commit.author(), "Ada Lovelace <ada@example.com>");
    }

    #[test]
    fn test_push_options_default() {
        let push = PushOptions::default();

        assert_eq!(push.remote, "origin");
        assert!(!push.force);
    }

    #[test]
    fn test_push_options_deserialize_defaults() {
        let push: PushOptions = serde_yaml::from_str("{}").unwrap();

        assert_eq!(push.remote, "origin");
        assert!(!push.force);
    }
}

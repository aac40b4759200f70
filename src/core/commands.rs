//! Pure command construction for the workflow activities.
//!
//! These builders turn typed options into ordered argv-style token lists.
//! Nothing here executes anything; an external command executor consumes
//! the lists. Token order within each command is part of the contract.

use crate::domain::{CommandLine, GitCloneOptions, GitCommitOptions, PushOptions, SedimentArtifact};

/// Resolve the full checkout path inside the container workspace.
///
/// Joins `workspace_dir` and `checkout_path` and trims any trailing
/// separator so the result is usable as a git destination.
pub fn resolve_checkout_path(workspace_dir: &str, checkout_path: &str) -> String {
    format!("{}/{}", workspace_dir, checkout_path)
        .trim_end_matches('/')
        .to_string()
}

/// Commands for the clone step.
///
/// Always produces the clone command first; a `sparse-checkout set`
/// command follows only when `sparse_paths` is non-empty.
pub fn clone_commands(options: &GitCloneOptions, checkout_full_path: &str) -> Vec<CommandLine> {
    let clone = vec![
        "git".to_string(),
        "clone".to_string(),
        "--filter=blob:none".to_string(),
        "--sparse".to_string(),
        format!("--depth={}", options.depth),
        format!("--branch={}", options.branch),
        "--single-branch".to_string(),
        options.repository_url.clone(),
        checkout_full_path.to_string(),
    ];

    let mut commands = vec![clone];
    if let Some(paths) = options.sparse_paths.as_deref() {
        if !paths.is_empty() {
            let mut sparse = vec![
                "git".to_string(),
                "-C".to_string(),
                checkout_full_path.to_string(),
                "sparse-checkout".to_string(),
                "set".to_string(),
            ];
            sparse.extend(paths.iter().cloned());
            commands.push(sparse);
        }
    }
    commands
}

/// Commands for downloading and applying the sediment diff.
///
/// Exactly three commands: download must precede upload, upload must
/// precede apply.
pub fn sediment_commands(repository_path: &str, sediment: &SedimentArtifact) -> Vec<CommandLine> {
    let remote_path = format!("{}/{}", repository_path, sediment.filename);

    vec![
        vec![
            "artifact".to_string(),
            "download".to_string(),
            sediment.storage_key.clone(),
            sediment.filename.clone(),
        ],
        vec![
            "caas".to_string(),
            "upload".to_string(),
            sediment.filename.clone(),
            remote_path,
        ],
        vec![
            "git".to_string(),
            "-C".to_string(),
            repository_path.to_string(),
            "apply".to_string(),
            sediment.filename.clone(),
        ],
    ]
}

/// Commands for creating the branch, committing, and pushing it.
///
/// The push command carries a trailing `--force` token only when
/// `push.force` is set. The whole list goes through [`normalize_commands`]
/// so no placeholder empty token ever survives.
pub fn branch_and_push_commands(
    repository_path: &str,
    new_branch: &str,
    base_branch: &str,
    commit: &GitCommitOptions,
    push: &PushOptions,
) -> Vec<CommandLine> {
    let mut push_command = vec![
        "git".to_string(),
        "-C".to_string(),
        repository_path.to_string(),
        "push".to_string(),
        push.remote.clone(),
        new_branch.to_string(),
    ];
    if push.force {
        push_command.push("--force".to_string());
    }

    let commands = vec![
        vec![
            "git".to_string(),
            "-C".to_string(),
            repository_path.to_string(),
            "checkout".to_string(),
            base_branch.to_string(),
        ],
        vec![
            "git".to_string(),
            "-C".to_string(),
            repository_path.to_string(),
            "checkout".to_string(),
            "-B".to_string(),
            new_branch.to_string(),
        ],
        vec![
            "git".to_string(),
            "-C".to_string(),
            repository_path.to_string(),
            "commit".to_string(),
            "--all".to_string(),
            "--message".to_string(),
            commit.message.clone(),
            "--author".to_string(),
            commit.author(),
        ],
        push_command,
    ];

    normalize_commands(commands)
}

/// Strip empty tokens from every command.
///
/// Omitted optional flags must be absent, not present as an empty string.
pub fn normalize_commands(commands: Vec<CommandLine>) -> Vec<CommandLine> {
    commands
        .into_iter()
        .map(|command| command.into_iter().filter(|token| !token.is_empty()).collect())
        .collect()
}

/// Locate an empty token across a command list, if any survived.
///
/// Returns `(command_index, token_index)` of the first offender.
pub fn find_empty_token(commands: &[CommandLine]) -> Option<(usize, usize)> {
    for (i, command) in commands.iter().enumerate() {
        for (j, token) in command.iter().enumerate() {
            if token.is_empty() {
                return Some((i, j));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clone_options() -> GitCloneOptions {
        GitCloneOptions::new("https://example.com/repo.git", "main")
    }

    #[test]
    fn test_resolve_checkout_path() {
        assert_eq!(resolve_checkout_path("/workspace", "repo"), "/workspace/repo");
        assert_eq!(resolve_checkout_path("/workspace", ""), "/workspace");
    }

    #[test]
    fn test_clone_without_sparse_paths_is_one_command() {
        let commands = clone_commands(&clone_options(), "/workspace/repo");

        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0],
            vec![
                "git",
                "clone",
                "--filter=blob:none",
                "--sparse",
                "--depth=1",
                "--branch=main",
                "--single-branch",
                "https://example.com/repo.git",
                "/workspace/repo",
            ]
        );
    }

    #[test]
    fn test_clone_with_sparse_paths_adds_sparse_checkout() {
        let options = clone_options().with_sparse_paths(vec!["a".to_string(), "b".to_string()]);
        let commands = clone_commands(&options, "/workspace/repo");

        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[1],
            vec!["git", "-C", "/workspace/repo", "sparse-checkout", "set", "a", "b"]
        );
    }

    #[test]
    fn test_clone_with_empty_sparse_paths_is_one_command() {
        let options = clone_options().with_sparse_paths(Vec::new());
        let commands = clone_commands(&options, "/workspace/repo");

        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn test_sediment_commands_order() {
        let sediment = SedimentArtifact::new("builds/1234/diff");
        let commands = sediment_commands("/workspace/repo", &sediment);

        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0][..2], ["artifact", "download"]);
        assert_eq!(commands[1][..2], ["caas", "upload"]);
        assert_eq!(commands[1][3], "/workspace/repo/sediment.patch");
        assert_eq!(commands[2][3], "apply");
    }

    fn commit_options() -> GitCommitOptions {
        GitCommitOptions {
            message: "Apply sediment".to_string(),
            author_name: "Ada Lovelace".to_string(),
            author_email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_branch_and_push_without_force() {
        let commands = branch_and_push_commands(
            "/workspace/repo",
            "feature/x",
            "main",
            &commit_options(),
            &PushOptions::default(),
        );

        assert_eq!(commands.len(), 4);
        for command in &commands {
            assert!(!command.iter().any(|t| t == "--force"));
        }
    }

    #[test]
    fn test_branch_and_push_with_force() {
        let push = PushOptions {
            remote: "origin".to_string(),
            force: true,
        };
        let commands =
            branch_and_push_commands("/workspace/repo", "feature/x", "main", &commit_options(), &push);

        let push_command = commands.last().unwrap();
        assert_eq!(push_command.last().unwrap(), "--force");
    }

    #[test]
    fn test_commit_command_carries_author_token() {
        let commands = branch_and_push_commands(
            "/workspace/repo",
            "feature/x",
            "main",
            &commit_options(),
            &PushOptions::default(),
        );

        assert!(commands[2]
            .iter()
            .any(|t| t == "Ada Lovelace <ada@example.com>"));
    }

    #[test]
    fn test_normalize_strips_empty_tokens() {
        let commands = vec![vec!["git".to_string(), String::new(), "push".to_string()]];
        let normalized = normalize_commands(commands);

        assert_eq!(normalized, vec![vec!["git".to_string(), "push".to_string()]]);
    }

    #[test]
    fn test_find_empty_token() {
        let clean = vec![vec!["git".to_string(), "push".to_string()]];
        assert_eq!(find_empty_token(&clean), None);

        let dirty = vec![
            vec!["git".to_string()],
            vec!["caas".to_string(), String::new()],
        ];
        assert_eq!(find_empty_token(&dirty), Some((1, 1)));
    }
}

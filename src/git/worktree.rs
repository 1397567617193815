//! Workspace discovery through git worktrees

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Git command failed: {0}")]
    CommandFailed(String),
    #[error("Not a git repository: {0}")]
    NotAGitRepo(PathBuf),
    #[error("Background task failed: {0}")]
    Join(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An isolated working copy of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    /// Path to the worktree
    pub path: PathBuf,
    /// Branch name, or `detached@<sha>` when HEAD is detached
    pub branch: String,
    /// Whether the worktree has uncommitted changes
    pub dirty: bool,
    /// Whether this is the main worktree
    pub is_primary: bool,
}

impl WorkspaceInfo {
    /// Display name for the tree: the directory name
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Enumerates the workspaces of a repository
#[async_trait]
pub trait WorkspaceDiscovery: Send + Sync {
    async fn discover(&self, repo_root: &Path) -> Result<Vec<WorkspaceInfo>, WorkspaceError>;
}

/// Discovery backed by `git worktree list --porcelain`
#[derive(Debug, Default, Clone, Copy)]
pub struct GitWorkspaceDiscovery;

impl GitWorkspaceDiscovery {
    pub fn new() -> Self {
        Self
    }

    /// Check if a path is a git repository
    pub fn is_git_repo(path: &Path) -> bool {
        Command::new("git")
            .args(["rev-parse", "--git-dir"])
            .current_dir(path)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn discover_blocking(repo_root: &Path) -> Result<Vec<WorkspaceInfo>, WorkspaceError> {
        if !repo_root.exists() || !Self::is_git_repo(repo_root) {
            return Err(WorkspaceError::NotAGitRepo(repo_root.to_path_buf()));
        }

        let output = Command::new("git")
            .args(["worktree", "list", "--porcelain"])
            .current_dir(repo_root)
            .output()?;

        if !output.status.success() {
            return Err(WorkspaceError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut workspaces = parse_worktree_list(&stdout);
        for workspace in &mut workspaces {
            // Missing (pruned) worktrees are listed but cannot be inspected
            workspace.dirty = is_dirty(&workspace.path).unwrap_or_else(|e| {
                tracing::debug!(path = %workspace.path.display(), error = %e, "Dirty check failed");
                false
            });
        }

        tracing::debug!(
            repo = %repo_root.display(),
            count = workspaces.len(),
            "Discovered workspaces"
        );
        Ok(workspaces)
    }
}

#[async_trait]
impl WorkspaceDiscovery for GitWorkspaceDiscovery {
    async fn discover(&self, repo_root: &Path) -> Result<Vec<WorkspaceInfo>, WorkspaceError> {
        let repo_root = repo_root.to_path_buf();
        tokio::task::spawn_blocking(move || Self::discover_blocking(&repo_root))
            .await
            .map_err(|e| WorkspaceError::Join(e.to_string()))?
    }
}

/// Check if a worktree has uncommitted changes
fn is_dirty(worktree_path: &Path) -> Result<bool, WorkspaceError> {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(worktree_path)
        .output()?;

    if !output.status.success() {
        return Err(WorkspaceError::CommandFailed(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Parse porcelain worktree output; the first entry is the primary worktree
fn parse_worktree_list(output: &str) -> Vec<WorkspaceInfo> {
    let mut workspaces = Vec::new();
    let mut current_path: Option<PathBuf> = None;
    let mut current_head = String::new();
    let mut current_branch: Option<String> = None;

    let mut flush = |path: PathBuf, head: &str, branch: Option<String>| {
        let is_primary = workspaces.is_empty();
        let branch = branch.unwrap_or_else(|| {
            let short: String = head.chars().take(7).collect();
            format!("detached@{}", short)
        });
        workspaces.push(WorkspaceInfo {
            path,
            branch,
            dirty: false,
            is_primary,
        });
    };

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(prev) = current_path.take() {
                flush(prev, &current_head, current_branch.take());
                current_head.clear();
            }
            current_path = Some(PathBuf::from(path));
        } else if let Some(head) = line.strip_prefix("HEAD ") {
            current_head = head.to_string();
        } else if let Some(branch) = line.strip_prefix("branch ") {
            current_branch = Some(
                branch
                    .strip_prefix("refs/heads/")
                    .unwrap_or(branch)
                    .to_string(),
            );
        }
    }

    if let Some(path) = current_path {
        flush(path, &current_head, current_branch);
    }

    workspaces
}

//! Git operations module

mod worktree;

pub use worktree::{GitWorkspaceDiscovery, WorkspaceDiscovery, WorkspaceError, WorkspaceInfo};

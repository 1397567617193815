use std::path::PathBuf;

use crate::agent::{CaptureStart, LaunchRequest, LaunchResult, ModelCatalog, SessionState};
use crate::data::WorkItem;
use crate::git::WorkspaceInfo;

/// Application-level messages.
///
/// Input events and background-task completions both arrive here; the reducer handles
/// exactly one at a time.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Terminal input event
    Input(crossterm::event::Event),

    /// Work-item listing finished
    WorkItemsLoaded { result: Result<Vec<WorkItem>, String> },

    /// Model registry fetch finished (after retries)
    ModelsLoaded { result: Result<ModelCatalog, String> },

    /// Workspace discovery for one repository finished
    WorkspacesDiscovered {
        repo_root: PathBuf,
        result: Result<Vec<WorkspaceInfo>, String>,
    },

    /// Render + launch attempt finished
    LaunchCompleted {
        request: LaunchRequest,
        result: LaunchResult,
        capture: CaptureStart,
    },

    /// Status poll for a session finished
    AgentStatusPolled {
        agent_id: String,
        state: SessionState,
    },

    /// Output read for a session finished
    AgentOutputRead {
        agent_id: String,
        result: Result<String, String>,
    },

    /// Output capture for a cleared session was torn down
    CaptureStopped {
        agent_id: String,
        error: Option<String>,
    },

    /// Upstream freshness signal was read
    UpstreamChecked { result: Result<String, String> },

    /// The "just refreshed" flag timer for `generation` elapsed
    RefreshFlagExpired { generation: u64 },

    /// Animation driver tick
    AnimationTick,

    /// Request to quit the application
    Quit,
}

/// Broad screen being shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Selection columns plus sidebar
    #[default]
    Matrix,
    /// Review before launch
    Confirm,
    /// Fatal failure; only quitting is possible
    Error,
}

/// Pane with keyboard focus inside the matrix view, in workflow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FocusColumn {
    Sidebar,
    #[default]
    Tickets,
    Harness,
    Model,
    Agent,
}

impl FocusColumn {
    /// Selection columns in workflow order (everything but the sidebar)
    pub const SELECTION: [FocusColumn; 4] = [
        FocusColumn::Tickets,
        FocusColumn::Harness,
        FocusColumn::Model,
        FocusColumn::Agent,
    ];

    pub fn title(self) -> &'static str {
        match self {
            FocusColumn::Sidebar => "Projects",
            FocusColumn::Tickets => "Tickets",
            FocusColumn::Harness => "Harness",
            FocusColumn::Model => "Model",
            FocusColumn::Agent => "Agent",
        }
    }
}

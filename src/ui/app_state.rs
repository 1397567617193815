use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::agent::{AgentRegistry, ModelCatalog, Selection};
use crate::data::{Harness, WorkItem};
use crate::ui::animation::AnimationState;
use crate::ui::components::{ProjectTree, SelectList};
use crate::ui::events::{FocusColumn, ViewState};
use crate::ui::navigation::DisabledColumns;

/// Selection being built across the workflow columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDraft {
    pub work_item: Option<WorkItem>,
    pub harness: Option<Harness>,
    pub model: String,
    pub agent: String,
}

impl SelectionDraft {
    /// Freeze the draft; `None` until a work item and harness are chosen
    pub fn finalize(&self) -> Option<Selection> {
        Some(Selection {
            work_item: self.work_item.clone()?,
            harness: self.harness.clone()?,
            model: self.model.clone(),
            agent: self.agent.clone(),
        })
    }
}

/// All state owned by the reconciliation step
#[derive(Debug, Default)]
pub struct AppState {
    pub view: ViewState,
    pub focus: FocusColumn,
    /// Column focused before the sidebar took focus
    pub last_column: FocusColumn,

    pub tickets: SelectList<WorkItem>,
    pub harnesses: SelectList<Harness>,
    pub models: SelectList<String>,
    pub agents: SelectList<String>,
    pub disabled: DisabledColumns,
    pub draft: SelectionDraft,
    /// Snapshot shown on the confirm screen and handed to the launch task
    pub pending: Option<Selection>,

    /// False until the first work-item load completes
    pub tickets_loaded: bool,
    pub catalog: ModelCatalog,

    pub tree: ProjectTree,
    pub registry: AgentRegistry,
    pub active_workspace: Option<PathBuf>,
    /// Session whose output replaces the selection columns
    pub viewing: Option<String>,
    /// Sessions with an output read in flight
    pub streams: HashSet<String>,
    /// Window names handed to a launch that has not reported back
    pub launching: HashSet<String>,

    pub warnings: Vec<String>,
    pub fatal: Option<String>,

    pub last_refreshed: Option<DateTime<Local>>,
    pub just_refreshed: bool,
    pub refresh_generation: u64,
    pub upstream_fingerprint: Option<String>,

    pub animation: AnimationState,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(harnesses: Vec<Harness>) -> Self {
        Self {
            harnesses: SelectList::new(harnesses),
            ..Self::default()
        }
    }

    pub fn is_sidebar_focused(&self) -> bool {
        self.focus == FocusColumn::Sidebar
    }

    /// Record a non-fatal problem; warnings only go away when dismissed
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(warning = %message, "Non-fatal error");
        self.warnings.push(message);
    }

    /// Enter the terminal error view
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(error = %message, "Fatal error");
        self.fatal = Some(message);
        self.view = ViewState::Error;
        self.viewing = None;
    }
}

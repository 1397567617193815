//! Agent lifecycle registry
//!
//! Keyed collection of launched sessions in launch order. Entries are created on a
//! successful launch, move from `Running` to a terminal status through status polls,
//! and disappear only through an explicit clear.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::agent::launch::LaunchRequest;
use crate::agent::tmux::{CaptureHandle, SessionState};

/// Lifecycle status of a registered session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentStatus {
    Running,
    Completed,
    Failed,
}

impl AgentStatus {
    pub fn is_running(self) -> bool {
        matches!(self, AgentStatus::Running)
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentStatus::Running => "running",
            AgentStatus::Completed => "done",
            AgentStatus::Failed => "failed",
        }
    }
}

/// A launched session tracked by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningAgent {
    /// Window name; unique among registered entries
    pub id: String,
    pub display_name: String,
    pub work_item_id: String,
    pub workspace: PathBuf,
    pub harness: String,
    pub status: AgentStatus,
    pub started_at: DateTime<Local>,
    /// Multiplexer window identifier used for polling
    pub window_id: String,
    pub capture: Option<CaptureHandle>,
    /// Last captured output (may contain ANSI escapes)
    pub output: String,
}

impl RunningAgent {
    pub fn from_launch(
        request: &LaunchRequest,
        window_id: impl Into<String>,
        capture: Option<CaptureHandle>,
    ) -> Self {
        let selection = &request.selection;
        let mut display_name = format!("{} · {}", selection.work_item.id, selection.harness.name);
        if !selection.model.is_empty() {
            display_name.push_str(&format!(" · {}", selection.model));
        }

        Self {
            id: request.window_name.clone(),
            display_name,
            work_item_id: selection.work_item.id.clone(),
            workspace: request.workspace.clone(),
            harness: selection.harness.name.clone(),
            status: AgentStatus::Running,
            started_at: Local::now(),
            window_id: window_id.into(),
            capture,
            output: String::new(),
        }
    }
}

/// Registered sessions, in launch order
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<RunningAgent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly launched session, replacing any entry with the same id
    pub fn register(&mut self, agent: RunningAgent) {
        tracing::info!(agent_id = %agent.id, window_id = %agent.window_id, "Registered agent");
        match self.agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent,
            None => self.agents.push(agent),
        }
    }

    pub fn get(&self, id: &str) -> Option<&RunningAgent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` is registered and still running
    pub fn is_running(&self, id: &str) -> bool {
        self.get(id).is_some_and(|a| a.status.is_running())
    }

    /// Apply a polled session state.
    ///
    /// Returns the resulting status, or `None` if the entry is gone; a cleared entry is
    /// never re-created. Terminal statuses are final.
    pub fn apply_status(&mut self, id: &str, state: SessionState) -> Option<AgentStatus> {
        let agent = self.agents.iter_mut().find(|a| a.id == id)?;
        if agent.status.is_running() {
            let next = match state {
                SessionState::Running | SessionState::Unknown => AgentStatus::Running,
                SessionState::Dead {
                    exit_code: None | Some(0),
                } => AgentStatus::Completed,
                SessionState::Dead { .. } => AgentStatus::Failed,
            };
            if next != agent.status {
                tracing::info!(agent_id = %id, status = next.label(), "Agent finished");
            }
            agent.status = next;
        }
        Some(agent.status)
    }

    /// Store the latest captured output; ignored for unknown ids
    pub fn ingest_output(&mut self, id: &str, output: String) -> bool {
        match self.agents.iter_mut().find(|a| a.id == id) {
            Some(agent) => {
                agent.output = output;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<RunningAgent> {
        let index = self.agents.iter().position(|a| a.id == id)?;
        Some(self.agents.remove(index))
    }

    /// Remove every entry that is not running, returning them in launch order
    pub fn drain_stopped(&mut self) -> Vec<RunningAgent> {
        let (stopped, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.agents)
            .into_iter()
            .partition(|a| !a.status.is_running());
        self.agents = running;
        stopped
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunningAgent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.agents.iter().filter(|a| a.status.is_running()).count()
    }
}

//! Actions that can be triggered by keybindings
//!
//! Each action is a single, atomic request against the orchestrator. Key events are
//! translated to actions through [`crate::config::KeybindingConfig`] before they reach
//! the reconciliation step.

use serde::{Deserialize, Serialize};

/// All mappable UI actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // ========== Global ==========
    /// Quit the application
    Quit,
    /// Reload the work-item list now
    Refresh,
    /// Clear the warning list
    DismissWarnings,

    // ========== Navigation ==========
    /// Move the highlight down in the focused list or tree
    SelectNext,
    /// Move the highlight up in the focused list or tree
    SelectPrev,
    /// Confirm the highlighted item (or launch from the confirm screen)
    Confirm,
    /// Step back one column, or leave the confirm/output screen
    Cancel,
    /// Cycle focus through the enabled columns and the sidebar
    FocusNext,

    // ========== Sidebar ==========
    /// Expand the highlighted tree node
    Expand,
    /// Collapse the highlighted tree node
    Collapse,

    // ========== Agents ==========
    /// Clear the highlighted (or viewed) session
    ClearAgent,
    /// Clear every session that is no longer running
    ClearStoppedAgents,
}

impl Action {
    /// Parse an action name as written in the `[keys]` config table
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "quit" | "q" => Some(Action::Quit),
            "refresh" => Some(Action::Refresh),
            "dismiss_warnings" => Some(Action::DismissWarnings),
            "select_next" => Some(Action::SelectNext),
            "select_prev" => Some(Action::SelectPrev),
            "confirm" => Some(Action::Confirm),
            "cancel" => Some(Action::Cancel),
            "focus_next" => Some(Action::FocusNext),
            "expand" => Some(Action::Expand),
            "collapse" => Some(Action::Collapse),
            "clear_agent" => Some(Action::ClearAgent),
            "clear_stopped_agents" => Some(Action::ClearStoppedAgents),
            _ => None,
        }
    }

    /// Short label used in the key hint footer
    pub fn hint(&self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::Refresh => "refresh",
            Action::DismissWarnings => "dismiss",
            Action::SelectNext => "down",
            Action::SelectPrev => "up",
            Action::Confirm => "select",
            Action::Cancel => "back",
            Action::FocusNext => "focus",
            Action::Expand => "expand",
            Action::Collapse => "collapse",
            Action::ClearAgent => "clear",
            Action::ClearStoppedAgents => "clear stopped",
        }
    }
}

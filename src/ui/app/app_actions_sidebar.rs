use crate::ui::action::Action;
use crate::ui::app::App;
use crate::ui::components::NodeKind;
use crate::ui::effect::Effect;
use crate::ui::events::{FocusColumn, ViewState};
use crate::ui::navigation::{first_enabled, tab_next};

impl App {
    pub(super) fn handle_sidebar_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::SelectNext => self.state.tree.move_down(),
            Action::SelectPrev => self.state.tree.move_up(),
            Action::Expand => {
                self.state.tree.expand_selected();
            }
            Action::Collapse => {
                self.state.tree.collapse_selected();
            }
            Action::Confirm => self.select_tree_node(effects),
            Action::ClearAgent => {
                let selected = self
                    .state
                    .tree
                    .selected()
                    .filter(|node| node.kind == NodeKind::Agent)
                    .map(|node| node.id.clone());
                if let Some(agent_id) = selected {
                    self.clear_agent(&agent_id, effects);
                }
            }
            Action::Cancel => {
                if self.state.viewing.take().is_none() {
                    self.leave_sidebar();
                }
            }
            _ => {}
        }
    }

    /// Tab cycle through the enabled columns and the sidebar
    pub(super) fn focus_next(&mut self) {
        if self.state.view != ViewState::Matrix {
            return;
        }
        let next = tab_next(self.state.focus, self.state.disabled);
        if next == FocusColumn::Sidebar && !self.state.is_sidebar_focused() {
            self.state.last_column = self.state.focus;
        }
        self.state.focus = next;
    }

    fn leave_sidebar(&mut self) {
        let last = self.state.last_column;
        self.state.focus = if last == FocusColumn::Sidebar || self.state.disabled.is_disabled(last)
        {
            first_enabled(self.state.disabled).unwrap_or(FocusColumn::Tickets)
        } else {
            last
        };
    }

    fn select_tree_node(&mut self, effects: &mut Vec<Effect>) {
        let Some(node) = self.state.tree.selected().cloned() else {
            return;
        };
        match node.kind {
            NodeKind::Project => {
                let cursor = self.state.tree.cursor();
                self.state.tree.toggle_at(cursor);
            }
            NodeKind::Workspace => {
                tracing::info!(workspace = %node.path.display(), "Active workspace changed");
                self.state.active_workspace = Some(node.path);
                self.state.viewing = None;
                self.state.focus =
                    first_enabled(self.state.disabled).unwrap_or(FocusColumn::Tickets);
            }
            NodeKind::Agent => self.view_agent(&node.id, effects),
        }
    }
}

use crate::agent::{unique_window_name, LaunchRequest};
use crate::ui::action::Action;
use crate::ui::app::App;
use crate::ui::components::SelectList;
use crate::ui::effect::Effect;
use crate::ui::events::{FocusColumn, ViewState};
use crate::ui::navigation::{advance, next_enabled, retreat, DisabledColumns};

impl App {
    pub(super) fn handle_workflow_action(&mut self, action: Action, _effects: &mut Vec<Effect>) {
        match action {
            Action::SelectNext => self.move_highlight(true),
            Action::SelectPrev => self.move_highlight(false),
            Action::Confirm => self.confirm_column(),
            Action::Cancel => {
                self.state.focus = retreat(self.state.focus, self.state.disabled);
            }
            _ => {}
        }
    }

    pub(super) fn handle_confirm_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::Confirm => self.launch_pending(effects),
            Action::Cancel => {
                self.state.view = ViewState::Matrix;
                self.state.pending = None;
            }
            _ => {}
        }
    }

    fn move_highlight(&mut self, down: bool) {
        fn step<T>(list: &mut SelectList<T>, down: bool) -> bool {
            let before = list.selected_index();
            if down {
                list.select_next();
            } else {
                list.select_prev();
            }
            list.selected_index() != before
        }

        let state = &mut self.state;
        let moved = match state.focus {
            FocusColumn::Tickets => step(&mut state.tickets, down),
            FocusColumn::Harness => step(&mut state.harnesses, down),
            FocusColumn::Model => step(&mut state.models, down),
            FocusColumn::Agent => step(&mut state.agents, down),
            FocusColumn::Sidebar => false,
        };

        // A confirmed value no longer matches the highlight; it must be confirmed again
        if moved {
            match state.focus {
                FocusColumn::Tickets => state.draft.work_item = None,
                FocusColumn::Harness => state.draft.harness = None,
                FocusColumn::Model => state.draft.model.clear(),
                FocusColumn::Agent => state.draft.agent.clear(),
                FocusColumn::Sidebar => {}
            }
        }
    }

    fn confirm_column(&mut self) {
        match self.state.focus {
            FocusColumn::Tickets => self.confirm_ticket(),
            FocusColumn::Harness => self.confirm_harness(),
            FocusColumn::Model => {
                let Some(model) = self.state.models.selected().cloned() else {
                    return;
                };
                self.state.draft.model = model;
                match next_enabled(FocusColumn::Model, self.state.disabled) {
                    Some(column) => self.state.focus = column,
                    None => self.enter_confirm(),
                }
            }
            FocusColumn::Agent => {
                let Some(agent) = self.state.agents.selected().cloned() else {
                    return;
                };
                self.state.draft.agent = agent;
                self.enter_confirm();
            }
            FocusColumn::Sidebar => {}
        }
    }

    fn confirm_ticket(&mut self) {
        let Some(item) = self.state.tickets.selected().cloned() else {
            return;
        };
        tracing::debug!(work_item = %item.id, "Work item selected");
        self.state.draft.work_item = Some(item);
        self.state.animation.flash();

        if self.state.harnesses.len() == 1 {
            self.state.harnesses.select_first();
            self.confirm_harness();
        } else {
            self.state.focus = advance(FocusColumn::Tickets, self.state.disabled);
        }
    }

    /// Choose the highlighted harness and derive the model and mode columns from it
    fn confirm_harness(&mut self) {
        let Some(harness) = self.state.harnesses.selected().cloned() else {
            return;
        };
        let models = self.state.catalog.expand(&harness.models);
        let agents = harness.execution_modes();
        tracing::debug!(
            harness = %harness.name,
            models = models.len(),
            agents = agents.len(),
            "Harness selected"
        );

        let state = &mut self.state;
        state.draft.model = apply_derived(
            &mut state.models,
            &mut state.disabled,
            FocusColumn::Model,
            models,
        );
        state.draft.agent = apply_derived(
            &mut state.agents,
            &mut state.disabled,
            FocusColumn::Agent,
            agents,
        );
        state.draft.harness = Some(harness);
        state.animation.flash();

        match next_enabled(FocusColumn::Harness, self.state.disabled) {
            Some(column) => self.state.focus = column,
            None => self.enter_confirm(),
        }
    }

    /// Rebuild the model column for the chosen harness after the catalogue changed
    pub(super) fn rederive_models(&mut self) {
        let Some(harness) = self.state.draft.harness.as_ref() else {
            return;
        };
        let models = self.state.catalog.expand(&harness.models);
        let state = &mut self.state;
        state.draft.model = apply_derived(
            &mut state.models,
            &mut state.disabled,
            FocusColumn::Model,
            models,
        );
        if state.focus == FocusColumn::Model && state.disabled.is_disabled(FocusColumn::Model) {
            state.focus = retreat(FocusColumn::Model, state.disabled);
        }
    }

    /// First column whose value the user still has to confirm
    fn first_unconfirmed(&self) -> Option<FocusColumn> {
        let state = &self.state;
        let draft = &state.draft;
        if draft.work_item.is_none() {
            Some(FocusColumn::Tickets)
        } else if draft.harness.is_none() {
            Some(FocusColumn::Harness)
        } else if !state.disabled.is_disabled(FocusColumn::Model) && draft.model.is_empty() {
            Some(FocusColumn::Model)
        } else if !state.disabled.is_disabled(FocusColumn::Agent) && draft.agent.is_empty() {
            Some(FocusColumn::Agent)
        } else {
            None
        }
    }

    fn enter_confirm(&mut self) {
        if let Some(column) = self.first_unconfirmed() {
            tracing::debug!(column = column.title(), "Selection incomplete, staying in matrix");
            self.state.focus = column;
            return;
        }
        match self.state.draft.finalize() {
            Some(selection) => {
                self.state.pending = Some(selection);
                self.state.view = ViewState::Confirm;
                self.state.animation.flash();
            }
            None => tracing::debug!("Selection incomplete, staying in matrix"),
        }
    }

    fn launch_pending(&mut self, effects: &mut Vec<Effect>) {
        self.state.view = ViewState::Matrix;
        let Some(selection) = self.state.pending.take() else {
            return;
        };

        let workspace = self.launch_workspace();
        let registry = &self.state.registry;
        let launching = &self.state.launching;
        let window_name = unique_window_name(
            &selection.work_item.id,
            &selection.harness.name,
            |name| registry.contains(name) || launching.contains(name),
        );
        self.state.launching.insert(window_name.clone());
        tracing::info!(
            window = %window_name,
            workspace = %workspace.display(),
            "Launching session"
        );

        self.state.focus = FocusColumn::Tickets;
        effects.push(Effect::Launch {
            request: LaunchRequest {
                selection,
                workspace,
                window_name,
            },
        });
    }
}

/// Load a derived column; returns the value forced into the selection.
///
/// Empty and single-entry lists leave nothing to choose, so the column is disabled and
/// the field is forced to the only value (or empty).
fn apply_derived(
    list: &mut SelectList<String>,
    disabled: &mut DisabledColumns,
    column: FocusColumn,
    items: Vec<String>,
) -> String {
    let forced = match items.as_slice() {
        [only] => only.clone(),
        _ => String::new(),
    };
    disabled.set(column, items.len() <= 1);
    list.set_items(items);
    list.select_first();
    forced
}

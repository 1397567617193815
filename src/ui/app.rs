//! The orchestrator: one reconciliation step plus the terminal loop that feeds it
//!
//! Every input event and every background-task completion goes through
//! [`App::update`], which mutates [`AppState`] and returns the effects to run next.
//! Effects run on their own tokio tasks and report back over a single channel.

mod app_actions_agents;
mod app_actions_sidebar;
mod app_actions_workflow;
mod app_events;

use std::io;
use std::sync::Arc;

use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{enable_raw_mode, EnterAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::config::{Config, KeyCombo, KeyContext};
use crate::ui::action::Action;
use crate::ui::app_state::AppState;
use crate::ui::components::{
    ConfirmView, ErrorView, GlobalFooter, SelectColumn, SessionOutput, Sidebar, StatusHeader,
};
use crate::ui::effect::Effect;
use crate::ui::events::{AppEvent, FocusColumn, ViewState};
use crate::ui::tasks::{self, Services};
use crate::ui::terminal_guard::TerminalGuard;

/// Main application
pub struct App {
    state: AppState,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            state: AppState::new(config.harnesses.clone()),
            config,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit
    }

    /// Effects dispatched once at startup
    pub fn init(&mut self) -> Vec<Effect> {
        let polling = self.config.polling;
        let mut effects = vec![
            self.load_work_items(),
            Effect::LoadModels {
                retry: self.config.models.retry,
            },
        ];
        effects.extend(
            self.config
                .repos
                .iter()
                .map(|repo_root| Effect::DiscoverWorkspaces {
                    repo_root: repo_root.clone(),
                }),
        );
        effects.push(Effect::CheckUpstream {
            delay: polling.upstream_interval,
        });
        effects.push(Effect::AnimationTick {
            delay: polling.animation_interval,
        });
        effects
    }

    /// Reconcile one message; returns the background work it asks for
    pub fn update(&mut self, event: AppEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            AppEvent::Input(input) => self.handle_input(input, &mut effects),
            AppEvent::Quit => self.state.should_quit = true,
            event => self.handle_task_event(event, &mut effects),
        }
        effects
    }

    /// Run a single action as if its key had been pressed
    pub fn perform(&mut self, action: Action) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.handle_action(action, &mut effects);
        effects
    }

    /// Keybinding context for the current view and focus
    pub fn key_context(&self) -> KeyContext {
        KeyContext::resolve(
            self.state.view,
            self.state.focus,
            self.state.viewing.is_some(),
        )
    }

    fn handle_input(&mut self, event: Event, effects: &mut Vec<Effect>) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        let combo = KeyCombo::from_key_event(&key);
        match self.config.keybindings.get_action(&combo, self.key_context()) {
            Some(action) => self.handle_action(action, effects),
            None => tracing::trace!(key = %combo, "Unbound key"),
        }
    }

    fn handle_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        if self.state.view == ViewState::Error {
            if action == Action::Quit {
                self.state.should_quit = true;
            }
            return;
        }

        match action {
            Action::Quit => self.state.should_quit = true,
            Action::Refresh => effects.push(self.load_work_items()),
            Action::DismissWarnings => self.state.warnings.clear(),
            Action::FocusNext => self.focus_next(),
            Action::ClearStoppedAgents => self.clear_stopped_agents(effects),
            _ => match self.key_context() {
                KeyContext::Sidebar => self.handle_sidebar_action(action, effects),
                KeyContext::Output => self.handle_output_action(action, effects),
                KeyContext::Confirm => self.handle_confirm_action(action, effects),
                KeyContext::Matrix => self.handle_workflow_action(action, effects),
                KeyContext::Global | KeyContext::Error => {}
            },
        }
    }

    fn load_work_items(&self) -> Effect {
        Effect::LoadWorkItems {
            filter: self.config.tickets.filter.clone(),
        }
    }

    /// Workspace a launch confirmed now would run in
    pub fn launch_workspace(&self) -> std::path::PathBuf {
        self.state
            .active_workspace
            .clone()
            .unwrap_or_else(|| self.config.fallback_workspace())
    }

    // ========== Rendering ==========

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            StatusHeader {
                last_refreshed: self.state.last_refreshed,
                just_refreshed: self.state.just_refreshed,
                running: self.state.registry.running_count(),
                total: self.state.registry.len(),
                warnings: &self.state.warnings,
            },
            rows[0],
        );

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
            .split(rows[1]);

        frame.render_widget(
            Sidebar::new(&self.state.tree)
                .focused(self.state.is_sidebar_focused())
                .active_workspace(self.state.active_workspace.as_deref())
                .pulse(self.state.animation.pulse_glyph()),
            body[0],
        );
        self.draw_main(frame, body[1]);

        frame.render_widget(
            GlobalFooter::for_context(
                &self.config.keybindings,
                self.key_context(),
                !self.state.warnings.is_empty(),
            ),
            rows[2],
        );
    }

    fn draw_main(&self, frame: &mut Frame, area: Rect) {
        match self.state.view {
            ViewState::Error => {
                let message = self.state.fatal.as_deref().unwrap_or("Unknown error");
                frame.render_widget(ErrorView::new(message), area);
            }
            ViewState::Confirm => {
                if let Some(selection) = &self.state.pending {
                    let workspace = self.launch_workspace();
                    frame.render_widget(
                        ConfirmView::new(selection, &workspace)
                            .flash(self.state.animation.flash_level()),
                        area,
                    );
                }
            }
            ViewState::Matrix => {
                let viewed = self
                    .state
                    .viewing
                    .as_deref()
                    .and_then(|id| self.state.registry.get(id));
                match viewed {
                    Some(agent) => frame.render_widget(SessionOutput::new(agent), area),
                    None => self.draw_columns(frame, area),
                }
            }
        }
    }

    fn draw_columns(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ])
            .split(area);

        let state = &self.state;
        let focused = |column: FocusColumn| state.focus == column;
        let flash = |column: FocusColumn| {
            if focused(column) {
                state.animation.flash_level()
            } else {
                0.0
            }
        };
        let tickets_empty = if state.tickets_loaded {
            "No work items match the current filter"
        } else {
            "Loading work items…"
        };

        frame.render_widget(
            SelectColumn::new(&state.tickets, FocusColumn::Tickets.title())
                .focused(focused(FocusColumn::Tickets))
                .empty_message(tickets_empty)
                .flash(flash(FocusColumn::Tickets)),
            columns[0],
        );
        frame.render_widget(
            SelectColumn::new(&state.harnesses, FocusColumn::Harness.title())
                .focused(focused(FocusColumn::Harness))
                .empty_message("No harness configured")
                .flash(flash(FocusColumn::Harness)),
            columns[1],
        );
        frame.render_widget(
            SelectColumn::new(&state.models, FocusColumn::Model.title())
                .focused(focused(FocusColumn::Model))
                .disabled(
                    state.disabled.is_disabled(FocusColumn::Model),
                    Some(&state.draft.model),
                )
                .empty_message("Pick a harness")
                .flash(flash(FocusColumn::Model)),
            columns[2],
        );
        frame.render_widget(
            SelectColumn::new(&state.agents, FocusColumn::Agent.title())
                .focused(focused(FocusColumn::Agent))
                .disabled(
                    state.disabled.is_disabled(FocusColumn::Agent),
                    Some(&state.draft.agent),
                )
                .empty_message("Pick a harness")
                .flash(flash(FocusColumn::Agent)),
            columns[3],
        );
    }

    // ========== Terminal loop ==========

    /// Own the terminal until the user quits
    pub async fn run(mut self, services: Services) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut guard = TerminalGuard::new();

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let services = Arc::new(services);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let effects = self.init();
        spawn_effects(effects, &services, &event_tx);

        let mut input = EventStream::new();
        let result = loop {
            if let Err(e) = terminal.draw(|f| self.draw(f)) {
                break Err(e.into());
            }

            let event = tokio::select! {
                maybe = input.next() => match maybe {
                    Some(Ok(event)) => AppEvent::Input(event),
                    Some(Err(e)) => break Err(e.into()),
                    None => AppEvent::Quit,
                },
                Some(event) = event_rx.recv() => event,
            };

            let effects = self.update(event);
            spawn_effects(effects, &services, &event_tx);

            if self.should_quit() {
                break Ok(());
            }
        };

        self.shutdown(&services).await;
        guard.cleanup()?;
        terminal.show_cursor()?;
        result
    }

    /// Close output captures; the sessions themselves keep running in tmux
    async fn shutdown(&self, services: &Services) {
        for agent in self.state.registry.iter() {
            if let Some(handle) = &agent.capture {
                if let Err(e) = services.capture.stop(handle).await {
                    tracing::warn!(agent_id = %agent.id, error = %e, "Failed to stop output capture");
                }
            }
        }
        tracing::info!(agents = self.state.registry.len(), "Shut down");
    }
}

fn spawn_effects(
    effects: Vec<Effect>,
    services: &Arc<Services>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    for effect in effects {
        let services = Arc::clone(services);
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            let event = tasks::execute(effect, &services).await;
            // Receiver is gone once the loop has exited
            let _ = event_tx.send(event);
        });
    }
}

use std::time::Duration;

use crate::ui::action::Action;
use crate::ui::app::App;
use crate::ui::effect::Effect;

impl App {
    pub(super) fn handle_output_action(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::Cancel => self.state.viewing = None,
            Action::ClearAgent => {
                if let Some(agent_id) = self.state.viewing.clone() {
                    self.clear_agent(&agent_id, effects);
                }
            }
            _ => {}
        }
    }

    /// Show a session's output in place of the selection columns
    pub(super) fn view_agent(&mut self, agent_id: &str, effects: &mut Vec<Effect>) {
        let Some(agent) = self.state.registry.get(agent_id) else {
            return;
        };
        let handle = agent.capture.clone();
        self.state.viewing = Some(agent_id.to_string());

        // One read chain per session; a chain already in flight picks the view back up
        if let Some(handle) = handle {
            if self.state.streams.insert(agent_id.to_string()) {
                effects.push(Effect::StreamOutput {
                    agent_id: agent_id.to_string(),
                    handle,
                    delay: Duration::ZERO,
                });
            }
        }
    }

    /// Remove one session from the registry and the tree
    pub(super) fn clear_agent(&mut self, agent_id: &str, effects: &mut Vec<Effect>) {
        let Some(agent) = self.state.registry.remove(agent_id) else {
            return;
        };
        self.state.tree.remove_agents(&[agent.id.clone()]);
        if self.state.viewing.as_deref() == Some(agent_id) {
            self.state.viewing = None;
        }
        tracing::info!(agent_id = %agent.id, status = agent.status.label(), "Cleared agent");

        if let Some(handle) = agent.capture {
            effects.push(Effect::StopCapture {
                agent_id: agent.id,
                handle,
            });
        }
    }

    /// Remove every session that is no longer running, with one tree rebuild
    pub(super) fn clear_stopped_agents(&mut self, effects: &mut Vec<Effect>) {
        let stopped = self.state.registry.drain_stopped();
        if stopped.is_empty() {
            return;
        }

        let ids: Vec<String> = stopped.iter().map(|agent| agent.id.clone()).collect();
        self.state.tree.remove_agents(&ids);
        if self
            .state
            .viewing
            .as_ref()
            .is_some_and(|viewing| ids.contains(viewing))
        {
            self.state.viewing = None;
        }
        tracing::info!(count = ids.len(), "Cleared stopped agents");

        effects.extend(stopped.into_iter().filter_map(|agent| {
            agent.capture.map(|handle| Effect::StopCapture {
                agent_id: agent.id,
                handle,
            })
        }));
    }
}

use chrono::Local;

use crate::agent::{CaptureStart, LaunchFailure, LaunchRequest, LaunchResult, RunningAgent};
use crate::ui::app::App;
use crate::ui::effect::Effect;
use crate::ui::events::{AppEvent, ViewState};

impl App {
    /// Reconcile a background-task completion
    pub(super) fn handle_task_event(&mut self, event: AppEvent, effects: &mut Vec<Effect>) {
        let polling = self.config.polling;

        match event {
            AppEvent::WorkItemsLoaded { result } => match result {
                Ok(items) => {
                    tracing::info!(count = items.len(), "Loaded work items");
                    self.state.tickets.set_items(items);
                    self.state.tickets_loaded = true;
                    self.state.last_refreshed = Some(Local::now());
                }
                Err(e) => self.state.fail(format!("Failed to load work items: {}", e)),
            },

            AppEvent::ModelsLoaded { result } => match result {
                Ok(catalog) => {
                    tracing::info!(count = catalog.len(), "Loaded model catalogue");
                    self.state.catalog = catalog;
                    if self.state.view == ViewState::Matrix {
                        self.rederive_models();
                    }
                }
                Err(e) => self.state.warn(format!("Model registry unavailable: {}", e)),
            },

            AppEvent::WorkspacesDiscovered { repo_root, result } => match result {
                Ok(workspaces) => {
                    tracing::info!(
                        repo = %repo_root.display(),
                        count = workspaces.len(),
                        "Discovered workspaces"
                    );
                    self.state.tree.set_project(&repo_root, &workspaces);
                    for agent in self.state.registry.iter() {
                        self.state.tree.attach_agent(agent);
                    }
                    if self.state.active_workspace.is_none() {
                        self.state.active_workspace =
                            self.state.tree.first_workspace().map(|info| info.path.clone());
                    }
                }
                Err(e) => self.state.warn(format!(
                    "Workspace discovery failed for {}: {}",
                    repo_root.display(),
                    e
                )),
            },

            AppEvent::LaunchCompleted {
                request,
                result,
                capture,
            } => self.handle_launch_completed(request, result, capture, effects),

            AppEvent::AgentStatusPolled { agent_id, state } => {
                let Some(status) = self.state.registry.apply_status(&agent_id, state) else {
                    tracing::debug!(agent_id = %agent_id, "Dropping status for cleared agent");
                    return;
                };
                self.state.tree.update_agent(&agent_id, status);

                if status.is_running() {
                    if let Some(agent) = self.state.registry.get(&agent_id) {
                        effects.push(Effect::PollStatus {
                            agent_id: agent.id.clone(),
                            window_id: agent.window_id.clone(),
                            delay: polling.status_interval,
                        });
                    }
                }
            }

            AppEvent::AgentOutputRead { agent_id, result } => {
                match result {
                    Ok(output) => {
                        self.state.registry.ingest_output(&agent_id, output);
                    }
                    Err(e) => tracing::debug!(agent_id = %agent_id, error = %e, "Output read failed"),
                }

                let next = if self.state.viewing.as_deref() == Some(agent_id.as_str()) {
                    self.state
                        .registry
                        .get(&agent_id)
                        .and_then(|agent| agent.capture.clone())
                } else {
                    None
                };
                match next {
                    Some(handle) => effects.push(Effect::StreamOutput {
                        agent_id,
                        handle,
                        delay: polling.output_interval,
                    }),
                    None => {
                        self.state.streams.remove(&agent_id);
                    }
                }
            }

            AppEvent::CaptureStopped { agent_id, error } => {
                if let Some(e) = error {
                    tracing::warn!(agent_id = %agent_id, error = %e, "Failed to stop output capture");
                }
            }

            AppEvent::UpstreamChecked { result } => {
                match result {
                    Ok(fingerprint) => {
                        let previous = self.state.upstream_fingerprint.replace(fingerprint);
                        if previous.is_some() && previous != self.state.upstream_fingerprint {
                            tracing::info!("Upstream work items changed, reloading");
                            effects.push(self.load_work_items());
                            self.state.just_refreshed = true;
                            self.state.refresh_generation += 1;
                            effects.push(Effect::ExpireRefreshFlag {
                                generation: self.state.refresh_generation,
                                delay: polling.refresh_flag,
                            });
                        }
                    }
                    Err(e) => tracing::debug!(error = %e, "Upstream check failed"),
                }

                if self.state.view != ViewState::Error {
                    effects.push(Effect::CheckUpstream {
                        delay: polling.upstream_interval,
                    });
                }
            }

            AppEvent::RefreshFlagExpired { generation } => {
                if generation == self.state.refresh_generation {
                    self.state.just_refreshed = false;
                }
            }

            AppEvent::AnimationTick => {
                self.state.animation.tick();
                effects.push(Effect::AnimationTick {
                    delay: polling.animation_interval,
                });
            }

            AppEvent::Input(_) | AppEvent::Quit => {}
        }
    }

    fn handle_launch_completed(
        &mut self,
        request: LaunchRequest,
        result: LaunchResult,
        capture: CaptureStart,
        effects: &mut Vec<Effect>,
    ) {
        self.state.launching.remove(&request.window_name);
        match result.error {
            Some(LaunchFailure::Render(e)) => {
                let message = format!("Failed to render {}: {}", result.window_name, e);
                if self.state.registry.is_empty() {
                    self.state.fail(message);
                } else {
                    self.state.warn(message);
                }
            }
            Some(failure @ LaunchFailure::Spawn(_)) => {
                self.state
                    .warn(format!("{}: {}", result.window_name, failure));
            }
            None => {
                let handle = match capture {
                    CaptureStart::Started(handle) => Some(handle),
                    CaptureStart::Failed(e) => {
                        self.state.warn(format!(
                            "Output capture unavailable for {}: {}",
                            result.window_name, e
                        ));
                        None
                    }
                    CaptureStart::Skipped => None,
                };

                let agent = RunningAgent::from_launch(&request, result.window_id, handle);
                self.state.tree.attach_agent(&agent);
                effects.push(Effect::PollStatus {
                    agent_id: agent.id.clone(),
                    window_id: agent.window_id.clone(),
                    delay: self.config.polling.status_interval,
                });
                self.state.registry.register(agent);
            }
        }
    }
}

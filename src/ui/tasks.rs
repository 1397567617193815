//! Background task executors
//!
//! Each [`Effect`] runs to completion on its own tokio task and yields exactly one
//! [`AppEvent`]. Executors never touch orchestrator state; everything they need is in
//! the effect itself or in the shared [`Services`].

use std::sync::Arc;

use crate::agent::{
    CaptureStart, HttpModelSource, LaunchFailure, LaunchResult, Launcher, ModelSource,
    OutputCapture, Renderer, StatusChecker, TemplateRenderer, TmuxBackend,
};
use crate::config::Config;
use crate::data::{SqliteTicketSource, TicketSource};
use crate::git::{GitWorkspaceDiscovery, WorkspaceDiscovery};
use crate::ui::effect::Effect;
use crate::ui::events::AppEvent;

/// External collaborators used by the task executors
#[derive(Clone)]
pub struct Services {
    pub tickets: Arc<dyn TicketSource>,
    pub models: Arc<dyn ModelSource>,
    pub workspaces: Arc<dyn WorkspaceDiscovery>,
    pub renderer: Arc<dyn Renderer>,
    pub launcher: Arc<dyn Launcher>,
    pub status: Arc<dyn StatusChecker>,
    pub capture: Arc<dyn OutputCapture>,
}

impl Services {
    /// Production collaborators: SQLite tickets, HTTP model registry, git, tmux
    pub fn from_config(config: &Config) -> Self {
        let tmux = Arc::new(TmuxBackend::new(
            config.tmux.capture_dir.clone(),
            config.tmux.capture_bytes,
        ));
        Self {
            tickets: Arc::new(SqliteTicketSource::new(config.tickets.database.clone())),
            models: Arc::new(HttpModelSource::new(config.models.registry_url.clone())),
            workspaces: Arc::new(GitWorkspaceDiscovery::new()),
            renderer: Arc::new(TemplateRenderer::new()),
            launcher: tmux.clone(),
            status: tmux.clone(),
            capture: tmux,
        }
    }
}

/// Run one effect to completion
pub async fn execute(effect: Effect, services: &Services) -> AppEvent {
    match effect {
        Effect::LoadWorkItems { filter } => AppEvent::WorkItemsLoaded {
            result: services
                .tickets
                .list(&filter)
                .await
                .map_err(|e| e.to_string()),
        },

        Effect::LoadModels { retry } => {
            let models = services.models.clone();
            let result = retry
                .run(|attempt| {
                    let models = models.clone();
                    async move {
                        tracing::debug!(attempt, "Fetching model registry");
                        models.fetch().await
                    }
                })
                .await;
            AppEvent::ModelsLoaded {
                result: result.map_err(|e| e.to_string()),
            }
        }

        Effect::DiscoverWorkspaces { repo_root } => {
            let result = services
                .workspaces
                .discover(&repo_root)
                .await
                .map_err(|e| e.to_string());
            AppEvent::WorkspacesDiscovered { repo_root, result }
        }

        Effect::Launch { request } => {
            let (result, capture) = launch(&request, services).await;
            AppEvent::LaunchCompleted {
                request,
                result,
                capture,
            }
        }

        Effect::PollStatus {
            agent_id,
            window_id,
            delay,
        } => {
            tokio::time::sleep(delay).await;
            let state = services.status.status(&window_id).await;
            AppEvent::AgentStatusPolled { agent_id, state }
        }

        Effect::StreamOutput {
            agent_id,
            handle,
            delay,
        } => {
            tokio::time::sleep(delay).await;
            let result = services
                .capture
                .read(&handle)
                .await
                .map_err(|e| e.to_string());
            AppEvent::AgentOutputRead { agent_id, result }
        }

        Effect::StopCapture { agent_id, handle } => {
            let error = services
                .capture
                .stop(&handle)
                .await
                .err()
                .map(|e| e.to_string());
            AppEvent::CaptureStopped { agent_id, error }
        }

        Effect::CheckUpstream { delay } => {
            tokio::time::sleep(delay).await;
            AppEvent::UpstreamChecked {
                result: services
                    .tickets
                    .fingerprint()
                    .await
                    .map_err(|e| e.to_string()),
            }
        }

        Effect::ExpireRefreshFlag { generation, delay } => {
            tokio::time::sleep(delay).await;
            AppEvent::RefreshFlagExpired { generation }
        }

        Effect::AnimationTick { delay } => {
            tokio::time::sleep(delay).await;
            AppEvent::AnimationTick
        }
    }
}

/// Render, spawn, then try to attach output capture
async fn launch(
    request: &crate::agent::LaunchRequest,
    services: &Services,
) -> (LaunchResult, CaptureStart) {
    let spec = match services.renderer.render(request) {
        Ok(spec) => spec,
        Err(e) => {
            return (
                LaunchResult::failure(&request.window_name, LaunchFailure::Render(e.to_string())),
                CaptureStart::Skipped,
            )
        }
    };

    let window_id = match services.launcher.launch(&spec).await {
        Ok(id) => id,
        Err(e) => {
            return (
                LaunchResult::failure(&spec.window_name, LaunchFailure::Spawn(e.to_string())),
                CaptureStart::Skipped,
            )
        }
    };

    let capture = match services.capture.start(&window_id, &spec.window_name).await {
        Ok(handle) => CaptureStart::Started(handle),
        Err(e) => CaptureStart::Failed(e.to_string()),
    };

    (LaunchResult::success(&spec.window_name, window_id), capture)
}

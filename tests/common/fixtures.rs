//! In-memory collaborators and builders for driving `App::update`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use deckhand::agent::{
    CaptureHandle, LaunchSpec, Launcher, ModelError, ModelInfo, ModelSource, OutputCapture,
    StatusChecker, TemplateRenderer, TmuxError,
};
use deckhand::data::{TicketError, TicketFilter, TicketSource};
use deckhand::git::{WorkspaceDiscovery, WorkspaceError};
use deckhand::ui::tasks;
use deckhand::{
    App, AppEvent, Config, Effect, Harness, LaunchRequest, LaunchResult, ModelCatalog,
    Selection, Services, SessionState, WorkItem, WorkspaceInfo,
};

pub const REPO: &str = "/src/app";
pub const FEATURE: &str = "/src/app-feature";

// ========== Harnesses ==========

/// No model or mode choice at all
pub fn solo() -> Harness {
    Harness::new("solo", "solo --task {{ticket.id}}")
}

/// Exactly one model and one mode
pub fn single() -> Harness {
    Harness::new("claude", "claude --model {{model}} {{prompt}}")
        .with_prompt("Work on {{ticket.id}}: {{ticket.title}}")
        .with_models(["anthropic/sonnet"])
        .with_agents(["build"])
}

/// Several models and modes
pub fn multi() -> Harness {
    Harness::new("opencode", "opencode -m {{model}} --agent {{agent}} {{prompt}}")
        .with_prompt("{{ticket.title}}")
        .with_models(["anthropic/sonnet", "openai/gpt-5"])
        .with_agents(["build", "plan"])
}

// ========== App builders ==========

pub fn config(harnesses: Vec<Harness>) -> Config {
    let mut config = Config::default();
    config.harnesses = harnesses;
    config.repos = vec![PathBuf::from(REPO)];
    config.polling.status_interval = Duration::from_millis(1);
    config.polling.output_interval = Duration::from_millis(1);
    config.polling.upstream_interval = Duration::from_millis(1);
    config.polling.refresh_flag = Duration::from_millis(1);
    config.polling.animation_interval = Duration::from_millis(1);
    config.models.retry.interval = Duration::from_millis(1);
    config
}

pub fn work_items(count: usize) -> Vec<WorkItem> {
    (1..=count)
        .map(|n| WorkItem::new(format!("bd-{}", n), format!("Task {}", n)))
        .collect()
}

/// App with `harnesses` and three loaded work items
pub fn app(harnesses: Vec<Harness>) -> App {
    let mut app = App::new(config(harnesses));
    app.update(AppEvent::WorkItemsLoaded {
        result: Ok(work_items(3)),
    });
    app
}

pub fn workspace(path: &str, primary: bool) -> WorkspaceInfo {
    WorkspaceInfo {
        path: PathBuf::from(path),
        branch: if primary { "main" } else { "feature" }.to_string(),
        dirty: false,
        is_primary: primary,
    }
}

/// Seed the tree with the primary checkout and one feature worktree
pub fn discover(app: &mut App) {
    app.update(AppEvent::WorkspacesDiscovered {
        repo_root: PathBuf::from(REPO),
        result: Ok(vec![workspace(REPO, true), workspace(FEATURE, false)]),
    });
}

// ========== Input ==========

pub fn key(code: KeyCode) -> AppEvent {
    AppEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

pub fn press(app: &mut App, code: KeyCode) -> Vec<Effect> {
    app.update(key(code))
}

pub fn enter(app: &mut App) -> Vec<Effect> {
    press(app, KeyCode::Enter)
}

// ========== Launches ==========

pub fn request(ticket: &str, harness: Harness, workspace: &str) -> LaunchRequest {
    LaunchRequest {
        selection: Selection {
            work_item: WorkItem::new(ticket, "Task"),
            harness: harness.clone(),
            model: String::new(),
            agent: String::new(),
        },
        workspace: PathBuf::from(workspace),
        window_name: format!("{}-{}", ticket, harness.name),
    }
}

pub fn capture_handle(window_id: &str) -> CaptureHandle {
    CaptureHandle {
        window_id: window_id.to_string(),
        path: PathBuf::from(format!("/tmp/{}.log", window_id.trim_start_matches('@'))),
    }
}

/// Feed a successful launch result (with capture) for `ticket` into the app
pub fn launched(app: &mut App, ticket: &str, workspace: &str) -> (String, Vec<Effect>) {
    let request = request(ticket, solo(), workspace);
    let window_id = format!("@{}", ticket);
    let agent_id = request.window_name.clone();
    let effects = app.update(AppEvent::LaunchCompleted {
        result: LaunchResult::success(&request.window_name, &window_id),
        capture: deckhand::agent::CaptureStart::Started(capture_handle(&window_id)),
        request,
    });
    (agent_id, effects)
}

pub fn finish(app: &mut App, agent_id: &str, exit_code: i32) -> Vec<Effect> {
    app.update(AppEvent::AgentStatusPolled {
        agent_id: agent_id.to_string(),
        state: SessionState::Dead {
            exit_code: Some(exit_code),
        },
    })
}

// ========== Fake collaborators ==========

#[derive(Default)]
pub struct FakeTickets {
    pub items: Mutex<Vec<WorkItem>>,
    pub fingerprint: Mutex<String>,
    pub fail: bool,
}

#[async_trait]
impl TicketSource for FakeTickets {
    async fn list(&self, filter: &TicketFilter) -> Result<Vec<WorkItem>, TicketError> {
        if self.fail {
            return Err(TicketError::Missing(PathBuf::from("/nowhere/beads.db")));
        }
        let items = self.items.lock().unwrap();
        Ok(items.iter().take(filter.limit).cloned().collect())
    }

    async fn fingerprint(&self) -> Result<String, TicketError> {
        Ok(self.fingerprint.lock().unwrap().clone())
    }
}

pub struct FakeModels(pub Vec<ModelInfo>);

#[async_trait]
impl ModelSource for FakeModels {
    async fn fetch(&self) -> Result<ModelCatalog, ModelError> {
        Ok(ModelCatalog::new(self.0.clone()))
    }
}

#[derive(Default)]
pub struct FakeWorkspaces(pub HashMap<PathBuf, Vec<WorkspaceInfo>>);

#[async_trait]
impl WorkspaceDiscovery for FakeWorkspaces {
    async fn discover(&self, repo_root: &Path) -> Result<Vec<WorkspaceInfo>, WorkspaceError> {
        self.0
            .get(repo_root)
            .cloned()
            .ok_or_else(|| WorkspaceError::NotAGitRepo(repo_root.to_path_buf()))
    }
}

/// Records launches; status and output are scripted per window id
#[derive(Default)]
pub struct FakeTmux {
    pub launched: Mutex<Vec<LaunchSpec>>,
    pub states: Mutex<HashMap<String, SessionState>>,
    pub output: Mutex<HashMap<String, String>>,
    pub stopped: Mutex<Vec<String>>,
}

impl FakeTmux {
    pub fn set_state(&self, window_id: &str, state: SessionState) {
        self.states
            .lock()
            .unwrap()
            .insert(window_id.to_string(), state);
    }
}

#[async_trait]
impl Launcher for FakeTmux {
    async fn launch(&self, spec: &LaunchSpec) -> Result<String, TmuxError> {
        let mut launched = self.launched.lock().unwrap();
        launched.push(spec.clone());
        Ok(format!("@{}", launched.len()))
    }
}

#[async_trait]
impl StatusChecker for FakeTmux {
    async fn status(&self, window_id: &str) -> SessionState {
        self.states
            .lock()
            .unwrap()
            .get(window_id)
            .copied()
            .unwrap_or(SessionState::Running)
    }
}

#[async_trait]
impl OutputCapture for FakeTmux {
    async fn start(&self, window_id: &str, _window_name: &str) -> Result<CaptureHandle, TmuxError> {
        Ok(capture_handle(window_id))
    }

    async fn read(&self, handle: &CaptureHandle) -> Result<String, TmuxError> {
        Ok(self
            .output
            .lock()
            .unwrap()
            .get(&handle.window_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn stop(&self, handle: &CaptureHandle) -> Result<(), TmuxError> {
        self.stopped.lock().unwrap().push(handle.window_id.clone());
        Ok(())
    }
}

pub struct Fakes {
    pub tickets: Arc<FakeTickets>,
    pub tmux: Arc<FakeTmux>,
    pub services: Services,
}

/// Services backed by fakes: three work items, one repo with two workspaces
pub fn fakes() -> Fakes {
    let tickets = Arc::new(FakeTickets {
        items: Mutex::new(work_items(3)),
        fingerprint: Mutex::new("3:0".to_string()),
        fail: false,
    });
    let tmux = Arc::new(FakeTmux::default());
    let workspaces = FakeWorkspaces(HashMap::from([(
        PathBuf::from(REPO),
        vec![workspace(REPO, true), workspace(FEATURE, false)],
    )]));

    let services = Services {
        tickets: tickets.clone(),
        models: Arc::new(FakeModels(vec![
            ModelInfo::new("anthropic", "sonnet"),
            ModelInfo::new("openai", "gpt-5"),
        ])),
        workspaces: Arc::new(workspaces),
        renderer: Arc::new(TemplateRenderer::new()),
        launcher: tmux.clone(),
        status: tmux.clone(),
        capture: tmux.clone(),
    };
    Fakes {
        tickets,
        tmux,
        services,
    }
}

/// Execute every effect and reconcile its message; returns the follow-up effects
pub async fn settle(app: &mut App, services: &Services, effects: Vec<Effect>) -> Vec<Effect> {
    let mut next = Vec::new();
    for effect in effects {
        let event = tasks::execute(effect, services).await;
        next.extend(app.update(event));
    }
    next
}

/// Keep only effects matching `keep`, dropping perpetual ticks
pub fn only(effects: Vec<Effect>, keep: impl Fn(&Effect) -> bool) -> Vec<Effect> {
    effects.into_iter().filter(|e| keep(e)).collect()
}

//! Session lifecycle: registration, polling, output streaming, and clearing

use crossterm::event::KeyCode;
use std::path::PathBuf;
use std::time::Duration;

use super::common::fixtures::{
    app, capture_handle, discover, finish, launched, press, request, solo, FEATURE, REPO,
};
use deckhand::agent::{CaptureStart, LaunchResult};
use deckhand::ui::{FocusColumn, ViewState};
use deckhand::{AgentStatus, App, AppEvent, Effect, SessionState};

/// App with a discovered tree and focus in the sidebar
fn sidebar_app() -> App {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    while app.state().focus != FocusColumn::Sidebar {
        press(&mut app, KeyCode::Tab);
    }
    app
}

/// Move the sidebar cursor onto the node with `id`
fn select_node(app: &mut App, id: &str) {
    let target = app
        .state()
        .tree
        .flat()
        .iter()
        .position(|node| node.id == id)
        .unwrap_or_else(|| panic!("node {} not visible", id));
    while app.state().tree.cursor() > target {
        press(app, KeyCode::Up);
    }
    while app.state().tree.cursor() < target {
        press(app, KeyCode::Down);
    }
}

#[test]
fn test_successful_launch_registers_running_agent_under_workspace() {
    let mut app = app(vec![solo()]);
    discover(&mut app);

    let (agent_id, effects) = launched(&mut app, "bd-1", FEATURE);

    let agent = app.state().registry.get(&agent_id).expect("registered");
    assert_eq!(agent.status, AgentStatus::Running);
    assert_eq!(agent.workspace, PathBuf::from(FEATURE));
    assert!(agent.capture.is_some());

    let flat = app.state().tree.flat();
    let feature = flat.iter().position(|n| n.path == PathBuf::from(FEATURE)).unwrap();
    assert_eq!(flat[feature + 1].id, agent_id);
    assert_eq!(flat[feature + 1].depth, flat[feature].depth + 1);

    assert!(matches!(
        effects.as_slice(),
        [Effect::PollStatus { agent_id: id, window_id, .. }] if *id == agent_id && window_id == "@bd-1"
    ));
}

#[test]
fn test_capture_failure_still_registers_with_warning() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    let req = request("bd-2", solo(), REPO);
    let effects = app.update(AppEvent::LaunchCompleted {
        result: LaunchResult::success(&req.window_name, "@9"),
        capture: CaptureStart::Failed("pipe-pane refused".to_string()),
        request: req,
    });

    let agent = app.state().registry.get("bd-2-solo").expect("registered");
    assert!(agent.capture.is_none());
    assert_eq!(app.state().warnings.len(), 1);
    assert_eq!(effects.len(), 1);
}

#[test]
fn test_orphan_session_is_tracked_but_not_in_tree() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    let before = app.state().tree.flat().to_vec();

    let (agent_id, _) = launched(&mut app, "bd-1", "/elsewhere");

    assert!(app.state().registry.contains(&agent_id));
    assert_eq!(app.state().tree.flat(), before.as_slice());
}

#[test]
fn test_status_polling_reschedules_only_while_running() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    let (agent_id, _) = launched(&mut app, "bd-1", REPO);

    for state in [SessionState::Running, SessionState::Unknown] {
        let effects = app.update(AppEvent::AgentStatusPolled {
            agent_id: agent_id.clone(),
            state,
        });
        assert!(matches!(effects.as_slice(), [Effect::PollStatus { .. }]));
        assert!(app.state().registry.is_running(&agent_id));
    }

    let effects = finish(&mut app, &agent_id, 0);
    assert!(effects.is_empty());
    assert_eq!(
        app.state().registry.get(&agent_id).unwrap().status,
        AgentStatus::Completed
    );
    let node = app
        .state()
        .tree
        .flat()
        .iter()
        .find(|n| n.id == agent_id)
        .unwrap();
    assert!(!node.running);
}

#[test]
fn test_nonzero_exit_is_failed_and_final() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    let (agent_id, _) = launched(&mut app, "bd-1", REPO);

    finish(&mut app, &agent_id, 3);
    assert_eq!(
        app.state().registry.get(&agent_id).unwrap().status,
        AgentStatus::Failed
    );

    app.update(AppEvent::AgentStatusPolled {
        agent_id: agent_id.clone(),
        state: SessionState::Running,
    });
    assert_eq!(
        app.state().registry.get(&agent_id).unwrap().status,
        AgentStatus::Failed
    );
}

#[test]
fn test_clearing_one_agent_removes_exactly_one_leaf() {
    let mut app = sidebar_app();
    let (first, _) = launched(&mut app, "bd-1", REPO);
    let (second, _) = launched(&mut app, "bd-2", REPO);
    let (third, _) = launched(&mut app, "bd-3", FEATURE);

    let before: Vec<_> = app.state().tree.flat().to_vec();
    select_node(&mut app, &second);
    let effects = press(&mut app, KeyCode::Char('x'));

    assert!(!app.state().registry.contains(&second));
    assert!(app.state().registry.contains(&first));
    assert!(app.state().registry.contains(&third));

    let expected: Vec<_> = before.into_iter().filter(|n| n.id != second).collect();
    assert_eq!(app.state().tree.flat(), expected.as_slice());

    assert!(matches!(
        effects.as_slice(),
        [Effect::StopCapture { agent_id, .. }] if *agent_id == second
    ));
}

#[test]
fn test_clear_on_non_agent_node_does_nothing() {
    let mut app = sidebar_app();
    launched(&mut app, "bd-1", REPO);
    let workspace_id = format!("workspace:{}", REPO);
    select_node(&mut app, &workspace_id);

    let effects = press(&mut app, KeyCode::Char('x'));

    assert!(effects.is_empty());
    assert_eq!(app.state().registry.len(), 1);
}

#[test]
fn test_clear_stopped_keeps_running_and_rebuilds_once() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    let (done, _) = launched(&mut app, "bd-1", REPO);
    let (running, _) = launched(&mut app, "bd-2", REPO);
    let (failed, _) = launched(&mut app, "bd-3", FEATURE);
    finish(&mut app, &done, 0);
    finish(&mut app, &failed, 1);

    let rebuilds = app.state().tree.rebuilds();
    let effects = press(&mut app, KeyCode::Char('X'));

    assert_eq!(app.state().tree.rebuilds(), rebuilds + 1);
    assert_eq!(app.state().registry.len(), 1);
    assert!(app.state().registry.is_running(&running));
    assert!(app.state().tree.flat().iter().any(|n| n.id == running));
    assert!(!app
        .state()
        .tree
        .flat()
        .iter()
        .any(|n| n.id == done || n.id == failed));

    let stopped: Vec<&str> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::StopCapture { agent_id, .. } => Some(agent_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(stopped, vec![done.as_str(), failed.as_str()]);
}

#[test]
fn test_clear_stopped_with_nothing_stopped_is_a_noop() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    launched(&mut app, "bd-1", REPO);
    let rebuilds = app.state().tree.rebuilds();

    assert!(press(&mut app, KeyCode::Char('X')).is_empty());
    assert_eq!(app.state().tree.rebuilds(), rebuilds);
    assert_eq!(app.state().registry.len(), 1);
}

#[test]
fn test_late_poll_does_not_resurrect_cleared_agent() {
    let mut app = sidebar_app();
    let (agent_id, _) = launched(&mut app, "bd-1", REPO);
    select_node(&mut app, &agent_id);
    press(&mut app, KeyCode::Char('x'));
    let flat = app.state().tree.flat().to_vec();

    for state in [
        SessionState::Running,
        SessionState::Dead { exit_code: Some(0) },
        SessionState::Unknown,
    ] {
        let effects = app.update(AppEvent::AgentStatusPolled {
            agent_id: agent_id.clone(),
            state,
        });
        assert!(effects.is_empty());
    }

    assert!(!app.state().registry.contains(&agent_id));
    assert_eq!(app.state().tree.flat(), flat.as_slice());
}

#[test]
fn test_selecting_agent_streams_output_while_viewed() {
    let mut app = sidebar_app();
    let (agent_id, _) = launched(&mut app, "bd-1", REPO);
    select_node(&mut app, &agent_id);

    let effects = press(&mut app, KeyCode::Enter);
    assert_eq!(app.state().viewing.as_deref(), Some(agent_id.as_str()));
    assert_eq!(app.state().view, ViewState::Matrix);
    assert!(matches!(
        effects.as_slice(),
        [Effect::StreamOutput { delay, .. }] if *delay == Duration::ZERO
    ));

    // A second select while the read is in flight starts no second chain
    assert!(press(&mut app, KeyCode::Enter).is_empty());

    let effects = app.update(AppEvent::AgentOutputRead {
        agent_id: agent_id.clone(),
        result: Ok("\x1b[1mbuilding\x1b[0m".to_string()),
    });
    assert!(matches!(effects.as_slice(), [Effect::StreamOutput { .. }]));
    assert!(app
        .state()
        .registry
        .get(&agent_id)
        .unwrap()
        .output
        .contains("building"));

    // Leaving the output view ends the chain
    press(&mut app, KeyCode::Esc);
    assert!(app.state().viewing.is_none());
    let effects = app.update(AppEvent::AgentOutputRead {
        agent_id: agent_id.clone(),
        result: Ok("done".to_string()),
    });
    assert!(effects.is_empty());
    assert!(app.state().streams.is_empty());
}

#[test]
fn test_viewing_output_does_not_touch_selection() {
    let mut app = sidebar_app();
    let (agent_id, _) = launched(&mut app, "bd-1", REPO);
    let draft = app.state().draft.clone();
    let disabled = app.state().disabled;
    select_node(&mut app, &agent_id);

    press(&mut app, KeyCode::Enter);

    assert_eq!(app.state().draft, draft);
    assert_eq!(app.state().disabled, disabled);
    assert_eq!(app.state().focus, FocusColumn::Sidebar);
}

#[test]
fn test_output_view_can_clear_viewed_agent() {
    let mut app = sidebar_app();
    let (agent_id, _) = launched(&mut app, "bd-1", REPO);
    select_node(&mut app, &agent_id);
    press(&mut app, KeyCode::Enter);

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.key_context(), deckhand::config::KeyContext::Output);

    let effects = press(&mut app, KeyCode::Char('x'));
    assert!(app.state().viewing.is_none());
    assert!(app.state().registry.is_empty());
    assert!(matches!(
        effects.as_slice(),
        [Effect::StopCapture { handle, .. }] if *handle == capture_handle("@bd-1")
    ));
}

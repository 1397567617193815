//! Full reducer/dispatcher loop against fake collaborators

use crossterm::event::KeyCode;
use std::path::PathBuf;

use super::common::fixtures::{
    config, enter, fakes, only, press, settle, solo, FakeTickets, Fakes, REPO,
};
use deckhand::ui::ViewState;
use deckhand::{AgentStatus, App, Effect, Harness, SessionState};

fn is_tick(effect: &Effect) -> bool {
    matches!(
        effect,
        Effect::CheckUpstream { .. } | Effect::AnimationTick { .. }
    )
}

/// Start an app and settle everything `init` asks for
async fn started(harnesses: Vec<Harness>) -> (App, Fakes, Vec<Effect>) {
    let fakes = fakes();
    let mut app = App::new(config(harnesses));
    let effects = app.init();
    let next = settle(&mut app, &fakes.services, effects).await;
    (app, fakes, next)
}

#[tokio::test]
async fn test_init_loads_everything_and_keeps_polling() {
    let (app, _fakes, next) = started(vec![solo()]).await;

    assert_eq!(app.state().tickets.items().len(), 3);
    assert!(app.state().tickets_loaded);
    assert_eq!(app.state().catalog.len(), 2);
    assert_eq!(app.state().tree.flat().len(), 3);
    assert_eq!(app.state().active_workspace, Some(PathBuf::from(REPO)));

    assert_eq!(next.len(), 2);
    assert!(next.iter().all(is_tick));
}

#[tokio::test]
async fn test_wildcard_launch_runs_to_completion() {
    let any = Harness::new("any", "run --model {{model}}").with_models(["*"]);
    let (mut app, fakes, _) = started(vec![any, solo()]).await;

    enter(&mut app);
    enter(&mut app);
    assert_eq!(app.state().models.items().len(), 2);
    press(&mut app, KeyCode::Down);
    enter(&mut app);
    assert_eq!(app.state().view, ViewState::Confirm);

    let effects = enter(&mut app);
    let effects = settle(&mut app, &fakes.services, effects).await;

    let launched = fakes.tmux.launched.lock().unwrap().clone();
    assert_eq!(launched.len(), 1);
    assert_eq!(launched[0].command, "run --model openai/gpt-5");
    assert_eq!(launched[0].workspace, PathBuf::from(REPO));

    let agent = app.state().registry.get("bd-1-any").expect("registered");
    assert_eq!(agent.window_id, "@1");
    assert!(app.state().tree.flat().iter().any(|n| n.id == agent.id));

    // Still running: the poll comes back and schedules another
    let effects = settle(&mut app, &fakes.services, effects).await;
    assert!(matches!(effects.as_slice(), [Effect::PollStatus { .. }]));

    fakes.tmux.set_state("@1", SessionState::Dead { exit_code: Some(0) });
    let effects = settle(&mut app, &fakes.services, effects).await;

    assert!(effects.is_empty());
    assert_eq!(
        app.state().registry.get("bd-1-any").unwrap().status,
        AgentStatus::Completed
    );
}

#[tokio::test]
async fn test_upstream_change_triggers_reload() {
    let (mut app, fakes, next) = started(vec![solo()]).await;
    let ticks = only(next, |e| matches!(e, Effect::CheckUpstream { .. }));

    fakes
        .tickets
        .items
        .lock()
        .unwrap()
        .push(deckhand::WorkItem::new("bd-4", "Task 4"));
    *fakes.tickets.fingerprint.lock().unwrap() = "4:1".to_string();

    let effects = settle(&mut app, &fakes.services, ticks).await;
    assert!(app.state().just_refreshed);

    let reload = only(effects, |e| matches!(e, Effect::LoadWorkItems { .. }));
    assert_eq!(reload.len(), 1);
    settle(&mut app, &fakes.services, reload).await;
    assert_eq!(app.state().tickets.items().len(), 4);
}

#[tokio::test]
async fn test_failing_ticket_source_shows_error_view() {
    let mut fakes = fakes();
    fakes.services.tickets = std::sync::Arc::new(FakeTickets {
        fail: true,
        ..FakeTickets::default()
    });
    let mut app = App::new(config(vec![solo()]));
    let effects = app.init();

    let next = settle(&mut app, &fakes.services, effects).await;

    assert_eq!(app.state().view, ViewState::Error);
    assert!(app.state().fatal.is_some());
    assert!(!next
        .iter()
        .any(|e| matches!(e, Effect::CheckUpstream { .. })));
}

//! Selection workflow: step skipping, confirm, cancel, and the fatal/warning paths

use crossterm::event::KeyCode;
use std::path::PathBuf;

use super::common::fixtures::{
    app, config, discover, enter, launched, multi, press, single, solo, REPO,
};
use super::common::terminal::render_app;
use deckhand::agent::{CaptureStart, LaunchFailure, LaunchResult};
use deckhand::ui::{Action, FocusColumn, ViewState};
use deckhand::{App, AppEvent, Effect, ModelCatalog};

#[test]
fn test_solo_harness_goes_straight_to_confirm_with_empty_fields() {
    let mut app = app(vec![solo()]);

    let effects = enter(&mut app);

    assert!(effects.is_empty());
    let state = app.state();
    assert_eq!(state.view, ViewState::Confirm);
    let pending = state.pending.as_ref().expect("selection should be pending");
    assert_eq!(pending.work_item.id, "bd-1");
    assert_eq!(pending.harness.name, "solo");
    assert_eq!(pending.model, "");
    assert_eq!(pending.agent, "");
    assert!(state.disabled.is_disabled(FocusColumn::Model));
    assert!(state.disabled.is_disabled(FocusColumn::Agent));
}

#[test]
fn test_second_harness_with_singleton_lists_prefills_and_confirms() {
    let mut app = app(vec![multi(), single()]);

    enter(&mut app);
    assert_eq!(app.state().focus, FocusColumn::Harness);
    assert_eq!(app.state().view, ViewState::Matrix);

    press(&mut app, KeyCode::Down);
    enter(&mut app);

    let state = app.state();
    assert_eq!(state.view, ViewState::Confirm);
    let pending = state.pending.as_ref().unwrap();
    assert_eq!(pending.harness.name, "claude");
    assert_eq!(pending.model, "anthropic/sonnet");
    assert_eq!(pending.agent, "build");
}

#[test]
fn test_zero_models_forces_empty_model_after_earlier_choice() {
    let mut app = app(vec![multi(), solo()]);

    enter(&mut app); // ticket
    enter(&mut app); // multi
    assert_eq!(app.state().focus, FocusColumn::Model);
    press(&mut app, KeyCode::Down);
    enter(&mut app); // second model
    assert_eq!(app.state().draft.model, "openai/gpt-5");
    assert_eq!(app.state().focus, FocusColumn::Agent);

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.state().focus, FocusColumn::Harness);

    press(&mut app, KeyCode::Down);
    enter(&mut app); // solo

    let state = app.state();
    assert!(state.disabled.is_disabled(FocusColumn::Model));
    assert_eq!(state.draft.model, "");
    assert_eq!(state.view, ViewState::Confirm);
    assert_eq!(state.pending.as_ref().unwrap().model, "");
}

#[test]
fn test_disabled_agent_column_is_skipped_after_model() {
    let harness = deckhand::Harness::new("models-only", "run {{model}}")
        .with_models(["a/x", "a/y"]);
    let mut app = app(vec![harness, solo()]);

    enter(&mut app);
    enter(&mut app);
    assert_eq!(app.state().focus, FocusColumn::Model);
    assert!(app.state().disabled.is_disabled(FocusColumn::Agent));

    enter(&mut app);
    assert_eq!(app.state().view, ViewState::Confirm);
    assert_eq!(app.state().pending.as_ref().unwrap().model, "a/x");
}

#[test]
fn test_wildcard_models_expand_against_catalogue() {
    let harness = deckhand::Harness::new("any", "run {{model}}").with_models(["anthropic/*"]);
    let mut app = app(vec![harness, solo()]);
    app.update(AppEvent::ModelsLoaded {
        result: Ok(ModelCatalog::new(vec![
            deckhand::agent::ModelInfo::new("anthropic", "sonnet"),
            deckhand::agent::ModelInfo::new("anthropic", "opus"),
            deckhand::agent::ModelInfo::new("openai", "gpt-5"),
        ])),
    });

    enter(&mut app);
    enter(&mut app);

    let models = app.state().models.items().to_vec();
    assert_eq!(models.len(), 2);
    assert!(models.iter().all(|m| m.starts_with("anthropic/")));
    assert_eq!(app.state().focus, FocusColumn::Model);
}

#[test]
fn test_cancel_is_noop_at_tickets_and_steps_back_otherwise() {
    let mut app = app(vec![multi(), solo()]);

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.state().focus, FocusColumn::Tickets);

    enter(&mut app);
    enter(&mut app);
    assert_eq!(app.state().focus, FocusColumn::Model);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.state().focus, FocusColumn::Harness);
}

#[test]
fn test_cancel_from_confirm_returns_to_matrix() {
    let mut app = app(vec![solo()]);
    enter(&mut app);
    assert_eq!(app.state().view, ViewState::Confirm);

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.state().view, ViewState::Matrix);
    assert!(app.state().pending.is_none());
}

#[test]
fn test_confirm_emits_launch_in_active_workspace() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    enter(&mut app);

    let effects = enter(&mut app);

    assert_eq!(app.state().view, ViewState::Matrix);
    let [Effect::Launch { request }] = effects.as_slice() else {
        panic!("expected one launch effect, got {:?}", effects);
    };
    assert_eq!(request.workspace, PathBuf::from(REPO));
    assert_eq!(request.window_name, "bd-1-solo");
    assert_eq!(request.selection.work_item.id, "bd-1");
}

#[test]
fn test_launch_without_workspace_uses_first_repo() {
    let mut app = app(vec![solo()]);
    enter(&mut app);
    let effects = enter(&mut app);

    let Some(Effect::Launch { request }) = effects.first() else {
        panic!("expected a launch effect");
    };
    assert_eq!(request.workspace, PathBuf::from(REPO));
}

#[test]
fn test_window_name_avoids_registered_sessions() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    launched(&mut app, "bd-1", REPO);

    enter(&mut app);
    let effects = enter(&mut app);

    let Some(Effect::Launch { request }) = effects.first() else {
        panic!("expected a launch effect");
    };
    assert_eq!(request.window_name, "bd-1-solo-2");
}

fn launch_request(effects: &[Effect]) -> deckhand::LaunchRequest {
    match effects {
        [Effect::Launch { request }] => request.clone(),
        other => panic!("expected one launch effect, got {:?}", other),
    }
}

#[test]
fn test_back_to_back_launches_get_distinct_windows() {
    let mut app = app(vec![solo()]);
    discover(&mut app);

    enter(&mut app);
    let first = launch_request(&enter(&mut app));
    enter(&mut app);
    let second = launch_request(&enter(&mut app));

    assert_eq!(first.window_name, "bd-1-solo");
    assert_eq!(second.window_name, "bd-1-solo-2");

    for (request, window_id) in [(first, "@1"), (second, "@2")] {
        app.update(AppEvent::LaunchCompleted {
            result: LaunchResult::success(&request.window_name, window_id),
            capture: CaptureStart::Skipped,
            request,
        });
    }

    assert_eq!(app.state().registry.len(), 2);
    assert!(app.state().launching.is_empty());
}

#[test]
fn test_failed_launch_releases_its_window_name() {
    let mut app = app(vec![solo()]);
    discover(&mut app);
    enter(&mut app);
    let request = launch_request(&enter(&mut app));

    app.update(AppEvent::LaunchCompleted {
        result: LaunchResult::failure(
            &request.window_name,
            LaunchFailure::Spawn("no server".to_string()),
        ),
        capture: CaptureStart::Skipped,
        request,
    });

    enter(&mut app);
    assert_eq!(launch_request(&enter(&mut app)).window_name, "bd-1-solo");
}

#[test]
fn test_tabbing_past_model_column_cannot_skip_it() {
    let mut app = app(vec![multi(), solo()]);
    enter(&mut app);
    enter(&mut app);
    assert_eq!(app.state().focus, FocusColumn::Model);

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.state().focus, FocusColumn::Agent);
    enter(&mut app);

    assert_eq!(app.state().view, ViewState::Matrix);
    assert_eq!(app.state().focus, FocusColumn::Model);
    assert!(app.state().pending.is_none());

    enter(&mut app);
    assert_eq!(app.state().focus, FocusColumn::Agent);
    enter(&mut app);
    let pending = app.state().pending.as_ref().expect("selection should be pending");
    assert_eq!(pending.model, "anthropic/sonnet");
    assert_eq!(pending.agent, "build");
}

#[test]
fn test_moving_ticket_highlight_requires_reconfirming_it() {
    let mut app = app(vec![multi(), solo()]);
    enter(&mut app);
    assert_eq!(app.state().draft.work_item.as_ref().unwrap().id, "bd-1");

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Down);
    assert!(app.state().draft.work_item.is_none());

    // Walk forward without confirming the new ticket
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.state().focus, FocusColumn::Harness);
    press(&mut app, KeyCode::Down);
    enter(&mut app);

    assert_eq!(app.state().view, ViewState::Matrix);
    assert_eq!(app.state().focus, FocusColumn::Tickets);

    enter(&mut app);
    assert_eq!(app.state().focus, FocusColumn::Harness);
    enter(&mut app);
    let pending = app.state().pending.as_ref().expect("selection should be pending");
    assert_eq!(pending.work_item.id, "bd-2");
    assert_eq!(pending.harness.name, "solo");
}

#[test]
fn test_late_catalogue_rebuilds_model_column_for_chosen_harness() {
    let harness = deckhand::Harness::new("any", "run {{model}} {{agent}}")
        .with_models(["anthropic/*"])
        .with_agents(["build", "plan"]);
    let mut app = app(vec![harness, solo()]);

    enter(&mut app);
    enter(&mut app);
    assert!(app.state().disabled.is_disabled(FocusColumn::Model));
    assert_eq!(app.state().focus, FocusColumn::Agent);

    app.update(AppEvent::ModelsLoaded {
        result: Ok(ModelCatalog::new(vec![
            deckhand::agent::ModelInfo::new("anthropic", "sonnet"),
            deckhand::agent::ModelInfo::new("anthropic", "opus"),
        ])),
    });

    assert_eq!(app.state().models.len(), 2);
    assert!(!app.state().disabled.is_disabled(FocusColumn::Model));

    enter(&mut app);
    assert_eq!(app.state().focus, FocusColumn::Model);
    enter(&mut app);
    enter(&mut app);
    assert_eq!(app.state().pending.as_ref().unwrap().model, "anthropic/sonnet");
}

#[test]
fn test_tab_cycles_enabled_columns_and_sidebar() {
    let mut app = app(vec![solo(), single()]);
    enter(&mut app); // two harnesses, so no auto-select
    assert_eq!(app.state().focus, FocusColumn::Harness);
    enter(&mut app); // solo disables Model and Agent
    press(&mut app, KeyCode::Esc); // leave confirm
    assert_eq!(app.state().view, ViewState::Matrix);

    let mut seen = Vec::new();
    for _ in 0..4 {
        press(&mut app, KeyCode::Tab);
        seen.push(app.state().focus);
    }
    assert_eq!(
        seen,
        vec![
            FocusColumn::Sidebar,
            FocusColumn::Tickets,
            FocusColumn::Harness,
            FocusColumn::Sidebar,
        ]
    );
}

#[test]
fn test_work_item_failure_is_fatal_and_only_quit_works() {
    let mut app = App::new(config(vec![solo()]));
    app.update(AppEvent::WorkItemsLoaded {
        result: Err("database is locked".to_string()),
    });

    assert_eq!(app.state().view, ViewState::Error);
    assert!(app
        .state()
        .fatal
        .as_deref()
        .is_some_and(|m| m.contains("database is locked")));

    assert!(enter(&mut app).is_empty());
    assert!(app.perform(Action::Refresh).is_empty());
    assert_eq!(app.state().view, ViewState::Error);
    assert!(!app.should_quit());

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}

#[test]
fn test_nonfatal_errors_accumulate_until_dismissed() {
    let mut app = app(vec![solo()]);
    app.update(AppEvent::ModelsLoaded {
        result: Err("timed out".to_string()),
    });
    app.update(AppEvent::WorkspacesDiscovered {
        repo_root: PathBuf::from(REPO),
        result: Err("not a git repository".to_string()),
    });

    assert_eq!(app.state().warnings.len(), 2);
    assert_eq!(app.state().view, ViewState::Matrix);

    press(&mut app, KeyCode::Char('w'));
    assert!(app.state().warnings.is_empty());
}

#[test]
fn test_render_failure_is_fatal_only_before_any_session() {
    let render_failed = |ticket: &str| AppEvent::LaunchCompleted {
        request: super::common::fixtures::request(ticket, solo(), REPO),
        result: LaunchResult::failure(
            format!("{}-solo", ticket),
            LaunchFailure::Render("unknown placeholder".to_string()),
        ),
        capture: CaptureStart::Skipped,
    };

    let mut first = app(vec![solo()]);
    first.update(render_failed("bd-1"));
    assert_eq!(first.state().view, ViewState::Error);

    let mut later = app(vec![solo()]);
    discover(&mut later);
    launched(&mut later, "bd-1", REPO);
    later.update(render_failed("bd-2"));
    assert_eq!(later.state().view, ViewState::Matrix);
    assert_eq!(later.state().warnings.len(), 1);
}

#[test]
fn test_spawn_failure_warns_without_registering() {
    let mut app = app(vec![solo()]);
    let effects = app.update(AppEvent::LaunchCompleted {
        request: super::common::fixtures::request("bd-1", solo(), REPO),
        result: LaunchResult::failure(
            "bd-1-solo",
            LaunchFailure::Spawn("no server running".to_string()),
        ),
        capture: CaptureStart::Skipped,
    });

    assert!(effects.is_empty());
    assert!(app.state().registry.is_empty());
    assert_eq!(app.state().view, ViewState::Matrix);
    assert_eq!(app.state().warnings.len(), 1);
}

#[test]
fn test_manual_refresh_reloads_work_items() {
    let mut app = app(vec![solo()]);
    let effects = press(&mut app, KeyCode::Char('r'));
    assert!(matches!(effects.as_slice(), [Effect::LoadWorkItems { .. }]));
}

#[test]
fn test_upstream_change_reloads_and_flags_refresh() {
    let mut app = app(vec![solo()]);
    let check = |fingerprint: &str| AppEvent::UpstreamChecked {
        result: Ok(fingerprint.to_string()),
    };

    let effects = app.update(check("3:a"));
    assert!(matches!(effects.as_slice(), [Effect::CheckUpstream { .. }]));
    assert!(!app.state().just_refreshed);

    let effects = app.update(check("3:a"));
    assert_eq!(effects.len(), 1);

    let effects = app.update(check("4:b"));
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::LoadWorkItems { .. })));
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::CheckUpstream { .. })));
    assert!(app.state().just_refreshed);
    let generation = app.state().refresh_generation;

    app.update(check("5:c"));
    app.update(AppEvent::RefreshFlagExpired { generation });
    assert!(app.state().just_refreshed, "stale timer must not clear a newer flag");

    app.update(AppEvent::RefreshFlagExpired {
        generation: app.state().refresh_generation,
    });
    assert!(!app.state().just_refreshed);
}

#[test]
fn test_animation_tick_always_reschedules() {
    let mut app = app(vec![solo()]);
    enter(&mut app);
    assert!(app.state().animation.is_flashing());

    for _ in 0..20 {
        let effects = app.update(AppEvent::AnimationTick);
        assert!(matches!(effects.as_slice(), [Effect::AnimationTick { .. }]));
    }
    assert!(!app.state().animation.is_flashing());
}

#[test]
fn test_empty_work_item_list_renders_explicit_message() {
    let mut app = App::new(config(vec![solo()]));
    assert!(render_app(&app).contains("Loading work items"));

    app.update(AppEvent::WorkItemsLoaded { result: Ok(Vec::new()) });
    let screen = render_app(&app);
    assert!(screen.contains("No work items"), "screen was:\n{}", screen);

    assert!(enter(&mut app).is_empty());
    assert_eq!(app.state().view, ViewState::Matrix);
}

#[test]
fn test_confirm_screen_shows_selection() {
    let mut app = app(vec![multi(), single()]);
    discover(&mut app);
    enter(&mut app);
    press(&mut app, KeyCode::Down);
    enter(&mut app);

    let screen = render_app(&app);
    assert!(screen.contains("Confirm launch"));
    assert!(screen.contains("anthropic/sonnet"));
    assert!(screen.contains(REPO));
}

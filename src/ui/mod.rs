pub mod action;
pub mod animation;
pub mod app;
pub mod app_state;
pub mod components;
pub mod effect;
pub mod events;
pub mod navigation;
pub mod tasks;
pub mod terminal_guard;

pub use action::Action;
pub use animation::AnimationState;
pub use app::App;
pub use app_state::{AppState, SelectionDraft};
pub use effect::Effect;
pub use events::{AppEvent, FocusColumn, ViewState};
pub use navigation::DisabledColumns;
pub use tasks::Services;

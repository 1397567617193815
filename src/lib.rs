pub mod agent;
pub mod config;
pub mod data;
pub mod git;
pub mod ui;
pub mod util;

pub use agent::{
    AgentRegistry, AgentStatus, LaunchRequest, LaunchResult, LaunchSpec, ModelCatalog,
    RunningAgent, Selection, SessionState,
};
pub use config::Config;
pub use data::{Harness, TicketFilter, WorkItem};
pub use git::WorkspaceInfo;
pub use ui::{App, AppEvent, Effect, Services};

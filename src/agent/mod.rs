pub mod error;
pub mod launch;
pub mod models;
pub mod registry;
pub mod tmux;

pub use error::{ModelError, RenderError, TmuxError};
pub use launch::{
    shell_quote, unique_window_name, CaptureStart, LaunchFailure, LaunchRequest, LaunchResult,
    LaunchSpec, Renderer, Selection, TemplateRenderer,
};
pub use models::{HttpModelSource, ModelCatalog, ModelInfo, ModelSource, RetryPolicy};
pub use registry::{AgentRegistry, AgentStatus, RunningAgent};
pub use tmux::{
    CaptureHandle, Launcher, OutputCapture, SessionState, StatusChecker, TmuxBackend,
};

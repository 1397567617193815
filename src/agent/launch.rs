//! Launch types and the template renderer
//!
//! A finalized [`Selection`] plus the active workspace becomes a [`LaunchRequest`]
//! snapshot at dispatch time. The renderer turns it into a [`LaunchSpec`] (prompt first,
//! then the command, which may embed the rendered prompt).

use std::path::PathBuf;

use crate::agent::error::RenderError;
use crate::agent::tmux::CaptureHandle;
use crate::data::{Harness, WorkItem};

/// Fully chosen work item, harness, model and execution mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub work_item: WorkItem,
    pub harness: Harness,
    /// Empty when the harness supports no model choice
    pub model: String,
    /// Empty when the harness supports no execution-mode choice
    pub agent: String,
}

/// Immutable input handed to the launch task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub selection: Selection,
    pub workspace: PathBuf,
    pub window_name: String,
}

/// Rendered invocation, produced once per launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub selection: Selection,
    pub workspace: PathBuf,
    pub command: String,
    pub prompt: String,
    pub window_name: String,
}

/// Why a launch attempt produced no session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchFailure {
    /// Templates could not be rendered; nothing was spawned
    Render(String),
    /// The launcher failed to spawn the window
    Spawn(String),
}

impl std::fmt::Display for LaunchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchFailure::Render(msg) => write!(f, "render failed: {}", msg),
            LaunchFailure::Spawn(msg) => write!(f, "launch failed: {}", msg),
        }
    }
}

/// Outcome of one launch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchResult {
    pub window_name: String,
    /// Opaque identifier used for status polling and output capture
    pub window_id: String,
    pub error: Option<LaunchFailure>,
}

impl LaunchResult {
    pub fn success(window_name: impl Into<String>, window_id: impl Into<String>) -> Self {
        Self {
            window_name: window_name.into(),
            window_id: window_id.into(),
            error: None,
        }
    }

    pub fn failure(window_name: impl Into<String>, error: LaunchFailure) -> Self {
        Self {
            window_name: window_name.into(),
            window_id: String::new(),
            error: Some(error),
        }
    }
}

/// Output capture state attached to a successful launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStart {
    Started(CaptureHandle),
    Failed(String),
    /// No capture was attempted because the launch itself failed
    Skipped,
}

/// Renders a launch request into a launch spec
pub trait Renderer: Send + Sync {
    fn render(&self, request: &LaunchRequest) -> Result<LaunchSpec, RenderError>;
}

/// `{{placeholder}}` substitution over the harness templates
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, request: &LaunchRequest) -> Result<LaunchSpec, RenderError> {
        let selection = &request.selection;
        let item = &selection.work_item;
        let workspace = request.workspace.to_string_lossy();

        let mut vars: Vec<(&str, String)> = vec![
            ("ticket.id", item.id.clone()),
            ("ticket.title", item.title.clone()),
            ("ticket.description", item.description.clone()),
            ("ticket.status", item.status.clone()),
            ("model", selection.model.clone()),
            ("agent", selection.agent.clone()),
            ("workspace", workspace.to_string()),
            ("harness", selection.harness.name.clone()),
        ];

        let prompt = render_template("prompt", &selection.harness.prompt, &vars)?;

        if selection.harness.command.trim().is_empty() {
            return Err(RenderError::Empty("command"));
        }
        vars.push(("prompt", shell_quote(&prompt)));
        let command = render_template("command", &selection.harness.command, &vars)?;

        Ok(LaunchSpec {
            selection: selection.clone(),
            workspace: request.workspace.clone(),
            command,
            prompt,
            window_name: request.window_name.clone(),
        })
    }
}

fn render_template(
    name: &'static str,
    template: &str,
    vars: &[(&str, String)],
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or(RenderError::Unterminated(name))?;
        let key = after[..end].trim();
        let value = vars
            .iter()
            .find(|(var, _)| *var == key)
            .map(|(_, value)| value)
            .ok_or_else(|| RenderError::UnknownPlaceholder {
                template: name,
                placeholder: key.to_string(),
            })?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Quote a string for a POSIX shell command line
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Window name for a new session: `<ticket>-<harness>`, restricted to `[A-Za-z0-9_-]`,
/// suffixed with `-2`, `-3`, … while `taken` reports a collision.
pub fn unique_window_name(work_item_id: &str, harness: &str, taken: impl Fn(&str) -> bool) -> String {
    let base: String = format!("{}-{}", work_item_id, harness)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

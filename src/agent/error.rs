use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model registry request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid model registry document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown placeholder {{{{{placeholder}}}}} in {template} template")]
    UnknownPlaceholder {
        template: &'static str,
        placeholder: String,
    },
    #[error("unterminated placeholder in {0} template")]
    Unterminated(&'static str),
    #[error("{0} template is empty")]
    Empty(&'static str),
}

#[derive(Error, Debug)]
pub enum TmuxError {
    #[error("tmux {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
    #[error("tmux returned no window id")]
    NoWindowId,
    #[error("capture file {path}: {source}")]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

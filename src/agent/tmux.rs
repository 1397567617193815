//! Terminal-multiplexer session backend
//!
//! Agents run in detached tmux windows created with `remain-on-exit` so the exit status
//! of the harness survives the process. Output is mirrored into a capture file via
//! `pipe-pane` and read back as a bounded tail.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::process::Command;

use crate::agent::error::TmuxError;
use crate::agent::launch::{shell_quote, LaunchSpec};

/// Liveness of a session window as seen by the multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// The process exited; `None` when the status is unavailable (window gone)
    Dead { exit_code: Option<i32> },
    /// The multiplexer could not be queried
    Unknown,
}

/// Identifies an active output capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureHandle {
    pub window_id: String,
    pub path: PathBuf,
}

/// Spawns sessions
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Create a detached window running the rendered command, returning its id
    async fn launch(&self, spec: &LaunchSpec) -> Result<String, TmuxError>;
}

/// Polls session liveness
#[async_trait]
pub trait StatusChecker: Send + Sync {
    async fn status(&self, window_id: &str) -> SessionState;
}

/// Mirrors session output
#[async_trait]
pub trait OutputCapture: Send + Sync {
    async fn start(&self, window_id: &str, window_name: &str) -> Result<CaptureHandle, TmuxError>;

    /// Most recent output, bounded by the configured tail size
    async fn read(&self, handle: &CaptureHandle) -> Result<String, TmuxError>;

    async fn stop(&self, handle: &CaptureHandle) -> Result<(), TmuxError>;
}

/// tmux implementation of the session traits
#[derive(Debug, Clone)]
pub struct TmuxBackend {
    capture_dir: PathBuf,
    capture_bytes: u64,
}

impl TmuxBackend {
    pub fn new(capture_dir: impl Into<PathBuf>, capture_bytes: u64) -> Self {
        Self {
            capture_dir: capture_dir.into(),
            capture_bytes,
        }
    }

    async fn tmux(args: &[&str]) -> Result<String, TmuxError> {
        let output = Command::new("tmux")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(TmuxError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Launcher for TmuxBackend {
    async fn launch(&self, spec: &LaunchSpec) -> Result<String, TmuxError> {
        let workspace = spec.workspace.to_string_lossy();
        let window_id = Self::tmux(&[
            "new-window",
            "-d",
            "-P",
            "-F",
            "#{window_id}",
            "-n",
            &spec.window_name,
            "-c",
            &workspace,
            &spec.command,
        ])
        .await?;

        if window_id.is_empty() {
            return Err(TmuxError::NoWindowId);
        }

        if let Err(e) =
            Self::tmux(&["set-option", "-w", "-t", &window_id, "remain-on-exit", "on"]).await
        {
            tracing::warn!(window = %window_id, error = %e, "Failed to set remain-on-exit");
        }

        tracing::info!(
            window = %spec.window_name,
            window_id = %window_id,
            workspace = %workspace,
            "Launched session"
        );
        Ok(window_id)
    }
}

#[async_trait]
impl StatusChecker for TmuxBackend {
    async fn status(&self, window_id: &str) -> SessionState {
        match Self::tmux(&[
            "display-message",
            "-p",
            "-t",
            window_id,
            "#{pane_dead} #{pane_dead_status}",
        ])
        .await
        {
            Ok(out) => parse_pane_status(&out),
            Err(TmuxError::CommandFailed { stderr, .. }) if is_missing_target(&stderr) => {
                SessionState::Dead { exit_code: None }
            }
            Err(e) => {
                tracing::debug!(window_id, error = %e, "Status query failed");
                SessionState::Unknown
            }
        }
    }
}

#[async_trait]
impl OutputCapture for TmuxBackend {
    async fn start(&self, window_id: &str, window_name: &str) -> Result<CaptureHandle, TmuxError> {
        let path = self.capture_dir.join(format!("{}.log", window_name));
        let io_err = |source| TmuxError::Capture {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.capture_dir)
            .await
            .map_err(io_err)?;
        tokio::fs::write(&path, b"").await.map_err(io_err)?;

        let pipe = format!("cat >> {}", shell_quote(&path.to_string_lossy()));
        Self::tmux(&["pipe-pane", "-o", "-t", window_id, &pipe]).await?;

        Ok(CaptureHandle {
            window_id: window_id.to_string(),
            path,
        })
    }

    async fn read(&self, handle: &CaptureHandle) -> Result<String, TmuxError> {
        read_tail(&handle.path, self.capture_bytes)
            .await
            .map_err(|source| TmuxError::Capture {
                path: handle.path.clone(),
                source,
            })
    }

    async fn stop(&self, handle: &CaptureHandle) -> Result<(), TmuxError> {
        // A window that is already gone has no pipe left to close
        if let Err(e) = Self::tmux(&["pipe-pane", "-t", &handle.window_id]).await {
            tracing::debug!(window_id = %handle.window_id, error = %e, "Closing pipe failed");
        }

        match tokio::fs::remove_file(&handle.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TmuxError::Capture {
                path: handle.path.clone(),
                source,
            }),
        }
    }
}

/// Parse `#{pane_dead} #{pane_dead_status}`
fn parse_pane_status(out: &str) -> SessionState {
    let mut parts = out.split_whitespace();
    match parts.next() {
        Some("0") => SessionState::Running,
        Some("1") => SessionState::Dead {
            exit_code: parts.next().and_then(|code| code.parse().ok()),
        },
        _ => SessionState::Unknown,
    }
}

fn is_missing_target(stderr: &str) -> bool {
    stderr.contains("can't find") || stderr.contains("no such")
}

async fn read_tail(path: &Path, max_bytes: u64) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    file.seek(SeekFrom::Start(len.saturating_sub(max_bytes)))
        .await?;

    let mut buf = Vec::with_capacity(len.min(max_bytes) as usize);
    file.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::agent::models::RetryPolicy;
use crate::data::{Harness, TicketFilter};
use crate::ui::action::Action;
use crate::util::paths::{captures_dir, config_path};

use super::default_keys::default_keybindings;
use super::keys::{parse_key_notation, KeyContext, KeybindingConfig};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Name of the project-local config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "deckhand.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no launch configurations defined; add a [[harness]] table to {0}")]
    NoHarness(PathBuf),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository roots whose workspaces populate the project tree
    pub repos: Vec<PathBuf>,
    /// Work-item source location and default filter
    pub tickets: TicketSettings,
    /// Model registry location and fetch policy
    pub models: ModelSettings,
    /// Intervals for the self-rescheduling background tasks
    pub polling: PollingSettings,
    /// Session backend settings
    pub tmux: TmuxSettings,
    /// Launch configurations, in display order
    pub harnesses: Vec<Harness>,
    /// Keybinding configuration
    pub keybindings: KeybindingConfig,
    /// File this configuration was read from, if any
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TicketSettings {
    pub database: PathBuf,
    pub filter: TicketFilter,
}

impl Default for TicketSettings {
    fn default() -> Self {
        Self {
            database: PathBuf::from(".beads/beads.db"),
            filter: TicketFilter::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelSettings {
    pub registry_url: Option<String>,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingSettings {
    pub status_interval: Duration,
    pub output_interval: Duration,
    pub upstream_interval: Duration,
    pub refresh_flag: Duration,
    pub animation_interval: Duration,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(2000),
            output_interval: Duration::from_millis(500),
            upstream_interval: Duration::from_millis(5000),
            refresh_flag: Duration::from_millis(1500),
            animation_interval: Duration::from_millis(80),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TmuxSettings {
    /// Directory holding per-window capture files
    pub capture_dir: PathBuf,
    /// Tail size read from a capture file per output poll
    pub capture_bytes: u64,
}

impl Default for TmuxSettings {
    fn default() -> Self {
        Self {
            capture_dir: captures_dir(),
            capture_bytes: 64 * 1024,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos: vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))],
            tickets: TicketSettings::default(),
            models: ModelSettings::default(),
            polling: PollingSettings::default(),
            tmux: TmuxSettings::default(),
            harnesses: Vec::new(),
            keybindings: default_keybindings(),
            source: None,
        }
    }
}

/// TOML representation of the `[tickets]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlTicketConfig {
    pub database: Option<PathBuf>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

/// TOML representation of the `[models]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlModelConfig {
    pub registry_url: Option<String>,
    pub retry_attempts: Option<u32>,
    pub retry_interval_ms: Option<u64>,
}

/// TOML representation of the `[polling]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlPollingConfig {
    pub status_interval_ms: Option<u64>,
    pub output_interval_ms: Option<u64>,
    pub upstream_interval_ms: Option<u64>,
    pub refresh_flag_ms: Option<u64>,
    pub animation_interval_ms: Option<u64>,
}

/// TOML representation of the `[tmux]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlTmuxConfig {
    pub capture_dir: Option<PathBuf>,
    pub capture_bytes: Option<u64>,
}

/// TOML representation of keybinding configuration.
///
/// Top-level string entries are global bindings; nested tables are per-context.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlKeybindings {
    #[serde(flatten)]
    pub entries: HashMap<String, toml::Value>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub repos: Option<Vec<PathBuf>>,
    pub tickets: Option<TomlTicketConfig>,
    pub models: Option<TomlModelConfig>,
    pub polling: Option<TomlPollingConfig>,
    pub tmux: Option<TomlTmuxConfig>,
    #[serde(default, rename = "harness")]
    pub harnesses: Vec<Harness>,
    pub keys: Option<TomlKeybindings>,
}

impl TomlKeybindings {
    /// Convert TOML keybindings to KeybindingConfig, skipping entries that do not parse
    fn to_keybinding_config(&self) -> KeybindingConfig {
        let mut config = KeybindingConfig::new();

        for (name, value) in &self.entries {
            match value {
                toml::Value::String(key_str) => {
                    if let Some((combo, action)) = parse_binding(name, key_str) {
                        config.global.insert(combo, action);
                    }
                }
                toml::Value::Table(table) => {
                    let Some(context) = KeyContext::from_table_name(name) else {
                        tracing::warn!(context = %name, "Unknown keybinding context");
                        continue;
                    };
                    let context_map = config.context.entry(context).or_default();
                    for (action_name, key_value) in table {
                        if let Some((combo, action)) = key_value
                            .as_str()
                            .and_then(|key_str| parse_binding(action_name, key_str))
                        {
                            context_map.insert(combo, action);
                        }
                    }
                }
                _ => tracing::warn!(entry = %name, "Ignoring non-string keybinding"),
            }
        }

        config
    }
}

fn parse_binding(action_name: &str, key_str: &str) -> Option<(super::KeyCombo, Action)> {
    let Some(action) = Action::parse(action_name) else {
        tracing::warn!(action = %action_name, "Unknown action in keybinding config");
        return None;
    };
    match parse_key_notation(key_str) {
        Ok(combo) => Some((combo, action)),
        Err(e) => {
            tracing::warn!(action = %action_name, key = %key_str, error = %e, "Invalid key notation");
            None
        }
    }
}

impl Config {
    /// Load configuration, trying `explicit`, then `./deckhand.toml`, then the data dir.
    ///
    /// The data-dir config is created from the bundled example on first run.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(LOCAL_CONFIG_FILE);
                if local.exists() {
                    local
                } else {
                    let global = config_path();
                    if !global.exists() {
                        Self::create_default_config(&global);
                    }
                    global
                }
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        if config.harnesses.is_empty() {
            return Err(ConfigError::NoHarness(path));
        }

        tracing::info!(
            path = %path.display(),
            harnesses = config.harnesses.len(),
            "Loaded configuration"
        );
        config.source = Some(path);
        Ok(config)
    }

    /// Parse configuration text, merging it over the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(repos) = toml_config.repos {
            if !repos.is_empty() {
                config.repos = repos;
            }
        }

        if let Some(tickets) = toml_config.tickets {
            if let Some(database) = tickets.database {
                config.tickets.database = database;
            }
            let filter = &mut config.tickets.filter;
            filter.status = tickets.status.or(filter.status.take());
            filter.category = tickets.category.or(filter.category.take());
            filter.search = tickets.search.or(filter.search.take());
            if let Some(limit) = tickets.limit {
                filter.limit = limit;
            }
        }

        if let Some(models) = toml_config.models {
            config.models.registry_url = models.registry_url.filter(|url| !url.is_empty());
            if let Some(attempts) = models.retry_attempts {
                config.models.retry.attempts = attempts.max(1);
            }
            if let Some(ms) = models.retry_interval_ms {
                config.models.retry.interval = Duration::from_millis(ms);
            }
        }

        if let Some(polling) = toml_config.polling {
            let apply = |target: &mut Duration, ms: Option<u64>| {
                if let Some(ms) = ms {
                    *target = Duration::from_millis(ms.max(1));
                }
            };
            let p = &mut config.polling;
            apply(&mut p.status_interval, polling.status_interval_ms);
            apply(&mut p.output_interval, polling.output_interval_ms);
            apply(&mut p.upstream_interval, polling.upstream_interval_ms);
            apply(&mut p.refresh_flag, polling.refresh_flag_ms);
            apply(&mut p.animation_interval, polling.animation_interval_ms);
        }

        if let Some(tmux) = toml_config.tmux {
            if let Some(dir) = tmux.capture_dir {
                config.tmux.capture_dir = dir;
            }
            if let Some(bytes) = tmux.capture_bytes {
                config.tmux.capture_bytes = bytes;
            }
        }

        config.harnesses = toml_config.harnesses;

        if let Some(keys) = toml_config.keys {
            config.keybindings.merge(keys.to_keybinding_config());
        }

        Ok(config)
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Failed to create config directory");
                return;
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_repos(mut self, repos: Vec<PathBuf>) -> Self {
        if !repos.is_empty() {
            self.repos = repos;
        }
        self
    }

    /// Repository used when a launch happens before any workspace is selected
    pub fn fallback_workspace(&self) -> PathBuf {
        self.repos
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

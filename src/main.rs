use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use deckhand::ui::terminal_guard::install_panic_hook;
use deckhand::{util, App, Config, Services};
use tracing_subscriber::EnvFilter;

/// Pick a work item, launch a coding agent on it in tmux, and keep an eye on it
#[derive(Debug, Parser)]
#[command(name = "deckhand", version, about)]
struct Cli {
    /// Configuration file (default: ./deckhand.toml, then ~/.deckhand/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Repository root to discover workspaces in (repeatable)
    #[arg(short, long = "repo", value_name = "PATH")]
    repos: Vec<PathBuf>,

    /// Only show work items with this status
    #[arg(long)]
    status: Option<String>,

    /// Only show work items of this category
    #[arg(long)]
    category: Option<String>,

    /// Free-text search over title and description
    #[arg(long)]
    search: Option<String>,

    /// Maximum number of work items to list
    #[arg(long)]
    limit: Option<usize>,

    /// Log filter directive, e.g. `debug` or `deckhand=trace`
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Directory for logs, captures and the default config (default: ~/.deckhand)
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    if let Err(e) = init_logging(cli.log_level.as_deref()) {
        eprintln!("deckhand: failed to set up logging: {e:#}");
        return ExitCode::FAILURE;
    }

    if let Err(message) = check_host() {
        tracing::error!(%message, "Host environment missing");
        eprintln!("deckhand: {message}");
        return ExitCode::from(2);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("deckhand: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    install_panic_hook();
    let services = Services::from_config(&config);
    match App::new(config).run(services).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exited with error");
            eprintln!("deckhand: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to `<data_dir>/logs/deckhand.log`; the terminal belongs to the UI
fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    fs::create_dir_all(util::logs_dir())?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Sessions are tmux windows, so tmux must be installed and we must be inside it
fn check_host() -> Result<(), String> {
    which::which("tmux").map_err(|_| "tmux was not found on PATH".to_string())?;
    if std::env::var_os("TMUX").is_none() {
        return Err("deckhand must be run inside a tmux session".to_string());
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let repos = cli
        .repos
        .iter()
        .map(|repo| {
            fs::canonicalize(repo).unwrap_or_else(|e| {
                tracing::warn!(repo = %repo.display(), error = %e, "Could not resolve repo path");
                repo.clone()
            })
        })
        .collect();

    let mut config = Config::load(cli.config.as_deref())?.with_repos(repos);

    let filter = &mut config.tickets.filter;
    if cli.status.is_some() {
        filter.status = cli.status.clone();
    }
    if cli.category.is_some() {
        filter.category = cli.category.clone();
    }
    if cli.search.is_some() {
        filter.search = cli.search.clone();
    }
    if let Some(limit) = cli.limit {
        filter.limit = limit;
    }

    Ok(config)
}

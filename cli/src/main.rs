//! `todos`: print the todo list screen to a terminal.
//!
//! Loads once and exits by default (non-zero if the load failed). With
//! `--refresh-every` it keeps running, reprinting on every state change until
//! Ctrl-C.

mod config;
mod render;

use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use todo_core::{Notice, TodosPresenter, UiState};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::render::render;

/// How long a one-shot run waits for the notice that follows a failed load.
const NOTICE_GRACE: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch and display todos", long_about = None)]
struct Args {
    /// Base URL of the todo API
    #[arg(long)]
    base_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Give up on a request after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Keep running and refresh every N seconds
    #[arg(long, value_name = "SECS")]
    refresh_every: Option<u64>,
}

impl Args {
    /// Flags win over the config file, which wins over defaults.
    fn resolve(&self) -> Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.client.base_url = base_url.clone();
        }
        if self.timeout_secs.is_some() {
            config.client.timeout_secs = self.timeout_secs;
        }
        if self.refresh_every.is_some() {
            config.refresh_every_secs = self.refresh_every;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let args = Args::parse();
    let config = args.resolve().context("invalid configuration")?;
    debug!(?config, "resolved configuration");

    let presenter = todo_core::presenter(&config.client);
    let (states, notices) = launch(&presenter);
    let mut out = io::stdout();
    let mut err = io::stderr();

    match config.refresh_every() {
        None => {
            let settled = run_once(states, notices, &mut out, &mut err).await?;
            Ok(ExitCode::from(exit_status(&settled)))
        }
        Some(period) => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "cannot listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };
            run_watch(&presenter, states, notices, period, shutdown, &mut out, &mut err).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Subscribes to states and notices, then issues the startup load, so the
/// first load's notice cannot be published before anyone listens.
fn launch(presenter: &TodosPresenter) -> (watch::Receiver<UiState>, broadcast::Receiver<Notice>) {
    let states = presenter.subscribe();
    let notices = presenter.notices();
    presenter.load_todos();
    (states, notices)
}

fn exit_status(settled: &UiState) -> u8 {
    if settled.error_message().is_some() {
        1
    } else {
        0
    }
}

/// Prints the current state and then the first settled one, which it returns.
async fn run_once(
    mut states: watch::Receiver<UiState>,
    mut notices: broadcast::Receiver<Notice>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<UiState> {
    let current = render(&states.borrow_and_update());
    writeln!(out, "{current}")?;

    let settled = states
        .wait_for(|state| !state.is_loading())
        .await
        .context("presenter dropped before the load settled")?
        .clone();
    writeln!(out, "{}", render(&settled))?;

    if settled.error_message().is_some() {
        if let Ok(Ok(notice)) = tokio::time::timeout(NOTICE_GRACE, notices.recv()).await {
            writeln!(err, "{notice}")?;
        }
    }
    Ok(settled)
}

/// Prints every state change and notice, refreshing on each `period` tick,
/// until `shutdown` resolves.
async fn run_watch(
    presenter: &TodosPresenter,
    mut states: watch::Receiver<UiState>,
    mut notices: broadcast::Receiver<Notice>,
    period: Duration,
    shutdown: impl Future<Output = ()>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let current = render(&states.borrow_and_update());
    writeln!(out, "{current}")?;

    let mut ticker = tokio::time::interval(period);
    // The first tick fires immediately; the startup load already covers it.
    ticker.tick().await;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = render(&states.borrow_and_update());
                writeln!(out, "{current}")?;
            }
            notice = notices.recv() => match notice {
                Ok(notice) => writeln!(err, "{notice}")?,
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "missed notices"),
                Err(RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                debug!("periodic refresh");
                presenter.refresh();
            }
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
        }
    }
    Ok(())
}

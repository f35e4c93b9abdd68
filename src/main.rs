//! Chiawatch CLI entry point.
//!
//! Provides `start`, `check`, and `notify-test` subcommands for running the
//! watcher daemon, scanning a log file once, or sending a test notification.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};

use chiawatch::config::{load_config, runtime_paths, Config};
use chiawatch::credentials::{load_credentials, Credentials};
use chiawatch::handlers::signage_point::SignagePointHandler;
use chiawatch::handlers::LogHandler;
use chiawatch::notifier::telegram::TelegramNotifier;
use chiawatch::notifier::{Event, EventKind, EventPriority, Notifier, NotifyManager};
use chiawatch::watcher::LogTailer;

/// Chiawatch: Chia full node log watcher.
#[derive(Parser)]
#[command(name = "chiawatch", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Watch the configured log file and send notifications.
    Start {
        /// Config file (defaults to ~/.chiawatch/config.toml).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Scan a log file once and print detected events as JSON lines.
    Check {
        /// Log file to scan.
        log_file: PathBuf,
    },
    /// Send a test notification through the configured notifiers.
    NotifyTest {
        /// Config file (defaults to ~/.chiawatch/config.toml).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Priority of the test event.
        #[arg(long, value_enum, default_value_t = PriorityArg::Normal)]
        priority: PriorityArg,
    },
}

/// Event priority as accepted on the command line.
#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    /// Silent delivery.
    Low,
    /// Regular delivery.
    Normal,
    /// Delivery with an attention marker.
    High,
}

impl From<PriorityArg> for EventPriority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Self::Low,
            PriorityArg::Normal => Self::Normal,
            PriorityArg::High => Self::High,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start { config } => handle_start(config).await,
        Command::Check { log_file } => handle_check(&log_file),
        Command::NotifyTest { config, priority } => handle_notify_test(config, priority).await,
    }
}

/// Run the watcher daemon.
async fn handle_start(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let paths = runtime_paths()?;
    let _logging_guard = chiawatch::logging::init_production(&paths.logs_dir)?;

    let config_path = config_path.unwrap_or_else(|| paths.config_toml.clone());
    let config = load_config(&config_path)?;
    let notify_manager = build_notify_manager(&config, &paths.env_file)?;

    let mut handler = SignagePointHandler::new(config.handler.service);
    let mut tailer = if config.log.read_from_start {
        LogTailer::new(config.log.file_path.clone())
    } else {
        LogTailer::from_end(config.log.file_path.clone())
    };

    info!(
        config = %config_path.display(),
        log_file = %config.log.file_path.display(),
        notifiers = notify_manager.len(),
        "chiawatch started"
    );

    let mut interval =
        tokio::time::interval(tokio::time::Duration::from_secs(config.log.poll_interval_secs));

    loop {
        interval.tick().await;

        let logs = match tailer.poll() {
            Ok(logs) => logs,
            Err(e) => {
                warn!(error = %e, "failed to read log file");
                continue;
            }
        };
        if logs.is_empty() {
            continue;
        }

        let events = handler.handle(&logs);
        if !events.is_empty() && notify_manager.process_events(&events).await {
            warn!(count = events.len(), "some notifications were not delivered");
        }

        debug!(events = events.len(), "poll cycle complete");
    }
}

/// Scan a log file once through a fresh handler and print the events.
fn handle_check(log_file: &Path) -> anyhow::Result<()> {
    chiawatch::logging::init_cli();

    let logs = std::fs::read_to_string(log_file)
        .with_context(|| format!("failed to read {}", log_file.display()))?;

    let mut handler = SignagePointHandler::new(Config::default().handler.service);
    let events = handler.handle(&logs);

    for event in &events {
        let line = serde_json::to_string(event).context("failed to serialize event")?;
        println!("{line}");
    }

    if events.is_empty() {
        info!("no issues detected");
    }
    Ok(())
}

/// Send one test event through the configured notifiers.
async fn handle_notify_test(
    config_path: Option<PathBuf>,
    priority: PriorityArg,
) -> anyhow::Result<()> {
    chiawatch::logging::init_cli();

    let paths = runtime_paths()?;
    let config_path = config_path.unwrap_or_else(|| paths.config_toml.clone());
    let config = load_config(&config_path)?;
    let notify_manager = build_notify_manager(&config, &paths.env_file)?;

    anyhow::ensure!(
        !notify_manager.is_empty(),
        "no notifiers are enabled in {}",
        config_path.display()
    );

    let event = Event {
        kind: EventKind::User,
        priority: priority.into(),
        service: config.handler.service,
        message: "Test notification from chiawatch.".to_owned(),
    };

    anyhow::ensure!(
        !notify_manager.process_events(&[event]).await,
        "test notification was not delivered"
    );
    info!("test notification delivered");
    Ok(())
}

/// Build the notifiers enabled in `config`, reading secrets from `env_file`.
fn build_notify_manager(config: &Config, env_file: &Path) -> anyhow::Result<NotifyManager> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    let telegram = &config.notifier.telegram;
    if telegram.enable {
        let credentials: Credentials = load_credentials(env_file)
            .with_context(|| format!("failed to load {}", env_file.display()))?;
        let token = credentials.require(&telegram.bot_token_env)?;
        notifiers.push(Box::new(TelegramNotifier::new(
            &token,
            telegram.chat_id,
            config.notifier.title_prefix.clone(),
        )));
    }

    if notifiers.is_empty() {
        warn!("no notifiers enabled, events will only be logged");
    }

    Ok(NotifyManager::new(notifiers))
}

//! catlog command line tool
//!
//! Writes messages through a configured logging service and manages the
//! rotating log files it produces.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;

use catlog::config::{self, FileConfig, LoggingConfig};
use catlog::{Category, Level, LoggingService, RotatingFileDestination};

catlog::categories! {
    /// Categories available from the command line
    enum Channel {
        App => "app",
        Net => "net",
        Ui => "ui",
        Db => "db",
    }
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ~/.catlog/config.toml)
    #[arg(long, env = "CATLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Filter for catlog's own diagnostics; RUST_LOG takes precedence
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log a message, or every line of stdin when no text is given
    Write {
        /// Category name (app, net, ui, db)
        category: String,
        /// Level (verbose, debug, info, warning, error)
        level: Level,
        text: Vec<String>,
    },
    /// List retained log files, newest first
    List,
    /// Start a new log file
    Roll,
    /// Delete a retained log file
    Delete { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    catlog::diagnostics::init_diagnostics(args.log.as_deref())
        .context("Failed to initialize diagnostics")?;

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let mut logging_config = LoggingConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if logging_config.file.is_none() {
        logging_config.file = Some(FileConfig::default());
    }

    let service = Arc::new(
        logging_config
            .build_service::<Channel>()
            .context("Failed to set up logging")?,
    );

    match args.command {
        Command::Write {
            category,
            level,
            text,
        } => {
            let channel = Channel::from_name(&category)
                .with_context(|| format!("Unknown category '{}'", category))?;
            let writer = Arc::clone(&service);
            tokio::task::spawn_blocking(move || write(&writer, channel, level, text))
                .await
                .context("Writer task failed")??;
        }
        Command::List => list(&service),
        Command::Roll => roll(&service).await?,
        Command::Delete { path } => delete(&service, &path)?,
    }

    Ok(())
}

fn write(
    service: &LoggingService<Channel>,
    channel: Channel,
    level: Level,
    text: Vec<String>,
) -> Result<()> {
    let logger = service.logger(channel);

    if text.is_empty() {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            logger.log(level, catlog::location!(), || line);
        }
    } else {
        logger.log(level, catlog::location!(), || text.join(" "));
    }

    service.flush();
    Ok(())
}

fn list(service: &LoggingService<Channel>) {
    for destination in service.file_destinations() {
        let active = destination.current_log_file_path();
        println!("{}", destination.logs_directory().display());
        for path in destination.sorted_log_file_paths() {
            let marker = if active.as_ref() == Some(&path) { "*" } else { " " };
            println!("{} {}", marker, path.display());
        }
    }
}

async fn roll(service: &LoggingService<Channel>) -> Result<()> {
    let (tx, rx) = oneshot::channel();
    service.roll_log_files(Some(Box::new(move || {
        let _ = tx.send(());
    })));
    rx.await.context("Log writer stopped before the rollover finished")?;

    for destination in service.file_destinations() {
        if let Some(path) = destination.current_log_file_path() {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn delete(service: &LoggingService<Channel>, path: &Path) -> Result<()> {
    for destination in service.file_destinations() {
        // A bare file name refers to the logs directory
        let candidate = if path.parent().map_or(true, |p| p.as_os_str().is_empty()) {
            destination.logs_directory().join(path)
        } else {
            path.to_path_buf()
        };

        if destination.sorted_log_file_paths().contains(&candidate) {
            destination
                .delete_log_file(&candidate)
                .with_context(|| format!("Failed to delete {}", candidate.display()))?;
            println!("Deleted {}", candidate.display());
            return Ok(());
        }
    }

    anyhow::bail!("{} is not a retained log file", path.display())
}

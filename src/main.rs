//! glycocheck: diabetes risk questionnaire.
//!
//! Main entry point for the command-line application.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glycocheck::adapters::sanitize::SanitizingMakeWriter;
use glycocheck::adapters::{FileSessionStore, SqliteGateway};
use glycocheck::cli::{App, Cli};
use glycocheck::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(session) = cli.session {
        config.session_file = session;
    }

    // Stdout carries command output, so logs go to a file or stderr.
    let (writer, _guard) = if config.log_mode.uses_file() {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces on open below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("opening log file {}", config.log_file.display()))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::debug!(?config, "Starting glycocheck");

    let gateway = SqliteGateway::new(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    let session = FileSessionStore::new(&config.session_file);
    let app = App::new(Arc::new(gateway), Arc::new(session), config.history_limit);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app.execute(cli.command, &mut input, &mut out)?;

    Ok(())
}

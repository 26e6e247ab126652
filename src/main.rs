//! Register form - terminal registration form
//!
//! Collects personal details and an optional image, validates them against a
//! fixed schema, and encodes the image as a data URI before registering.

mod app;
mod config;
mod error;
mod form;
mod ingest;
mod platform;
mod report;
mod session;
mod submission;
mod ui;

use anyhow::{anyhow, Result};
use app::App;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let log_guard = init_logging(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("Exiting: {err:?}");
        drop(log_guard);
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to `log_file` when configured, stderr otherwise.
///
/// The returned guard flushes the file writer on drop and must outlive the app.
fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter().into());
    let registry = tracing_subscriber::registry().with(filter);

    match &config.log_file {
        Some(path) => {
            let (log_dir, file_name) = split_log_path(path)?;
            let file_appender = tracing_appender::rolling::never(log_dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(non_blocking),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
            Ok(None)
        }
    }
}

/// Split `log_file` into the directory and file name the appender expects
fn split_log_path(path: &Path) -> Result<(&Path, &OsStr)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log file {} has no file name", path.display()))?;
    let log_dir = path.parent().unwrap_or_else(|| Path::new(""));
    Ok((log_dir, file_name))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Finished ingestions are applied between events, never during one
        app.poll_ingestions();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll faster while an image is being read so its result shows promptly
        let poll_duration = if app.session.state().has_pending_ingestion() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_duration)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key).await?;
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

//! Application state and key handling for the registration form

use crate::config::AppConfig;
use crate::form::{Field, Gender, IngestionApplied};
use crate::ingest::{IngestionPipeline, RawFile};
use crate::platform::SUBMIT_MODIFIER;
use crate::report::{ReportSink, TracingReporter};
use crate::session::{CompletedIngestion, FormSession};
use crate::submission::SubmissionOutcome;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Main application struct
pub struct App {
    /// The form session being edited
    pub session: FormSession,
    config: AppConfig,
    /// Field that currently has focus
    pub focus: Field,
    /// Path typed into the image field, selected on Enter
    pub image_input: String,
    /// Outcome of the last action, shown in the status bar
    pub status_message: Option<String>,
    ingest_tx: UnboundedSender<CompletedIngestion>,
    ingest_rx: UnboundedReceiver<CompletedIngestion>,
    quit: bool,
}

impl App {
    /// Create a new App reading images from disk and reporting through tracing
    pub fn new(config: AppConfig) -> Self {
        let pipeline = IngestionPipeline::filesystem().with_timeout(config.ingest_timeout());
        let reporter: Arc<dyn ReportSink> = Arc::new(TracingReporter);
        Self::with_session(FormSession::new(pipeline, reporter), config)
    }

    pub fn with_session(session: FormSession, config: AppConfig) -> Self {
        let (ingest_tx, ingest_rx) = mpsc::unbounded_channel();
        Self {
            session,
            config,
            focus: Field::FirstName,
            image_input: String::new(),
            status_message: None,
            ingest_tx,
            ingest_rx,
            quit: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(SUBMIT_MODIFIER) {
            match key.code {
                KeyCode::Char('s') => self.submit().await,
                KeyCode::Char('q') | KeyCode::Char('c') => self.quit = true,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            _ => match self.focus {
                Field::Gender => self.handle_gender_key(key.code),
                Field::Image => self.handle_image_key(key).await,
                field => self.handle_text_key(field, key),
            },
        }
        Ok(())
    }

    /// Apply every ingestion that has finished since the last call
    pub fn poll_ingestions(&mut self) {
        while let Ok(completed) = self.ingest_rx.try_recv() {
            let name = completed.ticket.file.name.clone();
            match self.session.apply_ingestion(completed) {
                IngestionApplied::Stored => {
                    self.status_message = Some(format!("Loaded {name}"));
                }
                IngestionApplied::Failed(err) => {
                    self.status_message = Some(format!("Error parsing file: {err}"));
                }
                IngestionApplied::Stale => {}
            }
        }
    }

    /// Leave the focused field (blurring it) and move `step` fields along
    fn move_focus(&mut self, step: isize) {
        self.session.handle_blur(self.focus);
        let count = Field::ALL.len() as isize;
        let next = (self.focus.index() as isize + step).rem_euclid(count);
        self.focus = Field::ALL[next as usize];
    }

    fn handle_text_key(&mut self, field: Field, key: KeyEvent) {
        let mut value = self.session.state().values().text(field).to_string();
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Enter => {
                self.move_focus(1);
                return;
            }
            _ => return,
        }
        self.session.handle_change(field, &value);
    }

    fn handle_gender_key(&mut self, code: KeyCode) {
        let current = self.session.state().values().gender;
        let next = match code {
            KeyCode::Right | KeyCode::Char(' ') => current.next(),
            KeyCode::Left => current.prev(),
            KeyCode::Char('m') => Gender::Male,
            KeyCode::Char('f') => Gender::Female,
            KeyCode::Backspace => Gender::Unset,
            KeyCode::Enter => {
                self.move_focus(1);
                return;
            }
            _ => return,
        };
        self.session.handle_change(Field::Gender, next.as_str());
    }

    async fn handle_image_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.image_input.push(c)
            }
            KeyCode::Backspace => {
                self.image_input.pop();
            }
            KeyCode::Delete => {
                self.image_input.clear();
                self.session.handle_change(Field::Image, "");
            }
            KeyCode::Enter if self.image_input.trim().is_empty() => self.move_focus(1),
            KeyCode::Enter => self.select_image().await,
            _ => {}
        }
    }

    /// Select the typed path and start ingesting it in the background
    async fn select_image(&mut self) {
        let path = self.config.resolve_image_path(&self.image_input);
        let file = RawFile::from_path(path).await;
        let Some(ticket) = self.session.select_file(Field::Image, file) else {
            return;
        };
        self.status_message = Some(format!("Reading {}...", ticket.file.name));

        let pipeline = self.session.pipeline().clone();
        let tx = self.ingest_tx.clone();
        tokio::spawn(async move {
            let result = pipeline.parse(&ticket.file).await;
            if tx.send(CompletedIngestion { ticket, result }).is_err() {
                tracing::debug!("Form closed before ingestion finished");
            }
        });
    }

    async fn submit(&mut self) {
        self.status_message = match self.session.submit().await {
            None => {
                let count = self.session.state().errors().len();
                Some(format!("Fix {count} field(s) before registering"))
            }
            Some(SubmissionOutcome::Submitted(registration)) => {
                self.image_input.clear();
                self.focus = Field::FirstName;
                Some(format!(
                    "Registered {} {}",
                    registration.values.first_name, registration.values.last_name
                ))
            }
            Some(SubmissionOutcome::Failed(err)) => {
                self.image_input.clear();
                self.focus = Field::FirstName;
                Some(format!("Submission failed: {err}; form reset"))
            }
        };
    }
}

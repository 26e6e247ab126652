//! UI module for rendering the registration form

mod field_renderer;

use crate::app::App;
use crate::form::Field;
use crate::ingest::ImageValue;
use crate::platform::{QUIT_SHORTCUT, SUBMIT_SHORTCUT};
use field_renderer::{draw_field, FieldView};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Height of one bordered field
const FIELD_HEIGHT: u16 = 3;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(Field::ALL.iter().map(|_| Constraint::Length(FIELD_HEIGHT)));
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(centered(area, 60));

    let title = Paragraph::new(Line::from(Span::styled(
        "Register form",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, chunks[0]);

    for (idx, field) in Field::ALL.into_iter().enumerate() {
        draw_form_field(frame, chunks[idx + 1], app, field);
    }

    draw_status_bar(frame, chunks[chunks.len() - 1], app);
}

fn draw_form_field(frame: &mut Frame, area: Rect, app: &App, field: Field) {
    let state = app.session.state();
    let values = state.values();
    let is_active = app.focus == field;

    let (value, placeholder, hint) = match field {
        Field::Password => ("•".repeat(values.password.chars().count()), "Insert password", None),
        Field::Gender => {
            let hint = is_active.then_some("←/→");
            (values.gender.label().to_string(), "", hint)
        }
        Field::Image => {
            let hint = if state.is_ingesting(field) {
                Some("reading...")
            } else if matches!(values.image, Some(ImageValue::Parsed(_))) {
                Some("loaded")
            } else {
                None
            };
            let value = if is_active || values.image.is_none() {
                app.image_input.clone()
            } else {
                values.image.as_ref().map(|i| i.name().to_string()).unwrap_or_default()
            };
            (value, "Type a path, Enter to select, Del to clear", hint)
        }
        Field::FirstName => (values.first_name.clone(), "Insert firstname", None),
        Field::LastName => (values.last_name.clone(), "Insert lastname", None),
        Field::Email => (values.email.clone(), "Insert email", None),
        Field::DateBirth => (values.date_birth.clone(), "YYYY-MM-DD", None),
    };

    let view = FieldView {
        label: field.label(),
        value,
        placeholder,
        is_active,
        error: state.visible_error(field),
        hint,
    };
    draw_field(frame, area, &view);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let help = format!("Tab/Shift+Tab move • {SUBMIT_SHORTCUT} register • {QUIT_SHORTCUT} quit");
    let line = match &app.status_message {
        Some(message) => Line::from(vec![
            Span::styled(message.clone(), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(help, Style::default().fg(Color::DarkGray)),
        ]),
        None => Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Horizontally centre a column of at most `width` cells
fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::ingest::{IngestionPipeline, MockFileReader};
    use crate::report::MockReportSink;
    use crate::session::FormSession;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        let session = FormSession::new(
            IngestionPipeline::new(Arc::new(MockFileReader::new())),
            Arc::new(MockReportSink::new()),
        );
        App::with_session(session, AppConfig::default())
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_every_label() {
        let screen = render(&app());
        for field in Field::ALL {
            assert!(screen.contains(field.label()), "missing {}", field.label());
        }
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut app = app();
        assert!(!render(&app).contains("First name is required"));
        app.session.handle_blur(Field::FirstName);
        assert!(render(&app).contains("First name is required"));
    }

    #[test]
    fn test_password_is_masked() {
        let mut app = app();
        app.session.handle_change(Field::Password, "secret1");
        assert!(!render(&app).contains("secret1"));
    }

    #[test]
    fn test_centered_narrow_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered(area, 60), area);
        assert_eq!(centered(Rect::new(0, 0, 100, 10), 60).x, 20);
    }
}

//! Field rendering utilities for the registration form

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Everything needed to draw one field
pub struct FieldView<'a> {
    pub label: &'a str,
    pub value: String,
    pub placeholder: &'a str,
    pub is_active: bool,
    /// Validation message, already filtered to what should be visible
    pub error: Option<&'a str>,
    /// Right-aligned hint inside the border (ingestion progress, key help)
    pub hint: Option<&'a str>,
}

/// Draw a bordered single-line field with its visible error as the bottom title
pub fn draw_field(frame: &mut Frame, area: Rect, view: &FieldView) {
    let border_style = match (view.is_active, view.error.is_some()) {
        (_, true) => Style::default().fg(Color::Red),
        (true, false) => Style::default().fg(Color::Cyan),
        (false, false) => Style::default().fg(Color::DarkGray),
    };

    let cursor = if view.is_active { "▌" } else { "" };
    let mut spans = if view.value.is_empty() {
        vec![Span::styled(
            view.placeholder.to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        vec![Span::styled(view.value.clone(), Style::default().fg(Color::White))]
    };
    spans.push(Span::styled(cursor, Style::default().fg(Color::Cyan)));

    let mut block = Block::default()
        .title(format!(" {} ", view.label))
        .borders(Borders::ALL)
        .border_style(border_style);
    if let Some(error) = view.error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(hint) = view.hint {
        block = block.title(
            Line::from(Span::styled(
                format!(" {hint} "),
                Style::default().fg(Color::Yellow),
            ))
            .right_aligned(),
        );
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

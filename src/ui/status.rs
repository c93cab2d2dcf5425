use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::Mode;

use super::render_controls;

pub fn render_loading(frame: &mut Frame, area: Rect, mode: &Mode) {
    let what = match mode {
        Mode::Quiz { subject: Some(subject) } => format!("Loading {} questions...", subject),
        Mode::Quiz { subject: None } => "Loading questions...".to_string(),
        Mode::Mock => "Assembling your mock exam...".to_string(),
    };
    render_card(frame, area, "PLEASE WAIT", Color::Cyan, &what, "esc cancel  ·  q quit");
}

pub fn render_error(frame: &mut Frame, area: Rect, message: &str, retryable: bool) {
    let hint = if retryable {
        "r retry  ·  b menu  ·  q quit"
    } else {
        "b menu  ·  q quit"
    };
    render_card(frame, area, "SOMETHING WENT WRONG", Color::Red, message, hint);
}

pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    render_card(
        frame,
        area,
        "NOTHING HERE YET",
        Color::Yellow,
        message,
        "r try again  ·  b menu  ·  q quit",
    );
}

fn render_card(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    color: Color,
    message: &str,
    hint: &str,
) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);
    let card = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Percentage(60),
        Constraint::Fill(1),
    ])
    .split(chunks[1])[1];

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(title.to_string(), Style::default().fg(color).bold())),
        Line::from(""),
        Line::from(message.to_string().fg(Color::Gray)),
    ];
    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, card);
    render_controls(frame, chunks[3], hint);
}

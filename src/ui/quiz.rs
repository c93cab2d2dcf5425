use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::app::{App, Screen};
use crate::models::{capitalize, Question, OPTION_LABELS};
use crate::session::ShuffledOptions;

use super::{mock, render_controls};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some((position, question)) = app.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    let total = match app.screen {
        Screen::Mock => app.mock().map_or(0, |s| s.total()),
        _ => app.quiz().map_or(0, |s| s.total()),
    };
    render_header(frame, chunks[0], app, position, total, question);
    render_question_text(frame, chunks[1], &question.text);

    if let Some(options) = app.shuffled_options() {
        render_options(frame, chunks[2], question, options, app.selected_option());
    }

    let hint = match app.screen {
        Screen::Mock => "j/k or a-d choose  ·  enter answer  ·  s stop exam  ·  esc abandon",
        _ => "j/k or a-d choose  ·  enter answer  ·  esc menu  ·  q quit",
    };
    render_controls(frame, chunks[3], hint);
}

fn render_header(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    position: usize,
    total: usize,
    question: &Question,
) {
    let columns = Layout::horizontal([Constraint::Fill(1), Constraint::Length(12)]).split(area);

    let left = match (&app.screen, app.mock()) {
        (Screen::Mock, Some(session)) => mock::timer_line(session),
        _ => Line::from(Span::styled(
            capitalize(&question.subject),
            Style::default().fg(Color::Cyan),
        )),
    };
    frame.render_widget(Paragraph::new(left), columns[0]);

    let progress = Paragraph::new(format!("{}/{}", position + 1, total))
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(progress, columns[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    options: &ShuffledOptions,
    selected: usize,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(OPTION_LABELS.len() * 2);

    for (display, _, text) in options.iter(question) {
        let is_selected = display == selected;
        let style = if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", OPTION_LABELS[display]), style),
            Span::styled(text.to_string(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

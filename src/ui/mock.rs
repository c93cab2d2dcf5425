use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::models::{capitalize, format_clock};
use crate::session::MockExamSession;

use super::{grade_color, render_controls, result::encouragement};

/// Below this the clock turns red.
const LOW_TIME_SECS: u64 = 10 * 60;

pub fn timer_line(session: &MockExamSession) -> Line<'static> {
    let remaining = session.remaining_secs();
    let color = if remaining < LOW_TIME_SECS {
        Color::Red
    } else {
        Color::Green
    };
    Line::from(vec![
        Span::styled("MOCK EXAM  ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format_clock(remaining), Style::default().fg(color).bold()),
        Span::styled(" left", Style::default().fg(Color::DarkGray)),
    ])
}

pub fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.mock() else {
        return;
    };
    let score = session.score().unwrap_or(0);
    let total = session.total();
    let percentage = session.percentage().unwrap_or(0);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "MOCK EXAM COMPLETE",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({}%)", score, total, percentage),
            Style::default().fg(grade_color(percentage)).bold(),
        )),
        Line::from(
            format!(
                "answered {} of {}  ·  time spent {}",
                session.answers().len(),
                total,
                format_clock(session.elapsed_secs())
            )
            .fg(Color::DarkGray),
        ),
        Line::from(encouragement(score, total, percentage).fg(Color::Gray)),
        Line::from(""),
    ];
    let summary = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(summary, chunks[1]);

    render_breakdown(frame, chunks[2], session, app.result_scroll());
    render_controls(
        frame,
        chunks[3],
        "j/k scroll  ·  r new exam  ·  h history  ·  b menu  ·  q quit",
    );
}

fn render_breakdown(frame: &mut Frame, area: Rect, session: &MockExamSession, scroll: usize) {
    let mut lines = vec![Line::from(Span::styled(
        "BY SUBJECT",
        Style::default().fg(Color::Cyan),
    ))];

    lines.extend(session.breakdown().iter().skip(scroll).map(|(subject, tally)| {
        let pct = tally.percentage();
        Line::from(vec![
            Span::styled(
                format!("{:<20}", capitalize(subject)),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("{:>3} / {:<3}", tally.correct, tally.total),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(format!("{:>5}%", pct), Style::default().fg(grade_color(pct))),
        ])
    }));

    let widget = Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(2)));
    frame.render_widget(widget, area);
}

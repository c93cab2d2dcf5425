use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Tabs},
};

use crate::app::App;
use crate::history::{ClearScope, HistoryFilter};
use crate::models::{capitalize, format_clock, HistoryEntry};

use super::{grade_color, render_controls};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let filter = app.history_filter();
    render_tabs(frame, chunks[1], filter);
    render_entries(frame, chunks[2], app, filter);
    render_footer(frame, chunks[3], app, filter);

    let hint = if app.pending_clear().is_some() {
        "y confirm  ·  any other key cancel"
    } else {
        "tab switch  ·  j/k scroll  ·  c clear  ·  b menu  ·  q quit"
    };
    render_controls(frame, chunks[4], hint);
}

fn render_tabs(frame: &mut Frame, area: Rect, filter: HistoryFilter) {
    let selected = HistoryFilter::TABS
        .iter()
        .position(|tab| *tab == filter)
        .unwrap_or(0);
    let tabs = Tabs::new(HistoryFilter::TABS.iter().map(|tab| tab.title()))
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(tabs, area);
}

fn render_entries(frame: &mut Frame, area: Rect, app: &App, filter: HistoryFilter) {
    let lines: Vec<Line> = app
        .history_view()
        .filtered(filter)
        .skip(app.history_scroll())
        .flat_map(entry_lines)
        .collect();

    if lines.is_empty() {
        let message = match filter {
            HistoryFilter::All => "No attempts yet. Take a quiz or a mock exam to get started.",
            HistoryFilter::Quiz => "No quizzes taken yet.",
            HistoryFilter::Mock => "No mock exams taken yet.",
        };
        let widget = Paragraph::new(vec![Line::from(""), Line::from(message.fg(Color::DarkGray))])
            .alignment(Alignment::Center);
        frame.render_widget(widget, area);
        return;
    }

    let widget = Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(widget, area);
}

fn entry_lines(entry: &HistoryEntry) -> Vec<Line<'static>> {
    let mut lines = vec![entry_line(entry)];
    if let HistoryEntry::Mock(record) = entry {
        if !record.breakdown.is_empty() {
            let parts: Vec<String> = record
                .breakdown
                .iter()
                .map(|(subject, tally)| {
                    format!("{} {}/{}", capitalize(subject), tally.correct, tally.total)
                })
                .collect();
            lines.push(Line::from(Span::styled(
                format!("                    {}", parts.join("  ·  ")),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines
}

fn entry_line(entry: &HistoryEntry) -> Line<'static> {
    let pct = entry.percentage();
    let detail = match entry {
        HistoryEntry::Mock(record) => format!("  {}", format_clock(record.elapsed_secs)),
        HistoryEntry::Quiz(_) => String::new(),
    };
    Line::from(vec![
        Span::styled(
            entry.timestamp().format("%Y-%m-%d %H:%M  ").to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{:<24}", entry.title()), Style::default().fg(Color::White)),
        Span::styled(
            format!("{:>3} / {:<3}", entry.score(), entry.total()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format!("{:>5}%", pct), Style::default().fg(grade_color(pct))),
        Span::styled(detail, Style::default().fg(Color::DarkGray)),
    ])
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, filter: HistoryFilter) {
    let line = if let Some(scope) = app.pending_clear() {
        let target = match scope {
            ClearScope::All => "all history".to_string(),
            ClearScope::Kind(kind) => format!("{} history", kind.label()),
        };
        Line::from(Span::styled(
            format!("Clear {}? This cannot be undone. (y/n)", target),
            Style::default().fg(Color::Yellow).bold(),
        ))
    } else if let Some(notice) = app.notice() {
        Line::from(notice.to_string().fg(Color::Green))
    } else {
        let summary = app.history_view().summary(filter);
        if summary.attempts == 0 {
            Line::from("")
        } else {
            Line::from(vec![
                Span::styled(
                    format!("{} attempts  ·  average ", summary.attempts),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{}%", summary.average_percentage),
                    Style::default().fg(grade_color(summary.average_percentage)),
                ),
                Span::styled(
                    format!("  ·  best {}%", summary.best_percentage),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
    };

    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{App, MenuItem};

use super::render_controls;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let menu_height = app.menu().len() as u16 + 2;
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Length(menu_height),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let columns = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(44),
        Constraint::Fill(1),
    ]);

    render_title(frame, columns.split(chunks[1])[1]);
    render_menu(frame, columns.split(chunks[2])[1], app);
    render_controls(
        frame,
        chunks[4],
        "j/k navigate  ·  enter start  ·  m mock exam  ·  h history  ·  q quit",
    );
}

fn render_title(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "LAT PREP",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from("Practice quizzes · Timed mock exams".fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_menu(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .menu()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let is_selected = index == app.menu_selected();
            let style = match (is_selected, item) {
                (true, _) => Style::default().fg(Color::Cyan).bold(),
                (false, MenuItem::Quiz { .. }) => Style::default().fg(Color::Gray),
                (false, _) => Style::default().fg(Color::White),
            };
            let marker = if is_selected { ">" } else { " " };
            Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(item.label().to_string(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

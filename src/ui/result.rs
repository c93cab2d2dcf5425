use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::OPTION_LABELS;
use crate::session::AnswerResult;

use super::{grade_color, render_controls, truncate};

const QUESTION_PREVIEW_LENGTH: usize = 70;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.quiz() else {
        return;
    };
    let score = session.score().unwrap_or(0);
    let total = session.total();
    let percentage = session.percentage().unwrap_or(0);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], score, total, percentage);
    render_review(frame, chunks[2], &session.review(), app.result_scroll());
    render_controls(
        frame,
        chunks[3],
        "j/k scroll  ·  r try again  ·  h history  ·  b menu  ·  q quit",
    );
}

/// Closing line under the score.
pub(super) fn encouragement(score: usize, total: usize, percentage: u8) -> &'static str {
    if total > 0 && score == total {
        "Perfect score! Outstanding work."
    } else if percentage >= 70 {
        "Great job! Keep it up."
    } else {
        "Keep studying, you'll get there."
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, score: usize, total: usize, percentage: u8) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "QUIZ COMPLETE",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({}%)", score, total, percentage),
            Style::default().fg(grade_color(percentage)).bold(),
        )),
        Line::from(encouragement(score, total, percentage).fg(Color::Gray)),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_review(frame: &mut Frame, area: Rect, review: &[AnswerResult<'_>], scroll: usize) {
    let mut lines: Vec<Line> = Vec::new();
    let mut offset = 0;

    for (index, result) in review.iter().enumerate() {
        if index == scroll {
            offset = lines.len();
        }
        let (symbol, color) = if result.is_correct {
            ("+", Color::Green)
        } else {
            ("-", Color::Red)
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
            Span::styled(
                format!("{:2}. ", index + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                truncate(&result.question.text, QUESTION_PREVIEW_LENGTH),
                Style::default().fg(Color::White),
            ),
        ]));

        let chosen = match result.chosen.and_then(|c| result.question.option(c).map(|t| (c, t))) {
            Some((c, text)) => format!("{}. {}", option_label(c), text),
            None => "not answered".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled("       your answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(chosen, Style::default().fg(color)),
        ]));

        if !result.is_correct {
            let correct = result.question.correct_index;
            lines.push(Line::from(vec![
                Span::styled("       correct:     ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}. {}", option_label(correct), result.question.correct_option()),
                    Style::default().fg(Color::Green),
                ),
            ]));
        }

        if let Some(explanation) = &result.question.explanation {
            lines.push(Line::from(Span::styled(
                format!("       {}", explanation),
                Style::default().fg(Color::Gray).italic(),
            )));
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((offset as u16, 0));
    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    OPTION_LABELS.get(index).copied().unwrap_or('?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encouragement_bands() {
        assert_eq!(encouragement(5, 5, 100), "Perfect score! Outstanding work.");
        assert_eq!(encouragement(7, 10, 70), "Great job! Keep it up.");
        assert_eq!(encouragement(2, 3, 67), "Keep studying, you'll get there.");
        assert_eq!(encouragement(0, 0, 0), "Keep studying, you'll get there.");
    }
}

mod history;
mod mock;
mod quiz;
mod result;
mod status;
mod welcome;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.screen {
        Screen::Menu => welcome::render(frame, area, app),
        Screen::Loading(mode) => status::render_loading(frame, area, mode),
        Screen::Quiz | Screen::Mock => quiz::render(frame, area, app),
        Screen::QuizResult => result::render(frame, area, app),
        Screen::MockResult => mock::render_result(frame, area, app),
        Screen::History => history::render(frame, area, app),
        Screen::Error {
            message, retryable, ..
        } => status::render_error(frame, area, message, *retryable),
        Screen::Empty { message, .. } => status::render_empty(frame, area, message),
    }
}

fn grade_color(percentage: u8) -> Color {
    match percentage {
        90..=u8::MAX => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_controls(frame: &mut Frame, area: Rect, hint: &str) {
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(grade_color(100), Color::Green);
        assert_eq!(grade_color(90), Color::Green);
        assert_eq!(grade_color(89), Color::Cyan);
        assert_eq!(grade_color(70), Color::Cyan);
        assert_eq!(grade_color(50), Color::Yellow);
        assert_eq!(grade_color(49), Color::Red);
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("اردو زبان", 4), "اردو...");
    }
}

//! # lat-prep
//!
//! Terminal practice quizzes and timed mock exams for the LAT entrance test.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lat_prep::{AppConfig, Quiz, QuizError, Start};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let config = AppConfig::load(None)?;
//!     let mut quiz = Quiz::from_config(config)?;
//!     quiz.open(Start::Mock);
//!     quiz.run().await
//! }
//! ```

mod app;
pub mod config;
pub mod data;
mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod session;
pub mod storage;
pub mod terminal;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub use app::{App, AppEvent, MenuItem, Mode, Screen, Start};
pub use config::AppConfig;
pub use data::{
    load_questions_from_json, JsonQuestionStore, MemoryQuestionStore, QuestionQuery, QuestionStore,
};
pub use error::{ConfigError, FetchError, QuizError, Result, StorageError};
pub use history::{ClearScope, HistoryFilter, HistoryStore, HistoryView};
pub use models::{HistoryEntry, HistoryKind, MockExamRecord, Question, QuizRecord};

use storage::{FileStore, MemoryStore};

const INPUT_POLL: Duration = Duration::from_millis(50);

/// History backed by files in `config.data_dir()`, or by memory when that
/// directory is unusable.
pub fn open_history_store(config: &AppConfig) -> HistoryStore {
    let opened = config
        .data_dir()
        .map_err(QuizError::from)
        .and_then(|dir| FileStore::open(dir).map_err(QuizError::from));

    match opened {
        Ok(store) => HistoryStore::new(Arc::new(store)),
        Err(e) => {
            warn!(error = %e, "history will not be saved between runs");
            HistoryStore::new(Arc::new(MemoryStore::new()))
        }
    }
}

/// A prep session that can be run in the terminal.
pub struct Quiz {
    app: App,
    events: mpsc::UnboundedReceiver<AppEvent>,
}

impl Quiz {
    pub fn new(config: AppConfig, store: Arc<dyn QuestionStore>, history: HistoryStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            app: App::new(config, store, history, tx),
            events: rx,
        }
    }

    /// Questions from `config.questions_path`, history from the data directory.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(JsonQuestionStore::new(config.questions_path.clone()));
        let history = open_history_store(&config);
        Ok(Self::new(config, store, history))
    }

    /// Picks the first screen. Must be called inside a tokio runtime.
    pub fn open(&mut self, start: Start) {
        self.app.open(start);
    }

    /// Takes over the terminal until the user quits.
    pub async fn run(mut self) -> Result<()> {
        let mut term = terminal::init()?;
        let result = run_event_loop(&mut term, &mut self.app, &mut self.events).await;
        terminal::restore()?;
        info!("session closed");
        result
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

async fn run_event_loop(
    terminal: &mut terminal::AppTerminal,
    app: &mut App,
    events: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        if !event::poll(INPUT_POLL)? {
            tokio::task::yield_now().await;
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if handle_input(app, key.code) {
                break;
            }
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.screen {
        Screen::Menu => handle_menu_input(app, key),
        Screen::Loading(_) => handle_loading_input(app, key),
        Screen::Quiz | Screen::Mock => handle_question_input(app, key),
        Screen::QuizResult | Screen::MockResult => handle_result_input(app, key),
        Screen::History => handle_history_input(app, key),
        Screen::Error { .. } | Screen::Empty { .. } => handle_status_input(app, key),
    }
}

fn handle_menu_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_menu_item(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_menu_item(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_menu_item(),
        KeyCode::Char('m') => app.start_mock(),
        KeyCode::Char('h') => app.open_history(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_loading_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Esc | KeyCode::Char('b') => app.back_to_menu(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_question_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Char(c @ ('a'..='d' | 'A'..='D')) => {
            app.select_option((c.to_ascii_lowercase() as u8 - b'a') as usize);
        }
        KeyCode::Char(c @ '1'..='4') => app.select_option((c as u8 - b'1') as usize),
        KeyCode::Enter | KeyCode::Char(' ') => app.submit_answer(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.stop_exam(),
        KeyCode::Esc => app.back_to_menu(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_result_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        KeyCode::Char('h') => app.open_history(),
        KeyCode::Esc | KeyCode::Char('b') => app.back_to_menu(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_history_input(app: &mut App, key: KeyCode) -> bool {
    if app.pending_clear().is_some() {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.resolve_clear(true),
            _ => app.resolve_clear(false),
        }
        return false;
    }

    match key {
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_history_tab(),
        KeyCode::Char('1') => app.set_history_filter(HistoryFilter::All),
        KeyCode::Char('2') => app.set_history_filter(HistoryFilter::Quiz),
        KeyCode::Char('3') => app.set_history_filter(HistoryFilter::Mock),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_history_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_history_up(),
        KeyCode::Char('c') => {
            if !app.history_view().is_empty() {
                app.request_clear(app.history_filter().clear_scope());
            }
        }
        KeyCode::Esc | KeyCode::Char('b') => app.back_to_menu(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_status_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => app.retry(),
        KeyCode::Esc | KeyCode::Char('b') => app.back_to_menu(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

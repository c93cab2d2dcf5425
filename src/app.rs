use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{AppConfig, SubjectEntry};
use crate::data::QuestionStore;
use crate::error::{QuizError, Result};
use crate::history::{ClearScope, HistoryFilter, HistoryStore, HistoryView};
use crate::models::{Question, NUM_OPTIONS};
use crate::session::{
    assemble_exam, AnswerOutcome, Countdown, MockExamSession, OptionShuffler, QuizSession,
    ShuffledOptions, Tick, TickOutcome,
};

/// Which kind of attempt a loading, error or empty screen belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Quiz { subject: Option<String> },
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Loading(Mode),
    Quiz,
    QuizResult,
    Mock,
    MockResult,
    History,
    Error {
        mode: Mode,
        message: String,
        retryable: bool,
    },
    Empty {
        mode: Mode,
        message: String,
    },
}

/// Where the app opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Start {
    #[default]
    Menu,
    Quiz(Option<String>),
    Mock,
    History(HistoryFilter),
}

/// Messages delivered to the event loop from background tasks.
///
/// Load results carry the id of the request that produced them; only the
/// latest request is honoured.
#[derive(Debug)]
pub enum AppEvent {
    QuizLoaded {
        request: u64,
        result: Result<Vec<Question>>,
    },
    MockLoaded {
        request: u64,
        result: Result<Vec<Question>>,
    },
    Tick,
}

impl From<Tick> for AppEvent {
    fn from(_: Tick) -> Self {
        AppEvent::Tick
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Quiz { label: String, subject: Option<String> },
    Mock,
    History,
}

impl MenuItem {
    pub fn label(&self) -> &str {
        match self {
            MenuItem::Quiz { label, .. } => label,
            MenuItem::Mock => "Mock Exam",
            MenuItem::History => "Study History",
        }
    }
}

pub struct App {
    pub screen: Screen,
    config: AppConfig,
    store: Arc<dyn QuestionStore>,
    history: HistoryStore,
    events: mpsc::UnboundedSender<AppEvent>,
    rng: StdRng,
    shuffler: OptionShuffler<StdRng>,
    menu: Vec<MenuItem>,
    menu_selected: usize,
    quiz: Option<QuizSession>,
    mock: Option<MockExamSession>,
    selected_option: usize,
    result_scroll: usize,
    history_view: HistoryView,
    history_filter: HistoryFilter,
    history_scroll: usize,
    pending_clear: Option<ClearScope>,
    notice: Option<String>,
    request: u64,
}

impl App {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn QuestionStore>,
        history: HistoryStore,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let shuffler = OptionShuffler::new(StdRng::seed_from_u64(rng.r#gen()));
        let menu = build_menu(&config.subjects);

        Self {
            screen: Screen::Menu,
            config,
            store,
            history,
            events,
            rng,
            shuffler,
            menu,
            menu_selected: 0,
            quiz: None,
            mock: None,
            selected_option: 0,
            result_scroll: 0,
            history_view: HistoryView::default(),
            history_filter: HistoryFilter::All,
            history_scroll: 0,
            pending_clear: None,
            notice: None,
            request: 0,
        }
    }

    pub fn open(&mut self, start: Start) {
        match start {
            Start::Menu => self.back_to_menu(),
            Start::Quiz(subject) => self.start_quiz(subject),
            Start::Mock => self.start_mock(),
            Start::History(filter) => {
                self.open_history();
                self.history_filter = filter;
            }
        }
    }

    // ---- menu ----

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn menu_selected(&self) -> usize {
        self.menu_selected
    }

    pub fn select_next_menu_item(&mut self) {
        self.menu_selected = (self.menu_selected + 1) % self.menu.len();
    }

    pub fn select_previous_menu_item(&mut self) {
        self.menu_selected = (self.menu_selected + self.menu.len() - 1) % self.menu.len();
    }

    pub fn activate_menu_item(&mut self) {
        match self.menu.get(self.menu_selected).cloned() {
            Some(MenuItem::Quiz { subject, .. }) => self.start_quiz(subject),
            Some(MenuItem::Mock) => self.start_mock(),
            Some(MenuItem::History) => self.open_history(),
            None => {}
        }
    }

    /// Abandons any running attempt without recording it.
    pub fn back_to_menu(&mut self) {
        self.next_request();
        self.quiz = None;
        self.mock = None;
        self.pending_clear = None;
        self.screen = Screen::Menu;
    }

    // ---- loading ----

    /// Invalidates any fetch still in flight.
    fn next_request(&mut self) -> u64 {
        self.request += 1;
        self.request
    }

    pub fn start_quiz(&mut self, subject: Option<String>) {
        let mut session = QuizSession::new(subject.clone(), self.history.clone());
        session.begin_loading();
        self.quiz = Some(session);
        self.mock = None;
        self.shuffler.reset();

        let request = self.next_request();
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let query_subject = subject.clone();
        tokio::task::spawn_blocking(move || {
            let result = QuizSession::fetch(store.as_ref(), query_subject.as_deref());
            let _ = events.send(AppEvent::QuizLoaded { request, result });
        });

        self.screen = Screen::Loading(Mode::Quiz { subject });
    }

    pub fn start_mock(&mut self) {
        let mut session =
            MockExamSession::new(self.config.exam.duration_secs, self.history.clone());
        session.begin_loading();
        self.mock = Some(session);
        self.quiz = None;
        self.shuffler.reset();

        let request = self.next_request();
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let weights = self.config.exam.weights.clone();
        let seed: u64 = self.rng.r#gen();
        tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = assemble_exam(store.as_ref(), &weights, &mut rng);
            let _ = events.send(AppEvent::MockLoaded { request, result });
        });

        self.screen = Screen::Loading(Mode::Mock);
    }

    /// Re-runs the fetch behind an error or empty screen.
    pub fn retry(&mut self) {
        let mode = match &self.screen {
            Screen::Error { mode, .. } | Screen::Empty { mode, .. } => mode.clone(),
            _ => return,
        };
        match mode {
            Mode::Quiz { subject } => self.start_quiz(subject),
            Mode::Mock => self.start_mock(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.screen, Screen::Loading(_))
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QuizLoaded { request, result } => self.on_quiz_loaded(request, result),
            AppEvent::MockLoaded { request, result } => self.on_mock_loaded(request, result),
            AppEvent::Tick => self.on_tick(),
        }
    }

    fn on_quiz_loaded(&mut self, request: u64, result: Result<Vec<Question>>) {
        let Screen::Loading(mode @ Mode::Quiz { .. }) = &self.screen else {
            debug!(request, "dropping stale quiz load");
            return;
        };
        if request != self.request {
            debug!(request, current = self.request, "dropping superseded quiz load");
            return;
        }
        let mode = mode.clone();
        let Some(session) = self.quiz.as_mut() else {
            return;
        };

        match result.and_then(|questions| session.start(questions)) {
            Ok(()) => {
                self.reset_question_view();
                self.screen = Screen::Quiz;
            }
            Err(e) => {
                session.abort_loading();
                self.show_error(mode, e);
            }
        }
    }

    fn on_mock_loaded(&mut self, request: u64, result: Result<Vec<Question>>) {
        if self.screen != Screen::Loading(Mode::Mock) || request != self.request {
            debug!(request, current = self.request, "dropping stale mock exam load");
            return;
        }
        let Some(session) = self.mock.as_mut() else {
            return;
        };

        match result.and_then(|questions| session.start(questions)) {
            Ok(()) => {
                session.attach_countdown(Countdown::every_second(self.events.clone()));
                self.reset_question_view();
                self.screen = Screen::Mock;
            }
            Err(e) => {
                session.abort_loading();
                self.show_error(Mode::Mock, e);
            }
        }
    }

    fn on_tick(&mut self) {
        let Some(session) = self.mock.as_mut() else {
            return;
        };
        if session.tick() == TickOutcome::Expired {
            self.result_scroll = 0;
            self.screen = Screen::MockResult;
        }
    }

    fn show_error(&mut self, mode: Mode, error: QuizError) {
        warn!(error = %error, "could not load questions");
        self.screen = if error.is_empty_result() {
            Screen::Empty {
                mode,
                message: error.to_string(),
            }
        } else {
            Screen::Error {
                mode,
                retryable: error.is_retryable(),
                message: error.to_string(),
            }
        };
    }

    // ---- answering ----

    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    pub fn mock(&self) -> Option<&MockExamSession> {
        self.mock.as_ref()
    }

    /// The question on screen, with its position.
    pub fn current_question(&self) -> Option<(usize, &Question)> {
        match self.screen {
            Screen::Quiz => self
                .quiz
                .as_ref()
                .and_then(|s| s.current_question().map(|q| (s.position(), q))),
            Screen::Mock => self
                .mock
                .as_ref()
                .and_then(|s| s.current_question().map(|q| (s.position(), q))),
            _ => None,
        }
    }

    pub fn shuffled_options(&self) -> Option<&ShuffledOptions> {
        self.shuffler.current()
    }

    /// Selected display slot, not the true option index.
    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn select_next_option(&mut self) {
        self.selected_option = (self.selected_option + 1) % NUM_OPTIONS;
    }

    pub fn select_previous_option(&mut self) {
        self.selected_option = (self.selected_option + NUM_OPTIONS - 1) % NUM_OPTIONS;
    }

    pub fn select_option(&mut self, display_index: usize) {
        if display_index < NUM_OPTIONS {
            self.selected_option = display_index;
        }
    }

    pub fn submit_answer(&mut self) {
        let Some(choice) = self
            .shuffler
            .current()
            .and_then(|options| options.original_index(self.selected_option))
        else {
            return;
        };

        let outcome = match self.screen {
            Screen::Quiz => self.quiz.as_mut().map(|s| s.answer(choice)),
            Screen::Mock => self.mock.as_mut().map(|s| s.answer(choice)),
            _ => None,
        };

        match outcome {
            Some(Ok(AnswerOutcome::Next { .. })) => self.reset_question_view(),
            Some(Ok(AnswerOutcome::Finished { .. })) => {
                self.result_scroll = 0;
                self.screen = match self.screen {
                    Screen::Mock => Screen::MockResult,
                    _ => Screen::QuizResult,
                };
            }
            Some(Err(e)) => warn!(error = %e, "answer rejected"),
            None => {}
        }
    }

    pub fn stop_exam(&mut self) {
        if self.screen != Screen::Mock {
            return;
        }
        if let Some(session) = self.mock.as_mut() {
            match session.finish() {
                Ok(_) => {
                    self.result_scroll = 0;
                    self.screen = Screen::MockResult;
                }
                Err(e) => warn!(error = %e, "could not stop exam"),
            }
        }
    }

    /// Quiz: same questions again. Mock exam: a freshly drawn exam.
    pub fn restart(&mut self) {
        match self.screen {
            Screen::QuizResult => {
                if let Some(session) = self.quiz.as_mut() {
                    if session.restart().is_ok() {
                        self.shuffler.reset();
                        self.reset_question_view();
                        self.screen = Screen::Quiz;
                    }
                }
            }
            Screen::MockResult => self.start_mock(),
            _ => {}
        }
    }

    fn reset_question_view(&mut self) {
        self.selected_option = 0;
        let quiz = self
            .quiz
            .as_ref()
            .and_then(|s| s.current_question().map(|q| (s.position(), q)));
        let current = quiz.or_else(|| {
            self.mock
                .as_ref()
                .and_then(|s| s.current_question().map(|q| (s.position(), q)))
        });
        if let Some((position, question)) = current {
            self.shuffler.options_for(position, question);
        }
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn scroll_results_down(&mut self) {
        let rows = match self.screen {
            Screen::QuizResult => self.quiz.as_ref().map_or(0, QuizSession::total),
            Screen::MockResult => self.mock.as_ref().map_or(0, |s| s.breakdown().len()),
            _ => 0,
        };
        self.result_scroll = (self.result_scroll + 1).min(rows.saturating_sub(1));
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    // ---- history ----

    pub fn open_history(&mut self) {
        self.next_request();
        self.quiz = None;
        self.mock = None;
        self.history_view = HistoryView::load(&self.history);
        self.history_scroll = 0;
        self.pending_clear = None;
        self.notice = None;
        self.screen = Screen::History;
    }

    pub fn history_view(&self) -> &HistoryView {
        &self.history_view
    }

    pub fn history_filter(&self) -> HistoryFilter {
        self.history_filter
    }

    pub fn history_scroll(&self) -> usize {
        self.history_scroll
    }

    pub fn next_history_tab(&mut self) {
        self.set_history_filter(self.history_filter.next());
    }

    pub fn set_history_filter(&mut self, filter: HistoryFilter) {
        self.history_filter = filter;
        self.history_scroll = 0;
        self.pending_clear = None;
    }

    pub fn scroll_history_down(&mut self) {
        let rows = self.history_view.filtered(self.history_filter).count();
        self.history_scroll = (self.history_scroll + 1).min(rows.saturating_sub(1));
    }

    pub fn scroll_history_up(&mut self) {
        self.history_scroll = self.history_scroll.saturating_sub(1);
    }

    pub fn pending_clear(&self) -> Option<ClearScope> {
        self.pending_clear
    }

    /// Asks for confirmation before clearing.
    pub fn request_clear(&mut self, scope: ClearScope) {
        self.pending_clear = Some(scope);
    }

    pub fn resolve_clear(&mut self, confirmed: bool) {
        let Some(scope) = self.pending_clear.take() else {
            return;
        };
        if !confirmed {
            return;
        }
        self.notice = match self.history_view.clear(&self.history, scope) {
            Ok(()) => Some("History cleared".to_string()),
            Err(e) => {
                warn!(error = %e, "failed to clear history");
                Some(format!("Could not clear history: {}", e))
            }
        };
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

fn build_menu(subjects: &[SubjectEntry]) -> Vec<MenuItem> {
    let mut menu = vec![MenuItem::Quiz {
        label: "All Subjects".to_string(),
        subject: None,
    }];
    menu.extend(subjects.iter().map(|entry| MenuItem::Quiz {
        label: entry.label.clone(),
        subject: Some(entry.subject.clone()),
    }));
    menu.push(MenuItem::Mock);
    menu.push(MenuItem::History);
    menu
}

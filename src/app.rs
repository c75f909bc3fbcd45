use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use flowtype::{
    config::Config,
    leaderboard::{LeaderboardStore, ResultRecord},
    observer::{SessionEnd, SessionEvent, SessionUpdate},
    session::{ResetOptions, RunState, Session},
    text_generator::{generate_text, seed_from_clock},
};
use std::sync::mpsc::{self, Receiver};
use std::time::Instant;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// What the terminal should do after a batch of session events
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub ring_bell: bool,
}

pub struct App {
    pub config: Config,
    pub session: Session,
    pub state: AppState,
    pub last_update: Option<SessionUpdate>,
    pub last_result: Option<SessionEnd>,
    pub board: Vec<ResultRecord>,
    pub opened_at: Instant,
    events: Receiver<SessionEvent>,
    leaderboard: Box<dyn LeaderboardStore>,
}

impl App {
    pub fn new(config: Config, seed: u32, leaderboard: Box<dyn LeaderboardStore>) -> Self {
        let text = generate_text(&config.text_request(seed));
        let (tx, events) = mpsc::channel();
        let session = Session::new(config.session_config(text), tx);
        let board = leaderboard.load();

        Self {
            config,
            session,
            state: AppState::Typing,
            last_update: None,
            last_result: None,
            board,
            opened_at: Instant::now(),
            events,
            leaderboard,
        }
    }

    /// Handle one key press. Returns true when the app should exit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return true;
        }

        match self.state {
            AppState::Typing => self.on_typing_key(key),
            AppState::Results => self.on_results_key(key),
        }
        false
    }

    fn on_typing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.restart(false);
            }
            KeyCode::Tab => {
                if self.session.is_running() {
                    self.session.pause();
                } else {
                    self.session.start();
                }
            }
            KeyCode::Backspace => self.session.handle_backspace(),
            KeyCode::Enter => self.type_char('\n'),
            KeyCode::Char(c) => self.type_char(c),
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.restart(true),
            KeyCode::Char('n') => self.restart(false),
            KeyCode::Char('c') => {
                if let Err(e) = self.leaderboard.clear() {
                    error!(error = %e, "failed to clear leaderboard");
                }
                self.board = self.leaderboard.load();
            }
            _ => {}
        }
    }

    /// The first keystroke of an idle or paused test starts the clock
    fn type_char(&mut self, c: char) {
        if matches!(self.session.run_state(), RunState::Idle | RunState::Paused) {
            self.session.start();
        }
        self.session.handle_char_input(c);
    }

    /// Back to a fresh test, either on the same text or on newly generated text
    pub fn restart(&mut self, same_text: bool) {
        let text = if same_text {
            None
        } else {
            Some(generate_text(&self.config.text_request(seed_from_clock())))
        };
        self.session.reset(ResetOptions {
            text,
            mode: Some(self.config.mode),
            duration: Some(self.config.session_duration()),
        });
        self.last_result = None;
        self.state = AppState::Typing;
    }

    /// Consume everything the session emitted since the last call
    pub fn drain_session_events(&mut self) -> Feedback {
        let mut feedback = Feedback::default();
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::Update(update) => self.last_update = Some(update),
                SessionEvent::Char(c) => {
                    if !c.correct && self.config.error_sound {
                        feedback.ring_bell = true;
                    }
                }
                SessionEvent::End(end) => {
                    info!(wpm = end.stats.wpm, accuracy = end.stats.accuracy, "test complete");
                    self.board = self
                        .leaderboard
                        .add_result(ResultRecord::from_end(&end, Local::now()));
                    self.last_result = Some(end);
                    self.state = AppState::Results;
                }
            }
        }
        feedback
    }
}

use crate::clock::{Clock, SystemClock};
use crate::observer::{CharFeedback, Remaining, SessionEnd, SessionObserver, SessionUpdate};
use crate::stats::{compute_stats, Stats};
use crate::timer::Timer;
use crate::tokenize::{completed_words, word_ends};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// UI refresh cadence while running
pub const TICK_INTERVAL_MS: u64 = 100;

/// How a session decides it is over
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum Mode {
    /// `duration` is in seconds
    #[default]
    #[serde(rename = "time")]
    #[value(name = "time")]
    #[strum(serialize = "time")]
    TimeLimited,
    /// `duration` is a number of words
    #[serde(rename = "words")]
    #[value(name = "words")]
    #[strum(serialize = "words")]
    WordCountLimited,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CharState {
    #[default]
    Untyped,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub text: String,
    pub mode: Mode,
    pub duration: u32,
    pub allow_backspace: bool,
}

/// Fields to replace on reset; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetOptions {
    pub text: Option<String>,
    pub mode: Option<Mode>,
    pub duration: Option<u32>,
}

/// One typing test: tracks correctness per character, owns its timers and reports progress
/// to an observer.
pub struct Session<C: Clock = SystemClock> {
    text: Arc<str>,
    chars: Vec<char>,
    word_ends: Vec<usize>,
    mode: Mode,
    duration: u32,
    allow_backspace: bool,

    typed_states: Vec<CharState>,
    current_index: usize,
    correct_chars: usize,
    total_chars: usize,
    errors: usize,

    run_state: RunState,
    started_at: Option<u64>,
    paused_at: Option<u64>,
    finished_at: Option<u64>,
    paused_total_ms: u64,

    tick: Option<Timer>,
    deadline: Option<Timer>,

    clock: C,
    observer: Box<dyn SessionObserver>,
}

impl Session<SystemClock> {
    pub fn new(config: SessionConfig, observer: impl SessionObserver + 'static) -> Self {
        Self::with_clock(config, SystemClock::new(), observer)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(config: SessionConfig, clock: C, observer: impl SessionObserver + 'static) -> Self {
        let chars: Vec<char> = config.text.chars().collect();
        Self {
            word_ends: word_ends(&chars),
            typed_states: vec![CharState::Untyped; chars.len()],
            chars,
            text: Arc::from(config.text),
            mode: config.mode,
            duration: config.duration,
            allow_backspace: config.allow_backspace,
            current_index: 0,
            correct_chars: 0,
            total_chars: 0,
            errors: 0,
            run_state: RunState::Idle,
            started_at: None,
            paused_at: None,
            finished_at: None,
            paused_total_ms: 0,
            tick: None,
            deadline: None,
            clock,
            observer: Box::new(observer),
        }
    }

    /// Start, or resume after a pause. Elapsed time keeps accumulating from the first start.
    pub fn start(&mut self) {
        if matches!(self.run_state, RunState::Running | RunState::Finished) {
            return;
        }

        let now = self.clock.now_ms();
        match (self.started_at, self.paused_at.take()) {
            (None, _) => self.started_at = Some(now),
            (Some(_), Some(paused_at)) => self.paused_total_ms += now.saturating_sub(paused_at),
            (Some(_), None) => {}
        }
        self.run_state = RunState::Running;

        self.tick = Some(Timer::repeating(now, TICK_INTERVAL_MS));
        if self.mode == Mode::TimeLimited {
            self.deadline = Some(Timer::once(now, self.remaining_ms()));
        }
        debug!(mode = %self.mode, duration = self.duration, elapsed_ms = self.elapsed_ms(), "session running");

        self.emit_update();

        if self.chars.is_empty() {
            self.finish();
        }
    }

    pub fn pause(&mut self) {
        if self.run_state != RunState::Running {
            return;
        }
        self.paused_at = Some(self.clock.now_ms());
        self.run_state = RunState::Paused;
        self.cancel_timers();
        debug!(elapsed_ms = self.elapsed_ms(), "session paused");

        self.emit_update();
    }

    /// Back to Idle with cleared counters, optionally swapping text, mode or duration
    pub fn reset(&mut self, options: ResetOptions) {
        if let Some(text) = options.text {
            self.chars = text.chars().collect();
            self.word_ends = word_ends(&self.chars);
            self.text = Arc::from(text);
        }
        if let Some(mode) = options.mode {
            self.mode = mode;
        }
        if let Some(duration) = options.duration {
            self.duration = duration;
        }

        self.typed_states = vec![CharState::Untyped; self.chars.len()];
        self.current_index = 0;
        self.correct_chars = 0;
        self.total_chars = 0;
        self.errors = 0;
        self.run_state = RunState::Idle;
        self.started_at = None;
        self.paused_at = None;
        self.finished_at = None;
        self.paused_total_ms = 0;
        self.cancel_timers();
        debug!(chars = self.chars.len(), mode = %self.mode, duration = self.duration, "session reset");

        self.emit_update();
    }

    pub fn handle_char_input(&mut self, ch: char) {
        self.fire_overdue_deadline();
        if self.run_state != RunState::Running || self.current_index >= self.chars.len() {
            return;
        }

        let idx = self.current_index;
        let correct = ch == self.chars[idx];
        if correct {
            self.correct_chars += 1;
            self.typed_states[idx] = CharState::Correct;
        } else {
            self.errors += 1;
            self.typed_states[idx] = CharState::Incorrect;
        }
        self.total_chars += 1;

        if let Err(e) = self.observer.on_char(CharFeedback { char: ch, correct }) {
            warn!(error = %e, "char observer failed");
        }

        self.current_index += 1;
        self.emit_update();

        if self.mode == Mode::WordCountLimited && self.words_typed() >= self.duration as usize {
            self.finish();
        } else if self.current_index >= self.chars.len() {
            self.finish();
        }
    }

    pub fn handle_backspace(&mut self) {
        self.fire_overdue_deadline();
        if self.run_state != RunState::Running || !self.allow_backspace || self.current_index == 0 {
            return;
        }

        self.current_index -= 1;
        let idx = self.current_index;
        match self.typed_states[idx] {
            CharState::Correct => {
                self.correct_chars -= 1;
                self.total_chars -= 1;
            }
            CharState::Incorrect => {
                self.errors -= 1;
                self.total_chars -= 1;
            }
            CharState::Untyped => {}
        }
        self.typed_states[idx] = CharState::Untyped;

        self.emit_update();
    }

    pub fn finish(&mut self) {
        if self.run_state != RunState::Running {
            return;
        }
        let now = self.clock.now_ms();
        // a stalled host must not stretch a timed test past its limit
        self.finished_at = Some(match self.time_limit_at() {
            Some(limit_at) => now.min(limit_at),
            None => now,
        });
        self.run_state = RunState::Finished;
        self.cancel_timers();

        let end = SessionEnd {
            stats: self.stats(),
            mode: self.mode,
            duration: self.duration,
            words_total: self.words_total(),
            elapsed_ms: self.elapsed_ms(),
        };
        debug!(wpm = end.stats.wpm, accuracy = end.stats.accuracy, errors = end.stats.errors, "session finished");

        if let Err(e) = self.observer.on_end(&end) {
            warn!(error = %e, "end observer failed");
        }
    }

    /// Fire whichever timers are due. The deadline wins over the tick when both are due.
    pub fn poll_timers(&mut self) {
        if self.run_state != RunState::Running {
            return;
        }
        let now = self.clock.now_ms();

        if self.deadline.as_mut().is_some_and(|t| t.poll(now)) {
            self.deadline = None;
            self.finish();
            return;
        }

        if self.tick.as_mut().is_some_and(|t| t.poll(now)) {
            self.emit_update();
            if self.mode == Mode::TimeLimited && self.remaining_ms() == 0 {
                self.finish();
            }
        }
    }

    /// Time until the next armed timer, if any
    pub fn next_timer_in(&self) -> Option<Duration> {
        let now = self.clock.now_ms();
        [self.tick.as_ref(), self.deadline.as_ref()]
            .into_iter()
            .flatten()
            .map(|t| t.remaining(now))
            .min()
    }

    pub fn elapsed_ms(&self) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let frozen_at = match self.run_state {
            RunState::Paused => self.paused_at,
            RunState::Finished => self.finished_at,
            RunState::Idle | RunState::Running => None,
        };
        let until = frozen_at.unwrap_or_else(|| self.clock.now_ms());
        until
            .saturating_sub(started_at)
            .saturating_sub(self.paused_total_ms)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(self.correct_chars, self.total_chars, self.errors, self.elapsed_ms())
    }

    pub fn remaining(&self) -> Remaining {
        match self.mode {
            Mode::TimeLimited => Remaining::Time {
                ms: self.remaining_ms(),
            },
            Mode::WordCountLimited => Remaining::Words {
                count: (self.duration as usize).saturating_sub(self.words_typed()),
            },
        }
    }

    /// Words fully contained in the typed prefix
    pub fn words_typed(&self) -> usize {
        completed_words(&self.word_ends, self.current_index)
    }

    pub fn words_total(&self) -> usize {
        self.word_ends.len()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn allow_backspace(&self) -> bool {
        self.allow_backspace
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn has_finished(&self) -> bool {
        self.run_state == RunState::Finished
    }

    pub fn typed_states(&self) -> &[CharState] {
        &self.typed_states
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn correct_chars(&self) -> usize {
        self.correct_chars
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    fn remaining_ms(&self) -> u64 {
        (self.duration as u64 * 1000).saturating_sub(self.elapsed_ms())
    }

    /// Clock reading at which a running timed test runs out
    fn time_limit_at(&self) -> Option<u64> {
        match (self.mode, self.started_at) {
            (Mode::TimeLimited, Some(started_at)) => {
                Some(started_at + self.paused_total_ms + self.duration as u64 * 1000)
            }
            _ => None,
        }
    }

    /// Input that arrives after the deadline belongs to no test: end it first
    fn fire_overdue_deadline(&mut self) {
        if self.run_state != RunState::Running {
            return;
        }
        let now = self.clock.now_ms();
        if self.deadline.as_ref().is_some_and(|t| t.due_at_ms() <= now) {
            self.deadline = None;
            self.finish();
        }
    }

    fn cancel_timers(&mut self) {
        self.tick = None;
        self.deadline = None;
    }

    fn emit_update(&mut self) {
        let update = SessionUpdate {
            stats: self.stats(),
            typed_states: self.typed_states.clone(),
            current_index: self.current_index,
            mode: self.mode,
            remaining: self.remaining(),
            text: Arc::clone(&self.text),
        };
        if let Err(e) = self.observer.on_update(&update) {
            warn!(error = %e, "update observer failed");
        }
    }
}

impl<C: Clock> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("text", &self.text)
            .field("mode", &self.mode)
            .field("duration", &self.duration)
            .field("run_state", &self.run_state)
            .field("current_index", &self.current_index)
            .field("correct_chars", &self.correct_chars)
            .field("errors", &self.errors)
            .field("elapsed_ms", &self.elapsed_ms())
            .finish_non_exhaustive()
    }
}

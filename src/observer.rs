use crate::session::{CharState, Mode};
use crate::stats::Stats;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Mode-specific progress carried by every update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Time { ms: u64 },
    Words { count: usize },
}

impl Remaining {
    /// Percent of `total` already consumed, for progress bars. `total` is in the same unit as
    /// the variant (ms or words).
    pub fn percent_complete(&self, total: u64) -> f64 {
        let remaining = match *self {
            Remaining::Time { ms } => ms,
            Remaining::Words { count } => count as u64,
        };
        let total = total.max(1) as f64;
        (100.0 * (1.0 - remaining as f64 / total)).clamp(0.0, 100.0)
    }
}

/// Snapshot emitted on start, pause, reset, every keystroke and every tick
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub stats: Stats,
    pub typed_states: Vec<CharState>,
    pub current_index: usize,
    pub mode: Mode,
    pub remaining: Remaining,
    pub text: Arc<str>,
}

/// Per-keystroke feedback. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharFeedback {
    pub char: char,
    pub correct: bool,
}

/// Emitted once when a session finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    pub stats: Stats,
    pub mode: Mode,
    pub duration: u32,
    pub words_total: usize,
    /// Time actually typed; shorter than the limit when a timed test ran out of text
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Update(SessionUpdate),
    Char(CharFeedback),
    End(SessionEnd),
}

#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("observer is no longer listening")]
    Disconnected,
    #[error("observer rejected event: {0}")]
    Rejected(String),
}

/// Receives session events. Errors are logged by the session and otherwise ignored.
pub trait SessionObserver {
    fn on_update(&mut self, _update: &SessionUpdate) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_char(&mut self, _feedback: CharFeedback) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_end(&mut self, _end: &SessionEnd) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// Forward events into a channel so a host can drain them from its own loop
impl SessionObserver for Sender<SessionEvent> {
    fn on_update(&mut self, update: &SessionUpdate) -> Result<(), ObserverError> {
        self.send(SessionEvent::Update(update.clone()))
            .map_err(|_| ObserverError::Disconnected)
    }

    fn on_char(&mut self, feedback: CharFeedback) -> Result<(), ObserverError> {
        self.send(SessionEvent::Char(feedback))
            .map_err(|_| ObserverError::Disconnected)
    }

    fn on_end(&mut self, end: &SessionEnd) -> Result<(), ObserverError> {
        self.send(SessionEvent::End(*end))
            .map_err(|_| ObserverError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn test_percent_complete() {
        assert_eq!(Remaining::Time { ms: 15_000 }.percent_complete(60_000), 75.0);
        assert_eq!(Remaining::Words { count: 10 }.percent_complete(10), 0.0);
        assert_eq!(Remaining::Words { count: 0 }.percent_complete(10), 100.0);
        // more remaining than total clamps at zero
        assert_eq!(Remaining::Words { count: 20 }.percent_complete(10), 0.0);
        assert_eq!(Remaining::Time { ms: 0 }.percent_complete(0), 100.0);
    }

    #[test]
    fn test_channel_observer_forwards() {
        let (mut tx, rx) = mpsc::channel();
        tx.on_char(CharFeedback {
            char: 'a',
            correct: true,
        })
        .unwrap();
        assert_matches!(
            rx.try_recv(),
            Ok(SessionEvent::Char(CharFeedback { char: 'a', correct: true }))
        );
    }

    #[test]
    fn test_channel_observer_reports_disconnect() {
        let (mut tx, rx) = mpsc::channel::<SessionEvent>();
        drop(rx);
        let result = tx.on_char(CharFeedback {
            char: 'a',
            correct: false,
        });
        assert_matches!(result, Err(ObserverError::Disconnected));
    }
}

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What the host loop reacts to. `Tick` means the wait ran out with nothing to read.
#[derive(Clone, Debug)]
pub enum HostEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Anything the host loop can wait on for input
pub trait HostEventSource: Send + 'static {
    /// Wait at most `timeout` for the next event
    fn recv_timeout(&self, timeout: Duration) -> Result<HostEvent, RecvTimeoutError>;
}

/// Map a raw terminal event to a host event. Key releases are dropped, otherwise
/// terminals that report them would type every character twice.
pub fn translate(event: CtEvent) -> Option<HostEvent> {
    match event {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(HostEvent::Key(key)),
        CtEvent::Resize(_, _) => Some(HostEvent::Resize),
        _ => None,
    }
}

/// Reads the terminal on a background thread and hands events over a channel
pub struct CrosstermEventSource {
    rx: Receiver<HostEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let raw = match event::read() {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if let Some(ev) = translate(raw) {
                if tx.send(ev).is_err() {
                    // host loop is gone
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<HostEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Upper bound on how long the host waits between redraws
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for headless runs and tests
pub struct TestEventSource {
    rx: Receiver<HostEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<HostEvent>) -> Self {
        Self { rx }
    }
}

impl HostEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<HostEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Drives the host loop: one input event or one tick per step
pub struct Runner<E: HostEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: HostEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Wait for input, but never past the tick interval or past `due_in`, the point
    /// where a session timer wants polling. A quiet or closed source yields `Tick`.
    pub fn step(&self, due_in: Option<Duration>) -> HostEvent {
        let interval = self.ticker.interval();
        let wait = due_in.map_or(interval, |due| due.min(interval));
        self.event_source
            .recv_timeout(wait)
            .unwrap_or(HostEvent::Tick)
    }
}

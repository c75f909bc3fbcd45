// Library surface for the host binary, headless/integration tests and reuse.
// The terminal UI itself lives with the binary in main.rs.
pub mod app_dirs;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod logging;
pub mod observer;
pub mod rng;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod text_generator;
pub mod timer;
pub mod tokenize;

pub use observer::{SessionEvent, SessionObserver};
pub use session::{Mode, RunState, Session, SessionConfig};
pub use stats::{compute_stats, Stats};
pub use text_generator::{generate_text, TextRequest};

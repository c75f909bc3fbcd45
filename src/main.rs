mod app;
mod ui;

use crate::app::App;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use flowtype::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::AppError,
    leaderboard::FileLeaderboardStore,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, HostEvent, Runner},
    session::{Mode, TICK_INTERVAL_MS},
    text_generator::{seed_from_clock, ContentType, Difficulty},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io::{self, stdin, Write},
    time::Duration,
};
use tracing::info;

/// typing speed trainer with live stats and a local leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing speed trainer: timed or word-count tests over generated words, quotes, numbers, code or your own text, with live wpm/accuracy and a best-10 leaderboard."
)]
pub struct Cli {
    /// test mode: fixed time or fixed number of words
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// number of seconds for timed tests
    #[clap(short = 's', long = "secs")]
    duration_secs: Option<u32>,

    /// number of words for word-count tests
    #[clap(short = 'w', long = "words")]
    word_count: Option<u32>,

    /// what to type
    #[clap(short = 'c', long, value_enum)]
    content: Option<ContentType>,

    /// capitalization and punctuation frequency
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// custom text to type (implies --content custom)
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// leave punctuation out of generated words
    #[clap(long)]
    no_punctuation: bool,

    /// precision mode: backspace is disabled
    #[clap(long)]
    precision: bool,

    /// ring the terminal bell on every mistake
    #[clap(long)]
    error_sound: bool,

    /// seed for reproducible text
    #[clap(long)]
    seed: Option<u32>,

    /// persist these settings as the new defaults
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Layer command-line flags over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(secs) = self.duration_secs {
            config.duration_secs = secs;
        }
        if let Some(words) = self.word_count {
            config.word_count = words;
        }
        if let Some(content) = self.content {
            config.content = content;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(ref prompt) = self.prompt {
            config.content = ContentType::Custom;
            config.custom_text = prompt.clone();
        }
        if self.no_punctuation {
            config.punctuation = false;
        }
        if self.precision {
            config.precision = true;
        }
        if self.error_sound {
            config.error_sound = true;
        }
        config
    }
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let stored = config_store.load();

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&stored.log_level, &log_path) {
            eprintln!("logging disabled: {e}");
        }
    }

    let config = cli.apply(stored).validated();
    if cli.save {
        config_store.save(&config)?;
        info!(path = %config_store.path().display(), "saved settings");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let seed = cli.seed.unwrap_or_else(seed_from_clock);
    info!(seed, mode = %config.mode, content = %config.content, "starting");
    let mut app = App::new(config, seed, Box::new(FileLeaderboardStore::new()));
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend + Write>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), AppError> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_INTERVAL_MS)),
    );

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let event = runner.step(app.session.next_timer_in());
        // an expired test must end before the key that arrived late is applied
        app.session.poll_timers();
        let quit = match event {
            HostEvent::Key(key) => app.on_key(key),
            HostEvent::Resize | HostEvent::Tick => false,
        };
        if quit {
            break;
        }
        if app.drain_session_events().ring_bell {
            let backend = terminal.backend_mut();
            backend.write_all(b"\x07")?;
            Write::flush(backend)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_stored_config() {
        let cli = Cli::parse_from([
            "flowtype",
            "--mode",
            "words",
            "--words",
            "25",
            "--difficulty",
            "hard",
            "--no-punctuation",
            "--precision",
        ]);
        let config = cli.apply(Config::default());
        assert_eq!(config.mode, Mode::WordCountLimited);
        assert_eq!(config.word_count, 25);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!(!config.punctuation);
        assert!(config.precision);
        assert_eq!(config.duration_secs, Config::default().duration_secs);
    }

    #[test]
    fn test_prompt_implies_custom_content() {
        let cli = Cli::parse_from(["flowtype", "-p", "hello there"]);
        let config = cli.apply(Config::default());
        assert_eq!(config.content, ContentType::Custom);
        assert_eq!(config.custom_text, "hello there");
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let stored = Config {
            error_sound: true,
            duration_secs: 15,
            ..Config::default()
        };
        let cli = Cli::parse_from(["flowtype"]);
        assert_eq!(cli.apply(stored.clone()), stored);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}

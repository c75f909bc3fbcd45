use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::session::{Mode, SessionConfig};
use crate::text_generator::{ContentType, Difficulty, TextRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_DURATION_SECS: u32 = 60;
pub const DEFAULT_WORD_COUNT: u32 = 50;
/// Timed tests get a long text so fast typists don't run out
pub const TIME_MODE_WORDS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub content: ContentType,
    pub duration_secs: u32,
    pub word_count: u32,
    pub punctuation: bool,
    pub difficulty: Difficulty,
    /// Precision mode: backspace is disabled
    pub precision: bool,
    pub error_sound: bool,
    pub custom_text: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::TimeLimited,
            content: ContentType::Words,
            duration_secs: DEFAULT_DURATION_SECS,
            word_count: DEFAULT_WORD_COUNT,
            punctuation: true,
            difficulty: Difficulty::Normal,
            precision: false,
            error_sound: false,
            custom_text: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Replace zero durations/word counts with defaults; sessions trust these values
    pub fn validated(mut self) -> Self {
        if self.duration_secs == 0 {
            warn!(default = DEFAULT_DURATION_SECS, "duration_secs must be positive, using default");
            self.duration_secs = DEFAULT_DURATION_SECS;
        }
        if self.word_count == 0 {
            warn!(default = DEFAULT_WORD_COUNT, "word_count must be positive, using default");
            self.word_count = DEFAULT_WORD_COUNT;
        }
        self
    }

    /// Seconds for timed tests, words for word-count tests
    pub fn session_duration(&self) -> u32 {
        match self.mode {
            Mode::TimeLimited => self.duration_secs,
            Mode::WordCountLimited => self.word_count,
        }
    }

    pub fn text_request(&self, seed: u32) -> TextRequest {
        let word_count = match self.mode {
            Mode::TimeLimited => TIME_MODE_WORDS,
            Mode::WordCountLimited => self.word_count as usize,
        };
        TextRequest {
            word_count,
            include_punctuation: self.punctuation,
            seed,
            content_type: self.content,
            difficulty: self.difficulty,
            custom_text: self.custom_text.clone(),
        }
    }

    pub fn session_config(&self, text: String) -> SessionConfig {
        SessionConfig {
            text,
            mode: self.mode,
            duration: self.session_duration(),
            allow_backspace: !self.precision,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("flowtype_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

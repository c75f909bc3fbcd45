use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::observer::SessionEnd;
use crate::session::Mode;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// How many results are kept
pub const LEADERBOARD_SIZE: usize = 10;

/// One finished test as stored on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub wpm: u64,
    pub raw: u64,
    pub accuracy: u8,
    pub errors: usize,
    pub mode: Mode,
    pub duration: u32,
    /// Zero for records written before this was tracked
    #[serde(default)]
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Local>,
}

impl ResultRecord {
    pub fn from_end(end: &SessionEnd, timestamp: DateTime<Local>) -> Self {
        Self {
            wpm: end.stats.wpm,
            raw: end.stats.raw,
            accuracy: end.stats.accuracy,
            errors: end.stats.errors,
            mode: end.mode,
            duration: end.duration,
            elapsed_ms: end.elapsed_ms,
            timestamp,
        }
    }

    /// "60s", "25 words", or "12/60s" for a timed test that ran out of text early
    pub fn describe_test(&self) -> String {
        let limit_ms = self.duration as u64 * 1000;
        match self.mode {
            Mode::TimeLimited if self.elapsed_ms > 0 && self.elapsed_ms < limit_ms => {
                format!("{}/{}s", self.elapsed_ms.div_ceil(1000), self.duration)
            }
            Mode::TimeLimited => format!("{}s", self.duration),
            Mode::WordCountLimited => format!("{} words", self.duration),
        }
    }
}

/// Best first: descending wpm, then descending accuracy. Ties keep insertion order.
pub fn rank(entries: &mut Vec<ResultRecord>) {
    entries.sort_by(|a, b| b.wpm.cmp(&a.wpm).then(b.accuracy.cmp(&a.accuracy)));
    entries.truncate(LEADERBOARD_SIZE);
}

pub trait LeaderboardStore {
    /// Stored entries; missing or unreadable storage is an empty board
    fn load(&self) -> Vec<ResultRecord>;

    fn save(&self, entries: &[ResultRecord]) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    /// Insert a result, keep the best entries and persist. A failed write is logged and the
    /// updated board is still returned.
    fn add_result(&self, record: ResultRecord) -> Vec<ResultRecord> {
        let mut entries = self.load();
        entries.push(record);
        rank(&mut entries);
        if let Err(e) = self.save(&entries) {
            error!(error = %e, "failed to save leaderboard");
        }
        entries
    }
}

#[derive(Debug, Clone)]
pub struct FileLeaderboardStore {
    path: PathBuf,
}

impl FileLeaderboardStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::leaderboard_path().unwrap_or_else(|| PathBuf::from("flowtype_leaderboard.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileLeaderboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardStore for FileLeaderboardStore {
    fn load(&self) -> Vec<ResultRecord> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "leaderboard unreadable, starting empty");
                return Vec::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "leaderboard corrupt, starting empty");
            Vec::new()
        })
    }

    fn save(&self, entries: &[ResultRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

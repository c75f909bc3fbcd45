//! Error types shared across the crate.

/// Failure reading or writing a local JSON file (config, leaderboard)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The primary error type for the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Terminal setup or drawing failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The global tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Core error type for the roster bot.
///
/// Adapter crates should map their specific errors into this type so the export
/// flow can report failures consistently (user-facing notice + log line).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// A malformed table reached the encoder (row width differs from header width).
    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported source scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("Source exceeds the maximum size of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    #[error("Fetch timed out after {seconds}s")]
    FetchTimeout { seconds: u64 },

    #[error("Another import job is already active")]
    Conflict,

    #[error("Write error: {message}")]
    Write { message: String },

    #[error("Invalid source locator: {reason}")]
    InvalidSource { reason: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;

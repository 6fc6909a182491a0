use thiserror::Error;

#[derive(Error, Debug)]
pub enum YapScoreError {
    #[error("Invalid handle: {0:?}")]
    InvalidHandle(String),

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("Invalid FDV: {0}")]
    InvalidFdv(f64),

    #[error("Upstream {endpoint} returned HTTP {status}")]
    UpstreamStatus { endpoint: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request for {0} was cancelled")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, YapScoreError>;

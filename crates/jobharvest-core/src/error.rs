use thiserror::Error;

/// Everything that can go wrong while harvesting a batch of job pages.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request for a job page could not be completed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The job board answered, but not with 2xx.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Page was served but looks like a challenge or block page.
    #[error("Blocked on {url}: {reason}")]
    Blocked { url: String, reason: String },

    /// Headless browser could not be launched or driven.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Extraction produced no usable record.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// Reading or writing an output file failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// `jobs.json` could not be encoded or parsed.
    #[error("JSON error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// No response from the job board within the configured timeout (seconds).
    #[error("No response within {0}s")]
    Timeout(u64),

    /// The board answered 429.
    #[error("Too many requests")]
    RateLimitExceeded,

    /// DNS, TLS or connection failure before any response.
    #[error("Connection error: {0}")]
    NetworkError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Operation was interrupted by a shutdown request.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Generic(String),
}

/// Fragments of a transport error message that point at a flaky connection.
const TRANSIENT_HINTS: &[&str] = &["timeout", "connect", "reset"];

impl AppError {
    /// Transient failures: the same URL may well succeed on the next attempt.
    /// Blocks, 4xx answers and local failures are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Timeout(_) | AppError::RateLimitExceeded | AppError::NetworkError(_) => true,
            AppError::HttpStatus { status, .. } => *status >= 500,
            AppError::HttpError(msg) => TRANSIENT_HINTS.iter().any(|hint| msg.contains(hint)),
            _ => false,
        }
    }

    /// Soft blocks: a challenge page or a 403. Another strategy may get through.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            AppError::Blocked { .. } | AppError::HttpStatus { status: 403, .. }
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::StorageError(e.to_string())
    }
}

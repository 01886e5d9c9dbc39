//! Error types for the recording organizer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the recording organizer.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("TheTVDB API key not configured. Set TVDB_API_KEY environment variable")]
    TvDbApiKeyMissing,

    #[error("Invalid configuration: {0}")]
    Config(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Remote catalog errors
    #[error("Catalog request failed: {0}")]
    Network(String),

    #[error("Malformed catalog document: {0}")]
    Parse(String),

    // State file errors
    #[error("State file error: {0}")]
    Persistence(String),

    // Operator interaction errors
    #[error("Decision request failed: {0}")]
    Decision(String),

    #[error("Operation cancelled")]
    Cancelled,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // XML errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    // Archive errors
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error came from the cancellation token rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

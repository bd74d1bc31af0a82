//! Error types for sayall

use std::io;
use thiserror::Error;

/// Main error type for sayall
///
/// Only failures to *start* reading reach callers of the reader; once a
/// session is running every fault is absorbed and ends the session.
#[derive(Error, Debug)]
pub enum SayAllError {
    #[error("Cannot start reading: {0}")]
    Construction(#[source] crate::content::NavigationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sayall operations
pub type Result<T> = std::result::Result<T, SayAllError>;

impl From<String> for SayAllError {
    fn from(s: String) -> Self {
        SayAllError::Other(s)
    }
}

impl From<&str> for SayAllError {
    fn from(s: &str) -> Self {
        SayAllError::Other(s.to_string())
    }
}

use std::fmt;

use thiserror::Error;

/// Failure talking to the ingestion service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    HttpStatus(HttpFailure),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Non-success response, with the server's own message when it sent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub status: u16,
    pub message: Option<String>,
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => write!(f, "http status {}", self.status),
        }
    }
}

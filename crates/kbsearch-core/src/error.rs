use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Query parse error at {position}: {message}")]
    QueryParse { position: usize, message: String },

    #[error("Index unavailable at {}: {reason}", path.display())]
    IndexUnavailable { path: PathBuf, reason: String },

    #[error("Query timed out after {0:?}")]
    QueryTimeout(Duration),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::QueryParse { position, message: message.into() }
    }

    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::IndexUnavailable { path: path.into(), reason: reason.to_string() }
    }

    /// Timeouts are the only failure a caller may safely retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QueryTimeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_query_parse() {
        let err = Error::parse(4, "unbalanced ')'");
        assert_eq!(err.to_string(), "Query parse error at 4: unbalanced ')'");
    }

    #[test]
    fn display_index_unavailable() {
        let err = Error::unavailable("/srv/index/protrendschema_index", "missing");
        assert_eq!(err.to_string(), "Index unavailable at /srv/index/protrendschema_index: missing");
    }

    #[test]
    fn only_timeouts_are_retryable() {
        assert!(Error::QueryTimeout(Duration::from_millis(5)).is_retryable());
        assert!(!Error::parse(0, "x").is_retryable());
        assert!(!Error::unavailable("/x", "gone").is_retryable());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

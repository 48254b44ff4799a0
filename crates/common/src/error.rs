//! Error types for Stagecraft collaborators

use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the shared collaborators (database, configuration)
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database connection timed out after {seconds}s")]
    ConnectionTimeout { seconds: u64 },

    #[error("Not connected")]
    NotConnected,

    #[error("Script file is empty: {0}")]
    EmptyScript(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_format() {
        let err = Error::ConnectionTimeout { seconds: 60 };
        assert_eq!(err.to_string(), "Database connection timed out after 60s");
    }

    #[test]
    fn test_io_from() {
        let err: Error = std::io::Error::other("disk gone").into();
        assert_eq!(err.to_string(), "IO error: disk gone");
    }
}

//! Error types for the store.

use std::io;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the store.
#[derive(Error, Debug)]
pub enum Error {
    /// Revert was called with an empty checkpoint stack.
    #[error("no checkpoints to revert to")]
    NoCheckpoints,

    /// File creation/open/read/rename failure during save or load.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Malformed persisted document.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The persisted document decoded cleanly but is self-inconsistent.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::NoCheckpoints.to_string(),
            "no checkpoints to revert to"
        );

        let err = Error::Corrupt("value index does not match primary map".into());
        assert!(err.to_string().starts_with("corrupt snapshot:"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

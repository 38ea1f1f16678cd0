//! Error types for xdoc
//!
//! Navigation never fails: it degrades to the empty cursor. The variants here
//! are reserved for mutation and required-state accessors, so a caller can tell
//! an empty cursor apart from an illegal structural operation or a bad argument.

use thiserror::Error;

/// Result type alias using xdoc Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xdoc operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cursor is empty (no tree, no selection)
    #[error("xdoc is empty")]
    Empty,

    /// A required argument is missing or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is structurally impossible at the current position
    #[error("{0}")]
    InvalidState(String),

    /// Markup could not be parsed
    #[error("XML error: {0}")]
    Xml(String),

    /// A path query could not be evaluated
    #[error("query error: {0}")]
    Query(String),

    /// A configured limit was exceeded while loading
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

impl Error {
    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        Error::InvalidState(message.into())
    }

    /// Check whether this error reports an operation on an empty cursor
    pub fn is_empty_cursor(&self) -> bool {
        matches!(self, Error::Empty)
    }

    /// Check whether this error reports a structural violation
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Empty.to_string(), "xdoc is empty");
        assert_eq!(
            Error::state("xdoc is at root position").to_string(),
            "xdoc is at root position"
        );
        assert_eq!(
            Error::argument("tag").to_string(),
            "invalid argument: tag"
        );
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        assert!(Error::Empty.is_empty_cursor());
        assert!(!Error::Empty.is_invalid_state());
        assert!(Error::state("x").is_invalid_state());
        assert_ne!(Error::argument("x"), Error::state("x"));
    }
}

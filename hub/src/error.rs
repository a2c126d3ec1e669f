//! Error types for the `hub` crate.
//!
//! Follows the same pattern as the other crates in the workspace: a root Error
//! struct holding an error kind and an optional source for error chaining.
//! None of these errors reach event producers; they are raised and consumed
//! inside a single connection's pumps.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The socket refused a read or a write.
    Transport,
    /// A read or write did not finish before its deadline.
    Timeout,
    /// An outbound envelope could not be encoded.
    Serialization,
    /// An inbound frame was not a valid client message.
    Decode,
}

impl Error {
    pub fn transport<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Transport,
        }
    }

    pub fn timeout() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Timeout,
        }
    }

    pub fn decode(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Decode,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error_kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.error_kind {
            ErrorKind::Transport => "transport error",
            ErrorKind::Timeout => "deadline exceeded",
            ErrorKind::Serialization => "serialization error",
            ErrorKind::Decode => "malformed client message",
        };
        match &self.source {
            Some(source) => write!(f, "{kind}: {source}"),
            None => write!(f, "{kind}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Serialization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_source() {
        let source = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = Error::transport(source);

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "transport error: pipe closed");
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn timeout_has_no_source() {
        let err = Error::timeout();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "deadline exceeded");
        assert!(StdError::source(&err).is_none());
    }
}

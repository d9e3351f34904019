//! Error types for the logger core.

use std::error::Error as StdError;
use thiserror::Error;

use crate::logger::level::DetailLevel;

/// Errors raised while building or running the logger.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// A built-in template failed to compile. Indicates a packaging bug.
    #[error("template for level `{level}` failed to compile")]
    Template {
        level: DetailLevel,
        #[source]
        source: tera::Error,
    },

    /// A level other than `none` has no template for one direction.
    #[error("missing {direction} template for level `{level}`")]
    MissingTemplate {
        level: DetailLevel,
        direction: &'static str,
    },

    /// Rendering a compiled template failed.
    #[error("rendering {direction} template for level `{level}` failed")]
    Render {
        level: DetailLevel,
        direction: &'static str,
        #[source]
        source: tera::Error,
    },

    /// The output sink could not be opened or written.
    #[error("output sink error")]
    Io(#[from] std::io::Error),
}

/// Result type for logger operations.
pub type LoggerResult<T> = Result<T, LoggerError>;

/// Render `err` and its sources as one line: `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoggerError::MissingTemplate {
            level: DetailLevel::Verbose,
            direction: "response",
        };
        assert_eq!(err.to_string(), "missing response template for level `verbose`");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LoggerError::from(io);
        assert_eq!(error_chain(&err), "output sink error: pipe closed");
    }
}

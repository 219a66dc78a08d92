//! Unified error type.

use thiserror::Error;

/// The error type returned by meddle's fallible operations.
///
/// These are configuration failures, raised while a stack is being
/// assembled and before any request is processed. Request-level problems
/// (a traversal attempt, a missing file) are expressed as
/// [`Response`](crate::Response) values, never as `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("middleware at position {index} has no name")]
    UnnamedMiddleware { index: usize },

    #[error("middleware `{middleware}` expects `{capability}`, which no earlier middleware provides")]
    MissingCapability { middleware: String, capability: String },

    #[error("invalid mount pattern `{pattern}`: {source}")]
    InvalidMount {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for the sparse parser.

use std::io;
use std::sync::Arc;

/// A fatal parse error.
///
/// Once a [`Parser`](crate::Parser) returns an error it is poisoned, and every
/// later step returns a clone of the same error. End of input is never an
/// error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A `}` was read while no block was open.
    #[error("unexpected end of node: `}}` with no open block (offset: {position})")]
    UnexpectedNodeLeave {
        /// Code-point offset just past the offending brace.
        position: usize,
    },

    /// The code-point source failed.
    #[error("failed to read source: {0}")]
    Source(#[source] Arc<io::Error>),
}

impl Error {
    /// Whether this is a structural error rather than a source failure.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::UnexpectedNodeLeave { .. })
    }

    /// The underlying I/O error, if the source failed.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::Source(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Source(Arc::new(err))
    }
}

/// Result type for sparse parser operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Gather query errors.

use thiserror::Error;

/// Errors raised while building or running a listing query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatherError {
    /// The descriptor failed structural validation. Retrying with the same
    /// input fails the same way.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl GatherError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

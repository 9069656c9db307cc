//! Error types for the event-hub library.

use thiserror::Error;

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for event-hub.
///
/// Handler failures are never propagated out of a publish call; they are
/// captured into the per-handler [`ExecutionResult`](crate::report::ExecutionResult).
/// The variants here describe what a handler can return, plus the rare
/// machinery-level faults.
#[derive(Error, Debug)]
pub enum Error {
    /// A handler reported a failure while consuming an event
    #[error("Handler failure: {0}")]
    Handler(String),

    /// A typed handler was invoked with an envelope of a different kind.
    ///
    /// The registry keys handlers by exact kind, so this cannot happen on
    /// the normal publish path; seeing it means a handler was wired to the
    /// wrong kind by hand.
    #[error("Handler for '{expected}' received event of kind '{actual}'")]
    KindMismatch {
        /// Kind the handler was built for
        expected: &'static str,
        /// Kind of the envelope it received
        actual: &'static str,
    },

    /// Generic internal error in the dispatch machinery
    #[error("Internal error: {0}")]
    Internal(String),

    /// An arbitrary error carried out of a handler
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Create a new handler failure with a custom message
    pub fn handler(msg: impl Into<String>) -> Self {
        Error::Handler(msg.into())
    }

    /// Create a new internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Check if this error came from a handler rather than the machinery
    pub fn is_handler_failure(&self) -> bool {
        matches!(self, Error::Handler(_) | Error::Other(_))
    }

    /// Check if this is a kind-mismatch error
    pub fn is_kind_mismatch(&self) -> bool {
        matches!(self, Error::KindMismatch { .. })
    }
}

//! Result and report types produced by a publish call.

use crate::handler::EventHandler;
use crate::Error;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::sync::Arc;

/// Outcome of invoking one handler during a publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The handler ran to completion
    Executed,

    /// The handler returned an error; it is captured in
    /// [`ExecutionResult::error`] and delivery continued with the
    /// remaining handlers
    UnhandledFailure,
}

/// Per-handler record of what happened during one publish call.
pub struct ExecutionResult {
    /// The handler this record describes
    pub handler: Arc<dyn EventHandler>,

    /// Whether the handler completed or failed
    pub outcome: ExecutionOutcome,

    /// The captured failure, present iff the outcome is
    /// [`ExecutionOutcome::UnhandledFailure`]
    pub error: Option<Error>,
}

impl ExecutionResult {
    /// Record a successful invocation
    pub(crate) fn executed(handler: Arc<dyn EventHandler>) -> Self {
        Self {
            handler,
            outcome: ExecutionOutcome::Executed,
            error: None,
        }
    }

    /// Record a captured failure
    pub(crate) fn failed(handler: Arc<dyn EventHandler>, error: Error) -> Self {
        Self {
            handler,
            outcome: ExecutionOutcome::UnhandledFailure,
            error: Some(error),
        }
    }

    /// Check whether the handler completed without failure
    pub fn is_executed(&self) -> bool {
        self.outcome == ExecutionOutcome::Executed
    }
}

impl fmt::Debug for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionResult")
            .field("handler", &self.handler.name())
            .field("handler_id", &self.handler.id())
            .field("outcome", &self.outcome)
            .field("error", &self.error)
            .finish()
    }
}

/// Full result of one publish call.
///
/// Callers inspect [`ExecutionResult::outcome`] per handler to detect
/// failures; there is no aggregate failure signal, because one handler's
/// failure is not the publish call's failure.
#[derive(Debug)]
pub struct PublishReport {
    /// Results for the kind-specific handlers, in invocation order
    pub handler_results: Vec<ExecutionResult>,

    /// Results for the catch-all handlers, in invocation order.
    /// Catch-all handlers always run after every kind-specific handler.
    pub catch_all_results: Vec<ExecutionResult>,

    /// Timestamp taken just before the first invocation, in UTC
    pub started_at: DateTime<Utc>,

    /// Timestamp taken just after the last invocation, in UTC
    pub finished_at: DateTime<Utc>,
}

impl PublishReport {
    /// Duration of executing all handlers, clamped to be non-negative
    pub fn duration(&self) -> TimeDelta {
        self.finished_at
            .signed_duration_since(self.started_at)
            .max(TimeDelta::zero())
    }

    /// Check whether every handler, catch-all included, executed cleanly
    pub fn all_executed(&self) -> bool {
        self.handler_results.iter().all(ExecutionResult::is_executed)
            && self
                .catch_all_results
                .iter()
                .all(ExecutionResult::is_executed)
    }

    /// Iterate over the results whose handler failed
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.handler_results
            .iter()
            .chain(self.catch_all_results.iter())
            .filter(|r| !r.is_executed())
    }
}

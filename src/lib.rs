//! # event-hub
//!
//! An in-process publish/subscribe event hub with per-handler failure
//! isolation.
//!
//! ## Features
//!
//! - **Kind-exact dispatch**: handlers subscribe against one event kind
//!   and are never invoked for any other
//! - **Catch-all handlers** that receive every event, strictly after the
//!   kind-specific handlers of each publish call
//! - **Failure isolation**: one handler's failure never skips the others;
//!   every publish returns a full per-handler report
//! - **Identity-deduplicated registry** with an idempotent teardown
//! - **Sync and async** publish paths with identical semantics
//!
//! ## Quick Example
//!
//! ```rust
//! use event_hub::{Event, EventBus, ExecutionOutcome};
//!
//! #[derive(Debug)]
//! struct UserRegistered {
//!     user_id: u64,
//!     email: String,
//! }
//!
//! impl Event for UserRegistered {
//!     fn event_type() -> &'static str {
//!         "UserRegistered"
//!     }
//! }
//!
//! let bus = EventBus::new();
//!
//! // Subscribe to events
//! bus.subscribe_fn(|event: &UserRegistered| {
//!     println!("New user registered: {}", event.email);
//!     Ok(())
//! });
//!
//! // Publish an event and inspect each handler's fate
//! let report = bus.publish(UserRegistered {
//!     user_id: 123,
//!     email: "user@example.com".to_string(),
//! });
//!
//! for result in &report.handler_results {
//!     assert_eq!(result.outcome, ExecutionOutcome::Executed);
//! }
//!
//! bus.dispose();
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    unreachable_pub
)]

/// Core event trait and the type-erased envelope
pub mod event;

/// Error types and result aliases
pub mod error;

/// Handler traits, identity tokens, and function-based adapters
pub mod handler;

/// Handler storage and the pluggable resolution contract
pub mod registry;

/// Per-handler results and the publish report
pub mod report;

/// The delivery pipeline and the source-generic hub
pub mod dispatch;

/// The main event bus implementation
pub mod bus;

// Re-export commonly used types
pub use bus::{EventBus, EventBusBuilder};
pub use dispatch::Hub;
pub use error::{Error, Result};
pub use event::{Event, EventEnvelope};
pub use handler::{EventHandler, FnHandler, HandlerId, TypedFnHandler};
pub use registry::{HandlerSource, InMemoryRegistry, LifecycleState};
pub use report::{ExecutionOutcome, ExecutionResult, PublishReport};

/// Prelude module for convenient imports
///
/// # Example
/// ```rust
/// use event_hub::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bus::{EventBus, EventBusBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::event::{Event, EventEnvelope};
    pub use crate::handler::{EventHandler, HandlerId};
    pub use crate::report::{ExecutionOutcome, PublishReport};
}

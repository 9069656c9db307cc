//! The main EventBus implementation.
//!
//! The EventBus is the primary interface for subscribing handlers and
//! publishing events. It owns an in-core [`InMemoryRegistry`] and drives
//! the delivery pipeline in [`crate::dispatch`].

use crate::dispatch;
use crate::event::{Event, EventEnvelope};
use crate::handler::{EventHandler, TypedFnHandler};
use crate::registry::{HandlerSource, InMemoryRegistry};
use crate::report::PublishReport;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

pub mod builder;

pub use builder::EventBusBuilder;

/// An in-process publish/subscribe event bus.
///
/// Handlers subscribe against one exact event kind (or against all kinds,
/// via the catch-all set); publishing delivers one event to every matching
/// handler and returns a [`PublishReport`] describing each handler's fate.
/// A handler failure is captured into its result record and never fails
/// the publish call itself.
///
/// # Example
///
/// ```rust
/// use event_hub::{Event, EventBus};
///
/// #[derive(Debug)]
/// struct UserRegistered {
///     email: String,
/// }
///
/// impl Event for UserRegistered {
///     fn event_type() -> &'static str {
///         "UserRegistered"
///     }
/// }
///
/// let bus = EventBus::new();
///
/// let handler = bus.subscribe_fn(|event: &UserRegistered| {
///     println!("new user: {}", event.email);
///     Ok(())
/// });
///
/// let report = bus.publish(UserRegistered {
///     email: "user@example.com".into(),
/// });
/// assert!(report.all_executed());
///
/// bus.unsubscribe::<UserRegistered>(&handler);
/// bus.dispose();
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    registry: Arc<InMemoryRegistry>,
}

impl EventBus {
    /// Create a new event bus with an empty registry
    pub fn new() -> Self {
        Self {
            registry: Arc::new(InMemoryRegistry::new()),
        }
    }

    /// Create a new EventBus builder
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    pub(crate) fn with_registry(registry: Arc<InMemoryRegistry>) -> Self {
        Self { registry }
    }

    /// The shared registry backing this bus
    pub fn registry(&self) -> &Arc<InMemoryRegistry> {
        &self.registry
    }

    /// Subscribe a handler to events of kind `T`.
    ///
    /// Idempotent by handler identity: subscribing the same handler
    /// instance to the same kind twice adds nothing.
    pub fn subscribe<T: Event>(&self, handler: Arc<dyn EventHandler>) {
        self.registry.add_handler(T::kind(), handler);
    }

    /// Subscribe a closure to events of kind `T`.
    ///
    /// Returns the constructed handler so it can be unsubscribed or
    /// matched against report entries later.
    pub fn subscribe_fn<T, F>(&self, f: F) -> Arc<dyn EventHandler>
    where
        T: Event,
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        let handler: Arc<dyn EventHandler> = Arc::new(TypedFnHandler::new(f));
        self.subscribe::<T>(handler.clone());
        handler
    }

    /// Unsubscribe a handler from events of kind `T`; no-op if absent
    pub fn unsubscribe<T: Event>(&self, handler: &Arc<dyn EventHandler>) {
        self.registry.remove_handler(T::kind(), handler);
    }

    /// Register a handler that receives every event regardless of kind.
    ///
    /// Catch-all handlers run strictly after the kind-specific handlers of
    /// each publish call. Same identity-based idempotency as
    /// [`subscribe`](Self::subscribe).
    pub fn register_catch_all(&self, handler: Arc<dyn EventHandler>) {
        self.registry.add_catch_all(handler);
    }

    /// Unregister a catch-all handler; no-op if absent
    pub fn unregister_catch_all(&self, handler: &Arc<dyn EventHandler>) {
        self.registry.remove_catch_all(handler);
    }

    /// Current handlers for kind `T`, as a point-in-time materialization.
    ///
    /// Inspection and testing aid; empty once the bus is disposed.
    pub fn handlers_for<T: Event>(&self) -> Vec<Arc<dyn EventHandler>> {
        self.registry.handlers_for(T::kind())
    }

    /// Current catch-all handlers, as a point-in-time materialization
    pub fn catch_all_handlers(&self) -> Vec<Arc<dyn EventHandler>> {
        self.registry.catch_all_handlers()
    }

    /// Publish an event, blocking variant.
    ///
    /// Handlers run sequentially on the calling thread through their
    /// synchronous entry point; no executor is involved.
    pub fn publish<T: Event>(&self, event: T) -> PublishReport {
        dispatch::deliver(self.registry.as_ref(), &EventEnvelope::new(event))
    }

    /// Publish an event, awaiting each handler to completion in turn.
    ///
    /// Identical semantics and report shape as [`publish`](Self::publish).
    pub async fn publish_async<T: Event>(&self, event: T) -> PublishReport {
        dispatch::deliver_async(self.registry.as_ref(), &EventEnvelope::new(event)).await
    }

    /// Tear the bus down: clears every handler set, idempotently.
    ///
    /// After the first call, queries return empty and further
    /// subscriptions are accepted but have no effect. Never fails.
    pub fn dispose(&self) {
        debug!("Disposing event bus");
        self.registry.dispose();
    }

    /// Check whether disposal has begun
    pub fn is_disposed(&self) -> bool {
        use crate::registry::LifecycleState;
        self.registry.state() != LifecycleState::Active
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//! Handler traits, identity tokens, and function-based adapters.

use crate::{Error, Event, EventEnvelope, Result};
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Stable identity token for a handler.
///
/// Deduplication in the registry is by this token, not by reference
/// equality: a handler value generates its id once when constructed and
/// reports it through [`EventHandler::id`], so re-subscribing the same
/// instance is a no-op while a second, equal-looking instance is a
/// distinct entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

impl HandlerId {
    /// Generate a fresh handler id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandlerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trait for event handlers.
///
/// A handler consumes one event, producing no value and possibly failing.
/// The same trait serves both kind-specific handlers (subscribed against
/// one event kind) and catch-all handlers (registered against every kind);
/// the difference is only where the registry stores them.
///
/// [`handle`](Self::handle) is the synchronous entry point and is what the
/// blocking [`publish`](crate::bus::EventBus::publish) path drives — no
/// future is ever constructed there. [`handle_async`](Self::handle_async)
/// defaults to delegating to `handle`; a handler that genuinely needs to
/// await should override it and be delivered through
/// [`publish_async`](crate::bus::EventBus::publish_async).
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// The stable identity token of this handler
    fn id(&self) -> HandlerId;

    /// Get the handler name for logs and debugging
    fn name(&self) -> &str {
        "unnamed"
    }

    /// Consume an event synchronously
    fn handle(&self, envelope: &EventEnvelope) -> Result<()>;

    /// Consume an event asynchronously; defaults to the synchronous path
    async fn handle_async(&self, envelope: &EventEnvelope) -> Result<()> {
        self.handle(envelope)
    }
}

/// A function-based handler over raw envelopes.
///
/// Receives every envelope it is wired to unchanged, which makes it the
/// natural shape for catch-all registration.
pub struct FnHandler<F>
where
    F: Fn(&EventEnvelope) -> Result<()> + Send + Sync + 'static,
{
    id: HandlerId,
    name: String,
    function: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&EventEnvelope) -> Result<()> + Send + Sync + 'static,
{
    /// Create a new envelope handler
    pub fn new(function: F) -> Self {
        Self::with_name(function, "FnHandler")
    }

    /// Create a new envelope handler with a custom name
    pub fn with_name(function: F, name: impl Into<String>) -> Self {
        Self {
            id: HandlerId::new(),
            name: name.into(),
            function,
        }
    }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&EventEnvelope) -> Result<()> + Send + Sync + 'static,
{
    fn id(&self) -> HandlerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
        (self.function)(envelope)
    }
}

impl<F> fmt::Debug for FnHandler<F>
where
    F: Fn(&EventEnvelope) -> Result<()> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// A function-based handler bound to one event kind.
///
/// Downcasts the envelope before invoking the closure; a wrong-kind
/// envelope yields [`Error::KindMismatch`], which cannot happen when the
/// handler is resolved through the registry.
pub struct TypedFnHandler<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    id: HandlerId,
    name: String,
    function: F,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, F> TypedFnHandler<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    /// Create a new typed handler
    pub fn new(function: F) -> Self {
        Self::with_name(function, format!("TypedFnHandler<{}>", T::event_type()))
    }

    /// Create a new typed handler with a custom name
    pub fn with_name(function: F, name: impl Into<String>) -> Self {
        Self {
            id: HandlerId::new(),
            name: name.into(),
            function,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F> EventHandler for TypedFnHandler<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    fn id(&self) -> HandlerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
        match envelope.downcast_ref::<T>() {
            Some(event) => (self.function)(event),
            None => Err(Error::KindMismatch {
                expected: T::event_type(),
                actual: envelope.event_type(),
            }),
        }
    }
}

impl<T, F> fmt::Debug for TypedFnHandler<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFnHandler")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

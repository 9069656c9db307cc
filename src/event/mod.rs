//! Core event trait and the type-erased envelope.
//!
//! Events are plain values whose kind is an explicit static type tag: the
//! registry maps `TypeId` to handler sets, so a handler subscribed for kind
//! `K` is only ever invoked for exactly `K`.

use std::any::TypeId;
use std::fmt::Debug;

pub mod envelope;

pub use envelope::EventEnvelope;

/// Core trait that all events must implement.
///
/// Events are immutable payloads; the hub never inspects them beyond their
/// kind. They must be thread-safe and have a static lifetime so they can be
/// shared with every matching handler.
///
/// # Example
///
/// ```rust
/// use event_hub::Event;
///
/// #[derive(Debug)]
/// struct UserRegistered {
///     user_id: u64,
///     email: String,
/// }
///
/// impl Event for UserRegistered {
///     fn event_type() -> &'static str {
///         "UserRegistered"
///     }
/// }
/// ```
pub trait Event: Send + Sync + Debug + 'static {
    /// Returns the stable, human-readable name of this event kind.
    ///
    /// Used in logs and error messages; it should be unique per kind.
    fn event_type() -> &'static str
    where
        Self: Sized;

    /// The exact kind tag used for handler resolution.
    fn kind() -> TypeId
    where
        Self: Sized,
    {
        TypeId::of::<Self>()
    }
}

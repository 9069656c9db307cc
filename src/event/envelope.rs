//! Event envelope for type-erased delivery.

use crate::event::Event;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased wrapper around one event instance.
///
/// The envelope is what flows through the publish pipeline: it carries the
/// payload behind an `Arc` together with the exact kind captured at
/// construction time, so catch-all handlers can receive any event while
/// typed handlers can downcast safely.
#[derive(Clone)]
pub struct EventEnvelope {
    /// The type-erased event payload
    payload: Arc<dyn Any + Send + Sync>,

    /// Kind tag of the original event
    kind: TypeId,

    /// Human-readable kind name for logs and errors
    kind_name: &'static str,
}

impl EventEnvelope {
    /// Create a new envelope from an event
    pub fn new<T: Event>(event: T) -> Self {
        Self {
            payload: Arc::new(event),
            kind: T::kind(),
            kind_name: T::event_type(),
        }
    }

    /// Get the event kind name
    pub fn event_type(&self) -> &'static str {
        self.kind_name
    }

    /// Get the kind tag of the contained event
    pub fn kind(&self) -> TypeId {
        self.kind
    }

    /// Try to downcast to a specific event type
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        if self.kind == TypeId::of::<T>() {
            self.payload.downcast_ref::<T>()
        } else {
            None
        }
    }

    /// Try to extract a shared handle to the payload as a specific type
    pub fn payload_arc<T: Event>(&self) -> Option<Arc<T>> {
        if self.kind == TypeId::of::<T>() {
            Arc::downcast::<T>(self.payload.clone()).ok()
        } else {
            None
        }
    }

    /// Check if this envelope contains a specific event type
    pub fn is<T: Event>(&self) -> bool {
        self.kind == TypeId::of::<T>()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("kind_name", &self.kind_name)
            .finish()
    }
}

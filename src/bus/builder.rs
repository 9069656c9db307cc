//! Builder for configuring an EventBus.

use super::EventBus;
use crate::registry::InMemoryRegistry;
use std::sync::Arc;

/// Builder for creating a configured [`EventBus`].
///
/// # Example
///
/// ```rust
/// use event_hub::EventBus;
///
/// let bus = EventBus::builder()
///     .capacity(16)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct EventBusBuilder {
    registry: Option<Arc<InMemoryRegistry>>,
    capacity: Option<usize>,
}

impl EventBusBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing registry, shared with other buses or inspected
    /// directly in tests
    pub fn registry(mut self, registry: Arc<InMemoryRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Pre-allocate capacity for this many event kinds.
    ///
    /// Ignored when an explicit registry is supplied.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Build the event bus
    pub fn build(self) -> EventBus {
        let registry = self.registry.unwrap_or_else(|| {
            Arc::new(match self.capacity {
                Some(capacity) => InMemoryRegistry::with_capacity(capacity),
                None => InMemoryRegistry::new(),
            })
        });
        EventBus::with_registry(registry)
    }
}

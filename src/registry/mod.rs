//! Handler storage and the pluggable resolution contract.
//!
//! The publish pipeline only ever reads handlers through [`HandlerSource`];
//! the in-core [`InMemoryRegistry`] is the default implementation, but any
//! resolver that honors kind-exact matching can stand in (a configuration
//! table, a service locator). Identity-based deduplication is a guarantee
//! of the in-core registry only, not of the trait.

use crate::handler::EventHandler;
use std::any::TypeId;
use std::sync::Arc;

mod memory;

pub use memory::{InMemoryRegistry, LifecycleState};

/// Read-side contract the publish pipeline resolves handlers through.
///
/// Implementations must be thread-safe and must return point-in-time
/// materializations, never live views into mutable state: the returned
/// vectors are the snapshot a publish call will drive, regardless of
/// concurrent mutation.
pub trait HandlerSource: Send + Sync {
    /// All handlers currently registered for exactly `kind`
    fn handlers_for(&self, kind: TypeId) -> Vec<Arc<dyn EventHandler>>;

    /// All currently registered catch-all handlers
    fn catch_all_handlers(&self) -> Vec<Arc<dyn EventHandler>>;
}

impl<S: HandlerSource + ?Sized> HandlerSource for Arc<S> {
    fn handlers_for(&self, kind: TypeId) -> Vec<Arc<dyn EventHandler>> {
        self.as_ref().handlers_for(kind)
    }

    fn catch_all_handlers(&self) -> Vec<Arc<dyn EventHandler>> {
        self.as_ref().catch_all_handlers()
    }
}

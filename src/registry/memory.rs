//! DashMap-based in-memory registry with an idempotent teardown.

use super::HandlerSource;
use crate::handler::EventHandler;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

const STATE_ACTIVE: u8 = 0;
const STATE_DISPOSING: u8 = 1;
const STATE_DISPOSED: u8 = 2;

/// Lifecycle state of a registry.
///
/// Linear: `Active → Disposing → Disposed`, never backward. Once disposal
/// begins, mutations are silent no-ops and queries return empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Mutations and queries behave normally
    Active,
    /// Teardown has begun; externally identical to `Disposed`
    Disposing,
    /// Terminal state
    Disposed,
}

/// The in-core handler registry.
///
/// Maps each exact event kind to a deduplicated collection of handlers,
/// plus one deduplicated catch-all collection. Deduplication is by
/// [`HandlerId`](crate::handler::HandlerId): adding a handler whose id is
/// already present for that kind is a no-op.
///
/// Per-kind collections keep registration order, which makes publishes
/// deterministic; order is an implementation detail, not a contract.
pub struct InMemoryRegistry {
    /// Map from event kind to its handler set
    handlers: DashMap<TypeId, Vec<Arc<dyn EventHandler>>>,

    /// The catch-all handler set
    catch_all: RwLock<Vec<Arc<dyn EventHandler>>>,

    /// Lifecycle state, moves forward only
    state: AtomicU8,
}

impl InMemoryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            catch_all: RwLock::new(Vec::new()),
            state: AtomicU8::new(STATE_ACTIVE),
        }
    }

    /// Create a registry with pre-allocated capacity for event kinds
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handlers: DashMap::with_capacity(capacity),
            catch_all: RwLock::new(Vec::new()),
            state: AtomicU8::new(STATE_ACTIVE),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::Acquire) {
            STATE_ACTIVE => LifecycleState::Active,
            STATE_DISPOSING => LifecycleState::Disposing,
            _ => LifecycleState::Disposed,
        }
    }

    fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_ACTIVE
    }

    /// Insert `handler` into the set for `kind`.
    ///
    /// No-op if a handler with the same id is already registered for that
    /// kind, or once disposal has begun.
    pub fn add_handler(&self, kind: TypeId, handler: Arc<dyn EventHandler>) {
        if !self.is_active() {
            trace!(handler_id = %handler.id(), "Ignoring add on disposed registry");
            return;
        }

        let mut entry = self.handlers.entry(kind).or_default();
        if entry.iter().any(|h| h.id() == handler.id()) {
            trace!(handler_id = %handler.id(), "Handler already registered, skipping");
            return;
        }

        debug!(
            handler_id = %handler.id(),
            handler_name = handler.name(),
            "Handler registered"
        );
        entry.push(handler);
    }

    /// Remove `handler` from the set for `kind`.
    ///
    /// No-op if absent, if the kind was never registered, or once disposal
    /// has begun. Removing the last handler of a kind drops the kind entry.
    pub fn remove_handler(&self, kind: TypeId, handler: &Arc<dyn EventHandler>) {
        if !self.is_active() {
            return;
        }

        if let Some(mut entry) = self.handlers.get_mut(&kind) {
            entry.retain(|h| h.id() != handler.id());

            if entry.is_empty() {
                drop(entry);
                self.handlers.remove(&kind);
            }
        }

        debug!(handler_id = %handler.id(), "Handler unregistered");
    }

    /// Insert a catch-all handler; same dedup and no-op rules as
    /// [`add_handler`](Self::add_handler)
    pub fn add_catch_all(&self, handler: Arc<dyn EventHandler>) {
        if !self.is_active() {
            trace!(handler_id = %handler.id(), "Ignoring add on disposed registry");
            return;
        }

        let mut set = write_lock(&self.catch_all);
        if set.iter().any(|h| h.id() == handler.id()) {
            return;
        }

        debug!(
            handler_id = %handler.id(),
            handler_name = handler.name(),
            "Catch-all handler registered"
        );
        set.push(handler);
    }

    /// Remove a catch-all handler; no-op if absent or once disposal has begun
    pub fn remove_catch_all(&self, handler: &Arc<dyn EventHandler>) {
        if !self.is_active() {
            return;
        }

        write_lock(&self.catch_all).retain(|h| h.id() != handler.id());
        debug!(handler_id = %handler.id(), "Catch-all handler unregistered");
    }

    /// Number of handlers registered for `kind`
    pub fn handler_count(&self, kind: TypeId) -> usize {
        if !self.is_active() {
            return 0;
        }
        self.handlers.get(&kind).map(|e| e.len()).unwrap_or(0)
    }

    /// Tear the registry down.
    ///
    /// The first call clears every handler set and moves the state to
    /// `Disposed`; later calls are no-ops. Never fails.
    pub fn dispose(&self) {
        if self
            .state
            .compare_exchange(
                STATE_ACTIVE,
                STATE_DISPOSING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            trace!("Registry already disposed");
            return;
        }

        debug!("Disposing registry");
        self.handlers.clear();
        write_lock(&self.catch_all).clear();
        self.state.store(STATE_DISPOSED, Ordering::Release);
        debug!("Registry disposed");
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRegistry")
            .field("event_kinds", &self.handlers.len())
            .field("catch_all_handlers", &read_lock(&self.catch_all).len())
            .field("state", &self.state())
            .finish()
    }
}

impl HandlerSource for InMemoryRegistry {
    fn handlers_for(&self, kind: TypeId) -> Vec<Arc<dyn EventHandler>> {
        if !self.is_active() {
            return Vec::new();
        }
        self.handlers
            .get(&kind)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn catch_all_handlers(&self) -> Vec<Arc<dyn EventHandler>> {
        if !self.is_active() {
            return Vec::new();
        }
        read_lock(&self.catch_all).clone()
    }
}

// Handlers are never invoked while a lock is held, so a poisoned lock can
// only come from a panic inside Vec operations; recover the data either way.
fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use crate::{Event, EventEnvelope};

    #[derive(Debug)]
    struct TestEvent;

    impl Event for TestEvent {
        fn event_type() -> &'static str {
            "TestEvent"
        }
    }

    #[derive(Debug)]
    struct AnotherEvent;

    impl Event for AnotherEvent {
        fn event_type() -> &'static str {
            "AnotherEvent"
        }
    }

    fn noop(name: &str) -> Arc<dyn EventHandler> {
        Arc::new(FnHandler::with_name(|_: &EventEnvelope| Ok(()), name))
    }

    #[test]
    fn test_add_and_query() {
        let registry = InMemoryRegistry::new();
        let handler = noop("h1");

        registry.add_handler(TestEvent::kind(), handler.clone());

        let handlers = registry.handlers_for(TestEvent::kind());
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].id(), handler.id());
        assert!(registry.handlers_for(AnotherEvent::kind()).is_empty());
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let registry = InMemoryRegistry::new();
        let handler = noop("h1");

        registry.add_handler(TestEvent::kind(), handler.clone());
        registry.add_handler(TestEvent::kind(), handler.clone());

        assert_eq!(registry.handler_count(TestEvent::kind()), 1);

        // A distinct instance is a distinct entry even with the same shape.
        registry.add_handler(TestEvent::kind(), noop("h1"));
        assert_eq!(registry.handler_count(TestEvent::kind()), 2);
    }

    #[test]
    fn test_remove() {
        let registry = InMemoryRegistry::new();
        let handler = noop("h1");

        registry.add_handler(TestEvent::kind(), handler.clone());
        registry.remove_handler(TestEvent::kind(), &handler);

        assert!(registry.handlers_for(TestEvent::kind()).is_empty());

        // Absent handler and unknown kind are silent no-ops.
        registry.remove_handler(TestEvent::kind(), &handler);
        registry.remove_handler(AnotherEvent::kind(), &handler);
    }

    #[test]
    fn test_catch_all_set() {
        let registry = InMemoryRegistry::new();
        let handler = noop("audit");

        registry.add_catch_all(handler.clone());
        registry.add_catch_all(handler.clone());
        assert_eq!(registry.catch_all_handlers().len(), 1);

        registry.remove_catch_all(&handler);
        assert!(registry.catch_all_handlers().is_empty());
    }

    #[test]
    fn test_snapshot_is_not_live() {
        let registry = InMemoryRegistry::new();
        let handler = noop("h1");
        registry.add_handler(TestEvent::kind(), handler.clone());

        let snapshot = registry.handlers_for(TestEvent::kind());
        registry.remove_handler(TestEvent::kind(), &handler);

        assert_eq!(snapshot.len(), 1);
        assert!(registry.handlers_for(TestEvent::kind()).is_empty());
    }

    #[test]
    fn test_dispose_clears_and_freezes() {
        let registry = InMemoryRegistry::new();
        registry.add_handler(TestEvent::kind(), noop("h1"));
        registry.add_catch_all(noop("audit"));

        assert_eq!(registry.state(), LifecycleState::Active);
        registry.dispose();
        assert_eq!(registry.state(), LifecycleState::Disposed);

        assert!(registry.handlers_for(TestEvent::kind()).is_empty());
        assert!(registry.catch_all_handlers().is_empty());
        assert_eq!(registry.handler_count(TestEvent::kind()), 0);

        // Mutations after disposal are accepted but have no effect.
        registry.add_handler(TestEvent::kind(), noop("late"));
        registry.add_catch_all(noop("late"));
        assert!(registry.handlers_for(TestEvent::kind()).is_empty());
        assert!(registry.catch_all_handlers().is_empty());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let registry = InMemoryRegistry::new();
        registry.dispose();
        registry.dispose();
        assert_eq!(registry.state(), LifecycleState::Disposed);
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = InMemoryRegistry::new();
        let first = noop("first");
        let second = noop("second");

        registry.add_handler(TestEvent::kind(), first.clone());
        registry.add_handler(TestEvent::kind(), second.clone());

        let handlers = registry.handlers_for(TestEvent::kind());
        assert_eq!(handlers[0].id(), first.id());
        assert_eq!(handlers[1].id(), second.id());
    }
}

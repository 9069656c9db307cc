//! The publish pipeline: snapshot, invoke, isolate, report.
//!
//! Both entry points run the same algorithm. [`deliver`] is genuinely
//! synchronous (it drives [`EventHandler::handle`] and never constructs a
//! future, so it is safe under single-threaded hosts with no executor);
//! [`deliver_async`] drives [`EventHandler::handle_async`], awaiting each
//! handler to completion before the next one starts.

use crate::event::{Event, EventEnvelope};
use crate::handler::EventHandler;
use crate::registry::HandlerSource;
use crate::report::{ExecutionResult, PublishReport};
use chrono::Utc;
use std::sync::Arc;
use tracing::{trace, warn};

/// Deliver one envelope through `source`, blocking variant.
///
/// The handler sets are snapshotted once at call time; kind-specific
/// handlers run first, catch-all handlers strictly after. A handler failure
/// is captured into its result record and never skips the remaining
/// handlers.
pub fn deliver(source: &dyn HandlerSource, envelope: &EventEnvelope) -> PublishReport {
    let handlers = source.handlers_for(envelope.kind());
    let catch_all = source.catch_all_handlers();

    trace!(
        event_kind = envelope.event_type(),
        handlers = handlers.len(),
        catch_all = catch_all.len(),
        "Delivering event"
    );

    let started_at = Utc::now();

    let handler_results = handlers
        .into_iter()
        .map(|handler| invoke(handler, envelope))
        .collect();

    let catch_all_results = catch_all
        .into_iter()
        .map(|handler| invoke(handler, envelope))
        .collect();

    let finished_at = Utc::now();

    PublishReport {
        handler_results,
        catch_all_results,
        started_at,
        finished_at,
    }
}

/// Deliver one envelope through `source`, awaiting each handler in turn.
///
/// Identical semantics and report shape as [`deliver`].
pub async fn deliver_async(source: &dyn HandlerSource, envelope: &EventEnvelope) -> PublishReport {
    let handlers = source.handlers_for(envelope.kind());
    let catch_all = source.catch_all_handlers();

    trace!(
        event_kind = envelope.event_type(),
        handlers = handlers.len(),
        catch_all = catch_all.len(),
        "Delivering event"
    );

    let started_at = Utc::now();

    let mut handler_results = Vec::with_capacity(handlers.len());
    for handler in handlers {
        handler_results.push(invoke_async(handler, envelope).await);
    }

    let mut catch_all_results = Vec::with_capacity(catch_all.len());
    for handler in catch_all {
        catch_all_results.push(invoke_async(handler, envelope).await);
    }

    let finished_at = Utc::now();

    PublishReport {
        handler_results,
        catch_all_results,
        started_at,
        finished_at,
    }
}

fn invoke(handler: Arc<dyn EventHandler>, envelope: &EventEnvelope) -> ExecutionResult {
    match handler.handle(envelope) {
        Ok(()) => {
            trace!(handler_id = %handler.id(), "Handler executed");
            ExecutionResult::executed(handler)
        }
        Err(e) => {
            warn!(
                handler_id = %handler.id(),
                handler_name = handler.name(),
                error = %e,
                "Handler failed"
            );
            ExecutionResult::failed(handler, e)
        }
    }
}

async fn invoke_async(handler: Arc<dyn EventHandler>, envelope: &EventEnvelope) -> ExecutionResult {
    match handler.handle_async(envelope).await {
        Ok(()) => {
            trace!(handler_id = %handler.id(), "Handler executed");
            ExecutionResult::executed(handler)
        }
        Err(e) => {
            warn!(
                handler_id = %handler.id(),
                handler_name = handler.name(),
                error = %e,
                "Handler failed"
            );
            ExecutionResult::failed(handler, e)
        }
    }
}

/// A publisher over an arbitrary [`HandlerSource`].
///
/// Use this when handlers are resolved from somewhere other than the
/// in-core registry, such as a configuration-driven wiring table or a
/// service locator. The hub promises kind-exact matching through the
/// source; identity-based deduplication is up to the source itself.
#[derive(Debug)]
pub struct Hub<S: HandlerSource> {
    source: S,
}

impl<S: HandlerSource> Hub<S> {
    /// Create a hub over a handler source
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Access the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Publish an event, blocking variant
    pub fn publish<T: Event>(&self, event: T) -> PublishReport {
        deliver(&self.source, &EventEnvelope::new(event))
    }

    /// Publish an event, awaiting each handler in turn
    pub async fn publish_async<T: Event>(&self, event: T) -> PublishReport {
        deliver_async(&self.source, &EventEnvelope::new(event)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{FnHandler, TypedFnHandler};
    use crate::Error;
    use std::any::TypeId;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct TextEvent {
        text: String,
    }

    impl Event for TextEvent {
        fn event_type() -> &'static str {
            "TextEvent"
        }
    }

    /// A fixed source, standing in for an external resolver.
    struct FixedSource {
        handlers: Vec<Arc<dyn EventHandler>>,
        catch_all: Vec<Arc<dyn EventHandler>>,
        kind: TypeId,
    }

    impl HandlerSource for FixedSource {
        fn handlers_for(&self, kind: TypeId) -> Vec<Arc<dyn EventHandler>> {
            if kind == self.kind {
                self.handlers.clone()
            } else {
                Vec::new()
            }
        }

        fn catch_all_handlers(&self) -> Vec<Arc<dyn EventHandler>> {
            self.catch_all.clone()
        }
    }

    #[test]
    fn test_hub_over_custom_source() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let seen_typed = seen.clone();
        let typed: Arc<dyn EventHandler> = Arc::new(TypedFnHandler::new(move |e: &TextEvent| {
            seen_typed.lock().unwrap().push(format!("typed:{}", e.text));
            Ok(())
        }));

        let seen_all = seen.clone();
        let audit: Arc<dyn EventHandler> = Arc::new(FnHandler::new(move |e: &EventEnvelope| {
            seen_all.lock().unwrap().push(format!("audit:{}", e.event_type()));
            Ok(())
        }));

        let hub = Hub::new(FixedSource {
            handlers: vec![typed],
            catch_all: vec![audit],
            kind: TextEvent::kind(),
        });

        let report = hub.publish(TextEvent { text: "hi".into() });

        assert_eq!(report.handler_results.len(), 1);
        assert_eq!(report.catch_all_results.len(), 1);
        assert!(report.all_executed());
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["typed:hi".to_string(), "audit:TextEvent".to_string()]
        );
    }

    #[test]
    fn test_failure_is_isolated() {
        let failing: Arc<dyn EventHandler> = Arc::new(TypedFnHandler::new(|_: &TextEvent| {
            Err(Error::handler("always broken"))
        }));
        let count = Arc::new(Mutex::new(0));
        let count_clone = count.clone();
        let healthy: Arc<dyn EventHandler> = Arc::new(TypedFnHandler::new(move |_: &TextEvent| {
            *count_clone.lock().unwrap() += 1;
            Ok(())
        }));

        let hub = Hub::new(FixedSource {
            handlers: vec![failing, healthy],
            catch_all: Vec::new(),
            kind: TextEvent::kind(),
        });

        let report = hub.publish(TextEvent { text: "x".into() });

        assert_eq!(report.handler_results.len(), 2);
        assert!(!report.handler_results[0].is_executed());
        assert!(report.handler_results[0].error.is_some());
        assert!(report.handler_results[1].is_executed());
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_async_delivery_matches_sync() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let o = order.clone();
        let typed: Arc<dyn EventHandler> = Arc::new(TypedFnHandler::new(move |_: &TextEvent| {
            o.lock().unwrap().push("kind");
            Ok(())
        }));
        let o = order.clone();
        let audit: Arc<dyn EventHandler> = Arc::new(FnHandler::new(move |_: &EventEnvelope| {
            o.lock().unwrap().push("catch-all");
            Ok(())
        }));

        let hub = Hub::new(FixedSource {
            handlers: vec![typed],
            catch_all: vec![audit],
            kind: TextEvent::kind(),
        });

        let report = hub.publish_async(TextEvent { text: "y".into() }).await;

        assert!(report.all_executed());
        assert!(report.started_at <= report.finished_at);
        // Catch-all handlers run strictly after kind-specific ones.
        assert_eq!(*order.lock().unwrap(), vec!["kind", "catch-all"]);
    }
}

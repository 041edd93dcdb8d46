//! Named publish/subscribe registry for inbound host events.
//!
//! Handlers for one event name run in registration order. Each dispatch
//! iterates over a snapshot of the handler list, so handlers may subscribe
//! or cancel (themselves or others) while a dispatch is in progress.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, warn};

use overlay_common::InboundEvent;

/// A subscriber callback.
pub type Handler = Arc<dyn Fn(&InboundEvent) -> overlay_common::Result<()> + Send + Sync>;

struct Entry {
    id: u64,
    handler: Handler,
    once: bool,
    active: AtomicBool,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<String, Vec<Arc<Entry>>>,
}

impl Registry {
    fn remove(&mut self, name: &str, id: u64) {
        if let Some(list) = self.handlers.get_mut(name) {
            list.retain(|e| e.id != id);
            if list.is_empty() {
                self.handlers.remove(name);
            }
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Handlers never run under the lock, so a poisoned registry is still consistent.
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

/// Event bus shared by every mounted overlay. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a persistent handler for `name`.
    pub fn on<F>(&self, name: &str, handler: F) -> Subscription
    where
        F: Fn(&InboundEvent) -> overlay_common::Result<()> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(handler), false)
    }

    /// Register a handler that is removed before its first invocation.
    pub fn once<F>(&self, name: &str, handler: F) -> Subscription
    where
        F: Fn(&InboundEvent) -> overlay_common::Result<()> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(handler), true)
    }

    fn register(&self, name: &str, handler: Handler, once: bool) -> Subscription {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        let entry = Arc::new(Entry {
            id,
            handler,
            once,
            active: AtomicBool::new(true),
        });
        registry
            .handlers
            .entry(name.to_string())
            .or_default()
            .push(Arc::clone(&entry));
        debug!(event = name, id, once, "handler registered");

        Subscription {
            name: name.to_string(),
            entry,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invoke every handler registered for `event.name`.
    ///
    /// Handler errors and panics are logged and do not stop the dispatch.
    /// Returns the number of handlers that completed successfully.
    pub fn dispatch(&self, event: &InboundEvent) -> usize {
        let snapshot: Vec<Arc<Entry>> = {
            let mut registry = lock(&self.registry);
            let Some(list) = registry.handlers.get_mut(&event.name) else {
                debug!(event = %event.name, "no handlers for event");
                return 0;
            };
            let snapshot = list.clone();
            list.retain(|e| !e.once);
            if list.is_empty() {
                registry.handlers.remove(&event.name);
            }
            snapshot
        };

        let mut completed = 0;
        for entry in snapshot {
            let live = if entry.once {
                entry.active.swap(false, Ordering::AcqRel)
            } else {
                entry.active.load(Ordering::Acquire)
            };
            if !live {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| (entry.handler)(event))) {
                Ok(Ok(())) => completed += 1,
                Ok(Err(e)) => {
                    warn!(event = %event.name, id = entry.id, error = %e, "handler failed");
                }
                Err(panic) => {
                    warn!(
                        event = %event.name,
                        id = entry.id,
                        panic = %panic_message(&*panic),
                        "handler panicked"
                    );
                }
            }
        }
        completed
    }

    /// Number of live handlers for `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        lock(&self.registry)
            .handlers
            .get(name)
            .map(|list| {
                list.iter()
                    .filter(|e| e.active.load(Ordering::Acquire))
                    .count()
            })
            .unwrap_or(0)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Disposer for one registration.
///
/// Dropping a `Subscription` leaves the handler registered; call
/// [`Subscription::cancel`] or keep it in a [`SubscriptionSet`].
pub struct Subscription {
    name: String,
    entry: Arc<Entry>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn event_name(&self) -> &str {
        &self.name
    }

    /// `false` once cancelled, or once a `once` handler has fired.
    pub fn is_active(&self) -> bool {
        self.entry.active.load(Ordering::Acquire)
    }

    /// Remove the handler. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        self.entry.active.store(false, Ordering::Release);
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.name, self.entry.id);
        }
    }
}

/// The subscriptions owned by one mounted component.
///
/// All of them are cancelled on [`SubscriptionSet::clear`] or on drop.
#[derive(Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn clear(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::OverlayError;
    use serde_json::{json, Value};
    use std::sync::Mutex as StdMutex;

    fn event(name: &str) -> InboundEvent {
        InboundEvent::new(name, Value::Null)
    }

    fn recorder() -> (Arc<StdMutex<Vec<String>>>, impl Fn(&str) -> Handler) {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let make = move |tag: &str| -> Handler {
            let log = Arc::clone(&log2);
            let tag = tag.to_string();
            Arc::new(move |_: &InboundEvent| {
                log.lock().unwrap().push(tag.clone());
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        let c = make("c");
        bus.on("textUi", move |e| a(e));
        bus.on("textUi", move |e| b(e));
        bus.on("textUi", move |e| c(e));

        assert_eq!(bus.dispatch(&event("textUi")), 3);
        assert_eq!(*log.lock().unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn dispatch_only_reaches_matching_name() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let a = make("alert");
        bus.on("sendAlert", move |e| a(e));

        assert_eq!(bus.dispatch(&event("textUi")), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn handler_receives_payload() {
        let bus = EventBus::new();
        let seen = Arc::new(StdMutex::new(Value::Null));
        let seen2 = Arc::clone(&seen);
        bus.on("progress", move |e| {
            *seen2.lock().unwrap() = e.payload.clone();
            Ok(())
        });

        bus.dispatch(&InboundEvent::new("progress", json!({"duration": 100})));
        assert_eq!(*seen.lock().unwrap(), json!({"duration": 100}));
    }

    #[test]
    fn once_fires_a_single_time() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let a = make("once");
        let sub = bus.once("hideContext", move |e| a(e));

        bus.dispatch(&event("hideContext"));
        bus.dispatch(&event("hideContext"));
        assert_eq!(*log.lock().unwrap(), ["once"]);
        assert!(!sub.is_active());
        assert_eq!(bus.handler_count("hideContext"), 0);
    }

    #[test]
    fn once_handler_resubscribing_itself_is_not_retriggered_by_same_message() {
        let bus = EventBus::new();
        let count = Arc::new(StdMutex::new(0));
        let bus2 = bus.clone();
        let count2 = Arc::clone(&count);
        bus.once("showContext", move |_| {
            *count2.lock().unwrap() += 1;
            let count3 = Arc::clone(&count2);
            bus2.once("showContext", move |_| {
                *count3.lock().unwrap() += 1;
                Ok(())
            });
            Ok(())
        });

        bus.dispatch(&event("showContext"));
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(bus.handler_count("showContext"), 1);

        bus.dispatch(&event("showContext"));
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn cancel_removes_handler() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let a = make("a");
        let sub = bus.on("textUiHide", move |e| a(e));
        assert_eq!(bus.handler_count("textUiHide"), 1);

        sub.cancel();
        sub.cancel();
        bus.dispatch(&event("textUiHide"));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(bus.handler_count("textUiHide"), 0);
    }

    #[test]
    fn handler_cancelling_itself_mid_dispatch_keeps_others_running() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let slot: Arc<StdMutex<Option<Subscription>>> = Arc::new(StdMutex::new(None));
        let slot2 = Arc::clone(&slot);
        let first = bus.on("progress", move |_| {
            if let Some(sub) = slot2.lock().unwrap().take() {
                sub.cancel();
            }
            Ok(())
        });
        *slot.lock().unwrap() = Some(first);
        let b = make("second");
        bus.on("progress", move |e| b(e));

        assert_eq!(bus.dispatch(&event("progress")), 2);
        assert_eq!(*log.lock().unwrap(), ["second"]);
        assert_eq!(bus.handler_count("progress"), 1);
    }

    #[test]
    fn handler_cancelled_by_earlier_handler_is_skipped() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let victim_slot: Arc<StdMutex<Option<Subscription>>> = Arc::new(StdMutex::new(None));
        let slot2 = Arc::clone(&victim_slot);
        bus.on("closeAlertDialog", move |_| {
            if let Some(sub) = slot2.lock().unwrap().as_ref() {
                sub.cancel();
            }
            Ok(())
        });
        let v = make("victim");
        let victim = bus.on("closeAlertDialog", move |e| v(e));
        *victim_slot.lock().unwrap() = Some(victim);

        assert_eq!(bus.dispatch(&event("closeAlertDialog")), 1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn failing_and_panicking_handlers_are_contained() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.on("openDialog", |_| Err(OverlayError::Handler("boom".into())));
        bus.on("openDialog", |_| panic!("handler exploded"));
        let c = make("survivor");
        bus.on("openDialog", move |e| c(e));

        assert_eq!(bus.dispatch(&event("openDialog")), 1);
        assert_eq!(*log.lock().unwrap(), ["survivor"]);

        // The bus keeps working afterwards.
        assert_eq!(bus.dispatch(&event("openDialog")), 1);
    }

    #[test]
    fn subscription_set_cancels_everything_on_drop() {
        let bus = EventBus::new();
        {
            let mut set = SubscriptionSet::new();
            set.push(bus.on("sendAlert", |_| Ok(())));
            set.push(bus.on("closeAlertDialog", |_| Ok(())));
            set.push(bus.once("sendAlert", |_| Ok(())));
            assert_eq!(set.len(), 3);
            assert_eq!(bus.handler_count("sendAlert"), 2);
        }
        assert_eq!(bus.handler_count("sendAlert"), 0);
        assert_eq!(bus.handler_count("closeAlertDialog"), 0);
    }

    #[test]
    fn subscription_outliving_bus_cancels_quietly() {
        let bus = EventBus::new();
        let sub = bus.on("textUi", |_| Ok(()));
        drop(bus);
        sub.cancel();
        assert!(!sub.is_active());
        assert_eq!(sub.event_name(), "textUi");
    }
}

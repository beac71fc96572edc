//! Typed publish/subscribe channel between animation producers and consumers.
//!
//! # Usage
//!
//! ```
//! use rune_motion::bus::EventBus;
//!
//! let bus: EventBus<u32> = EventBus::new();
//! let sub = bus.subscribe(|value| println!("got {}", value));
//! bus.emit(&7);
//! sub.unsubscribe();
//! ```
//!
//! # Delivery guarantees
//!
//! - Handlers run in subscription order.
//! - `emit` snapshots the subscriber list first, so handlers that subscribe or
//!   unsubscribe while an event is being delivered only affect later emits.
//! - A panicking handler is caught and logged; remaining handlers still run
//!   and the panic never reaches the emitter.
//!
//! The bus is single-threaded. Cloning an `EventBus` yields another handle to
//! the same subscriber list.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

struct BusInner<E> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(u64, Handler<E>)>>,
}

/// Shared handle to a list of event handlers.
pub struct EventBus<E> {
    inner: Rc<BusInner<E>>,
}

impl<E> EventBus<E> {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                next_id: Cell::new(1),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a handler. It stays subscribed until
    /// [`Subscription::unsubscribe`] or [`EventBus::clear`] is called;
    /// dropping the returned handle does not unsubscribe.
    pub fn subscribe<F>(&self, handler: F) -> Subscription<E>
    where
        F: Fn(&E) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.handlers.borrow_mut().push((id, Rc::new(handler)));

        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every handler subscribed at the time of the call.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Handler<E>> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in snapshot {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                tracing::error!(panic = %panic_message(&*payload), "event handler panicked");
            }
        }
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.inner.handlers.borrow_mut().clear();
    }

    /// Number of subscribed handlers.
    pub fn len(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle returned by [`EventBus::subscribe`].
pub struct Subscription<E> {
    id: u64,
    bus: Weak<BusInner<E>>,
}

impl<E> Subscription<E> {
    /// Remove the handler from its bus. Calling this more than once, or after
    /// the bus is gone, does nothing.
    pub fn unsubscribe(&self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.handlers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let active = bus.handlers.borrow().iter().any(|(id, _)| *id == self.id);
        active
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&u32)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let make = move |tag: &str| -> Box<dyn Fn(&u32)> {
            let log = Rc::clone(&log_clone);
            let tag = tag.to_string();
            Box::new(move |v: &u32| log.borrow_mut().push(format!("{}:{}", tag, v)))
        };
        (log, make)
    }

    #[test]
    fn test_fifo_delivery() {
        let bus: EventBus<u32> = EventBus::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        let c = make("c");
        bus.subscribe(move |v| a(v));
        bus.subscribe(move |v| b(v));
        bus.subscribe(move |v| c(v));

        bus.emit(&1);
        assert_eq!(*log.borrow(), vec!["a:1", "b:1", "c:1"]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus: EventBus<u32> = EventBus::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        let sub_a = bus.subscribe(move |v| a(v));
        bus.subscribe(move |v| b(v));

        sub_a.unsubscribe();
        assert!(!sub_a.is_active());
        sub_a.unsubscribe();

        bus.emit(&2);
        assert_eq!(*log.borrow(), vec!["b:2"]);
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let bus: EventBus<u32> = EventBus::new();
        let (log, make) = recorder();
        let a = make("a");
        let c = make("c");
        bus.subscribe(move |v| a(v));
        bus.subscribe(|_| panic!("consumer bug"));
        bus.subscribe(move |v| c(v));

        bus.emit(&3);
        assert_eq!(*log.borrow(), vec!["a:3", "c:3"]);
    }

    #[test]
    fn test_subscribe_during_emit_not_delivered() {
        let bus: EventBus<u32> = EventBus::new();
        let late_calls = Rc::new(Cell::new(0));

        let bus_clone = bus.clone();
        let late = Rc::clone(&late_calls);
        bus.subscribe(move |_| {
            let late = Rc::clone(&late);
            bus_clone.subscribe(move |_| late.set(late.get() + 1));
        });

        bus.emit(&1);
        assert_eq!(late_calls.get(), 0);
        assert_eq!(bus.len(), 2);

        bus.emit(&2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_unsubscribe_during_emit_keeps_snapshot() {
        let bus: EventBus<u32> = EventBus::new();
        let second_calls = Rc::new(Cell::new(0));

        let victim: Rc<RefCell<Option<Subscription<u32>>>> = Rc::new(RefCell::new(None));
        let victim_clone = Rc::clone(&victim);
        bus.subscribe(move |_| {
            if let Some(sub) = victim_clone.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        let calls = Rc::clone(&second_calls);
        *victim.borrow_mut() = Some(bus.subscribe(move |_| calls.set(calls.get() + 1)));

        bus.emit(&1);
        assert_eq!(second_calls.get(), 1);

        bus.emit(&2);
        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn test_clear() {
        let bus: EventBus<u32> = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = bus.subscribe(move |_: &u32| h.set(h.get() + 1));

        bus.clear();
        assert!(bus.is_empty());
        assert!(!sub.is_active());
        bus.emit(&1);
        assert_eq!(hits.get(), 0);
    }
}

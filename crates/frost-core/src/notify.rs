//! Property-change notifications with RAII subscriptions
//!
//! Every `subscribe` returns a [`Subscription`]; releasing or dropping it is
//! the only way to unsubscribe. The hub holds listeners weakly, so a listener
//! that has been dropped is never called even if a subscription leaked.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

use crate::host::{NodeId, Property};

/// Value carried by a notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Scalar(f64),
    Vector([f64; 2]),
    /// Event without a payload (screen entered, popup opening, ...)
    Event,
}

/// One delivered notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub node: NodeId,
    pub property: Property,
    pub value: PropertyValue,
    pub at: Instant,
}

/// Receiver of notifications
pub trait ChangeListener {
    fn on_change(&self, change: &Change);
}

/// Handle for one live subscription; unsubscribes when released or dropped
pub struct Subscription {
    node: NodeId,
    property: Property,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a provider-specific unsubscribe action
    pub fn new(node: NodeId, property: Property, release: impl FnOnce() + 'static) -> Self {
        Self {
            node,
            property,
            release: Some(Box::new(release)),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn property(&self) -> Property {
        self.property
    }

    /// Unsubscribe now
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("node", &self.node)
            .field("property", &self.property)
            .field("live", &self.release.is_some())
            .finish()
    }
}

/// Source of property-change subscriptions
pub trait NotificationProvider {
    fn subscribe(
        &self,
        node: NodeId,
        property: Property,
        listener: Weak<dyn ChangeListener>,
    ) -> Subscription;
}

struct Entry {
    id: u64,
    listener: Weak<dyn ChangeListener>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    entries: HashMap<(NodeId, Property), Vec<Entry>>,
}

impl HubInner {
    fn remove(&mut self, key: (NodeId, Property), id: u64) {
        if let Some(list) = self.entries.get_mut(&key) {
            list.retain(|e| e.id != id);
            if list.is_empty() {
                self.entries.remove(&key);
            }
        }
    }
}

/// In-process notification hub a host embeds and feeds with `emit`
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Rc<RefCell<HubInner>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a change to every live listener of `(node, property)`.
    /// Returns the number of listeners called.
    pub fn emit(&self, node: NodeId, property: Property, value: PropertyValue, at: Instant) -> usize {
        // Collect first so listeners may subscribe/unsubscribe re-entrantly
        let listeners: Vec<Rc<dyn ChangeListener>> = {
            let inner = self.inner.borrow();
            inner
                .entries
                .get(&(node, property))
                .map(|list| list.iter().filter_map(|e| e.listener.upgrade()).collect())
                .unwrap_or_default()
        };

        let change = Change {
            node,
            property,
            value,
            at,
        };
        for listener in &listeners {
            listener.on_change(&change);
        }
        listeners.len()
    }

    /// Number of registered subscriptions across all nodes
    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().entries.values().map(Vec::len).sum()
    }

    /// Number of registered subscriptions on one node
    pub fn subscriptions_on(&self, node: NodeId) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|((n, _), _)| *n == node)
            .map(|(_, list)| list.len())
            .sum()
    }
}

impl NotificationProvider for NotificationHub {
    fn subscribe(
        &self,
        node: NodeId,
        property: Property,
        listener: Weak<dyn ChangeListener>,
    ) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .entries
                .entry((node, property))
                .or_default()
                .push(Entry { id, listener });
            id
        };

        let registry = Rc::downgrade(&self.inner);
        Subscription::new(node, property, move || {
            // Hub already gone: nothing left to unsubscribe from
            if let Some(inner) = registry.upgrade() {
                inner.borrow_mut().remove((node, property), id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter {
        hits: Cell<usize>,
    }

    impl ChangeListener for Counter {
        fn on_change(&self, _change: &Change) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    fn weak(counter: &Rc<Counter>) -> Weak<dyn ChangeListener> {
        let listener: Rc<dyn ChangeListener> = counter.clone();
        Rc::downgrade(&listener)
    }

    #[test]
    fn test_emit_reaches_subscriber() {
        let hub = NotificationHub::new();
        let counter = Rc::new(Counter::default());
        let _sub = hub.subscribe(NodeId(1), Property::Size, weak(&counter));

        let n = hub.emit(NodeId(1), Property::Size, PropertyValue::Scalar(1.0), Instant::now());
        assert_eq!(n, 1);
        assert_eq!(counter.hits.get(), 1);

        // Different property on the same node is not delivered
        hub.emit(NodeId(1), Property::Position, PropertyValue::Event, Instant::now());
        assert_eq!(counter.hits.get(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = NotificationHub::new();
        let counter = Rc::new(Counter::default());
        let sub = hub.subscribe(NodeId(1), Property::Size, weak(&counter));
        assert_eq!(hub.subscription_count(), 1);

        drop(sub);
        assert_eq!(hub.subscription_count(), 0);
        hub.emit(NodeId(1), Property::Size, PropertyValue::Event, Instant::now());
        assert_eq!(counter.hits.get(), 0);
    }

    #[test]
    fn test_dead_listener_not_called() {
        let hub = NotificationHub::new();
        let counter = Rc::new(Counter::default());
        let _sub = hub.subscribe(NodeId(3), Property::Position, weak(&counter));
        drop(counter);

        let n = hub.emit(NodeId(3), Property::Position, PropertyValue::Event, Instant::now());
        assert_eq!(n, 0);
    }

    #[test]
    fn test_release_after_hub_dropped_is_noop() {
        let hub = NotificationHub::new();
        let counter = Rc::new(Counter::default());
        let sub = hub.subscribe(NodeId(1), Property::Size, weak(&counter));
        drop(hub);
        sub.release();
    }

    #[test]
    fn test_subscriptions_on_node() {
        let hub = NotificationHub::new();
        let counter = Rc::new(Counter::default());
        let _a = hub.subscribe(NodeId(1), Property::Size, weak(&counter));
        let _b = hub.subscribe(NodeId(1), Property::Position, weak(&counter));
        let _c = hub.subscribe(NodeId(2), Property::Size, weak(&counter));
        assert_eq!(hub.subscriptions_on(NodeId(1)), 2);
        assert_eq!(hub.subscriptions_on(NodeId(2)), 1);
    }
}

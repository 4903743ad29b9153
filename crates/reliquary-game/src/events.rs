//! Synchronous observer lists
//!
//! Every component publishes its notifications on an [`EventChannel`].
//! Emission is synchronous: subscribers run immediately, once per event, in
//! the order they subscribed. Nothing is queued or batched across ticks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventChannel::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of callbacks for one event type
pub struct EventChannel<E> {
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
    next_id: u64,
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a subscriber to the end of the list
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `true` if it was present.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to every subscriber in subscription order
    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: Clone + 'static> EventChannel<E> {
    /// Subscribe a log that collects a copy of every event
    pub fn record(&mut self) -> Rc<RefCell<Vec<E>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        self.subscribe(move |event: &E| sink.borrow_mut().push(event.clone()));
        log
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let mut channel = EventChannel::<u32>::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        channel.subscribe(move |v| first.borrow_mut().push(("first", *v)));
        let second = Rc::clone(&order);
        channel.subscribe(move |v| second.borrow_mut().push(("second", *v)));

        channel.emit(&7);
        assert_eq!(*order.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut channel = EventChannel::<u32>::new();
        let log = channel.record();
        let id = channel.subscribe(|_| panic!("should have been removed"));

        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));
        channel.emit(&1);
        assert_eq!(*log.borrow(), vec![1]);
        assert_eq!(channel.subscriber_count(), 1);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let mut channel = EventChannel::<String>::default();
        channel.emit(&"nobody listens".to_string());
        assert_eq!(channel.subscriber_count(), 0);
    }
}

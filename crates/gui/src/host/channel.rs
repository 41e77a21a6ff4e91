//! Single-threaded publish/subscribe queues.
//!
//! A [`Subscription`] owns one queue inside its [`Channel`]. Dropping the
//! subscription removes the queue, so releasing a listener is deterministic.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

struct Inner<T> {
    next_id: u64,
    queues: BTreeMap<u64, VecDeque<T>>,
}

/// Fan-out event queue: every published event is delivered to each live
/// subscription, in publish order.
pub struct Channel<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                queues: BTreeMap::new(),
            })),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.queues.insert(id, VecDeque::new());
        Subscription {
            id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().queues.len()
    }
}

impl<T: Clone> Channel<T> {
    pub fn publish(&self, event: T) {
        let mut inner = self.inner.borrow_mut();
        for queue in inner.queues.values_mut() {
            queue.push_back(event.clone());
        }
    }
}

/// Handle to one queue of a [`Channel`]
pub struct Subscription<T> {
    id: u64,
    inner: Weak<RefCell<Inner<T>>>,
}

impl<T> Subscription<T> {
    /// Take every pending event, oldest first
    pub fn drain(&self) -> Vec<T> {
        let Some(inner) = self.inner.upgrade() else {
            return Vec::new();
        };
        let mut inner = inner.borrow_mut();
        inner
            .queues
            .get_mut(&self.id)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().queues.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_in_order() {
        let ch: Channel<u32> = Channel::new();
        let a = ch.subscribe();
        ch.publish(1);
        let b = ch.subscribe();
        ch.publish(2);
        ch.publish(3);
        assert_eq!(a.drain(), vec![1, 2, 3]);
        assert_eq!(b.drain(), vec![2, 3]);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let ch: Channel<u32> = Channel::new();
        let a = ch.subscribe();
        let b = ch.subscribe();
        assert_eq!(ch.subscriber_count(), 2);
        drop(a);
        assert_eq!(ch.subscriber_count(), 1);
        drop(b);
        assert_eq!(ch.subscriber_count(), 0);
        ch.publish(7);
    }

    #[test]
    fn test_subscription_outlives_channel() {
        let ch: Channel<u32> = Channel::new();
        let a = ch.subscribe();
        ch.publish(1);
        drop(ch);
        assert!(a.drain().is_empty());
    }
}

//! Topic management
//!
//! A `Topic` holds the ordered subscriber list for one topic name. The most
//! recent subscriber sits at the front, so publications reach newer
//! subscribers first. Duplicate subscriptions are a no-op.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the
//! registry lock does this).

use std::collections::VecDeque;

use crate::client::ClientSink;

pub type SubscriberId = String;

/// A registry-side reference to a subscribed client.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub sender: ClientSink,
}

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: VecDeque<Subscriber>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: VecDeque::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.subscribers.iter().any(|s| s.id == id)
    }

    /// Add a subscriber at the head of the list. Returns `false` if it was
    /// already subscribed.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> bool {
        if self.contains(&subscriber.id) {
            return false;
        }
        self.subscribers.push_front(subscriber);
        true
    }

    /// Remove exactly one subscriber. Returns `false` if it was not present.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        match self.subscribers.iter().position(|s| s.id == id) {
            Some(idx) => self.subscribers.remove(idx).is_some(),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }
}

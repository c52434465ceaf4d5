//! Subscription registry
//!
//! The registry owns the topic map and the operation counters. It is shared
//! between every connection handler and the stats reporter as a
//! [`SharedRegistry`], and every operation below runs with that single lock
//! held from start to finish.
//!
//! Concurrency notes:
//! - `publish` writes to the subscribers' connections while the lock is
//!   held. Delivery order within a topic is therefore atomic with respect to
//!   concurrent subscribe/unsubscribe, but a subscriber that stops reading
//!   will eventually stall every other client's commands until its socket
//!   drains or closes.
//! - The registry never owns a `Client`. It keeps the client's id and a
//!   clone of its sink per subscription, and relies on the connection
//!   handler calling [`Registry::cleanup`] before the client goes away.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::broker::stats::Stats;
use crate::broker::topic::{Subscriber, SubscriberId, Topic};
use crate::client::Client;
use crate::transport::message::{ServerMessage, is_valid_token, split_publish};
use crate::utils::error::CommandError;

pub type SharedRegistry = Arc<Mutex<Registry>>;

/// What a valid registry operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (or, for publish, the publication was counted).
    Applied,
    /// The request was valid but had nothing to do.
    Unchanged,
    /// The client has no name yet, so the request was dropped.
    Unnamed,
}

#[derive(Debug, Default)]
pub struct Registry {
    topics: HashMap<String, Topic>,
    stats: Stats,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Counts a connection that has started being serviced.
    pub fn connect(&mut self) {
        self.stats.connected += 1;
    }

    /// Names `client` unless it already has a name.
    pub fn set_name(&mut self, client: &mut Client, name: &str) -> Result<Outcome, CommandError> {
        if !is_valid_token(name) {
            return Err(CommandError::InvalidName(name.to_string()));
        }

        if client.set_name(name) {
            debug!(client = %client.id, client_name = name, "client named");
            Ok(Outcome::Applied)
        } else {
            Ok(Outcome::Unchanged)
        }
    }

    /// Puts `client` at the head of `topic`'s subscriber list.
    pub fn subscribe(&mut self, client: &Client, topic: &str) -> Result<Outcome, CommandError> {
        if !is_valid_token(topic) {
            return Err(CommandError::InvalidTopic(topic.to_string()));
        }
        if client.name().is_none() {
            return Ok(Outcome::Unnamed);
        }

        let entry = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic));

        let added = entry.subscribe(Subscriber {
            id: client.id.clone(),
            sender: client.sender.clone(),
        });

        if added {
            self.stats.subscribes += 1;
            debug!(client = %client.id, topic, "subscribed");
            Ok(Outcome::Applied)
        } else {
            Ok(Outcome::Unchanged)
        }
    }

    /// Removes `client` from `topic`, dropping the topic once it is empty.
    ///
    /// `count` decides whether a successful removal shows up in the
    /// unsubscribe counter; teardown removals do not.
    pub fn unsubscribe(
        &mut self,
        client: &Client,
        topic: &str,
        count: bool,
    ) -> Result<Outcome, CommandError> {
        if !is_valid_token(topic) {
            return Err(CommandError::InvalidTopic(topic.to_string()));
        }
        if client.name().is_none() {
            return Ok(Outcome::Unnamed);
        }

        if !self.remove_subscriber(topic, &client.id) {
            return Ok(Outcome::Unchanged);
        }
        if count {
            self.stats.unsubscribes += 1;
        }
        debug!(client = %client.id, topic, "unsubscribed");
        Ok(Outcome::Applied)
    }

    /// Delivers `<name>:<topic>:<value>` to every subscriber of `topic`.
    ///
    /// The publish counter moves even when nobody is subscribed. Failed
    /// writes are logged and skipped; the dead subscriber is removed when
    /// its own handler notices the disconnect.
    pub async fn publish(
        &mut self,
        client: &Client,
        topic_and_value: &str,
    ) -> Result<Outcome, CommandError> {
        let (topic, value) = split_publish(topic_and_value)?;
        let Some(publisher) = client.name() else {
            return Ok(Outcome::Unnamed);
        };

        self.stats.publishes += 1;

        let Some(entry) = self.topics.get(topic) else {
            debug!(topic, "publish with no subscribers");
            return Ok(Outcome::Applied);
        };

        let line = ServerMessage::Delivery {
            publisher,
            topic,
            value,
        }
        .to_string();

        for sub in &entry.subscribers {
            if let Err(e) = sub.sender.send_line(&line).await {
                warn!(subscriber = %sub.id, topic, "failed to deliver: {e}");
            }
        }
        debug!(topic, delivered = entry.len(), "published");

        Ok(Outcome::Applied)
    }

    /// Unsubscribes `client` from everything it tracks and moves it from
    /// the connected to the completed count.
    pub fn cleanup(&mut self, client: &Client) {
        for topic in client.topics() {
            if let Err(e) = self.unsubscribe(client, topic, false) {
                warn!(client = %client.id, "skipping tracked topic during cleanup: {e}");
            }
        }

        self.stats.connected = self.stats.connected.saturating_sub(1);
        self.stats.completed += 1;
        debug!(client = %client.id, "cleaned up client");
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Subscriber ids for `topic` in delivery order; empty if the topic
    /// does not exist.
    pub fn subscribers(&self, topic: &str) -> Vec<SubscriberId> {
        self.topics
            .get(topic)
            .map(|t| t.subscribers.iter().map(|s| s.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    fn remove_subscriber(&mut self, topic: &str, id: &SubscriberId) -> bool {
        let Some(entry) = self.topics.get_mut(topic) else {
            return false;
        };
        let removed = entry.unsubscribe(id);
        if entry.is_empty() {
            self.topics.remove(topic);
        }
        removed
    }
}

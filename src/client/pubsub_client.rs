use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::broker::topic::SubscriberId;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Write side of a client connection.
///
/// Cloning is cheap and every clone writes to the same connection. The
/// registry keeps a clone for each subscription so that publications can be
/// delivered from whichever task is publishing; writes are serialized per
/// connection so lines never interleave.
#[derive(Clone)]
pub struct ClientSink {
    inner: Arc<Mutex<BoxedWriter>>,
}

impl ClientSink {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Writes `line` followed by a newline and flushes.
    pub async fn send_line(&self, line: &str) -> io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        let mut writer = self.inner.lock().await;
        writer.write_all(&buf).await?;
        writer.flush().await
    }

    /// Shuts down the write direction of the connection.
    pub async fn shutdown(&self) -> io::Result<()> {
        self.inner.lock().await.shutdown().await
    }
}

impl fmt::Debug for ClientSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSink")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}

/// Represents a connected client in the Pub/Sub system.
///
/// A `Client` is owned by the connection handler that accepted it. The
/// registry only ever sees it by reference and keeps the `id` and a clone of
/// the `sender` for each topic it is subscribed to.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for the connection.
    pub id: SubscriberId,

    /// Channel to write lines to the client.
    pub sender: ClientSink,

    name: Option<String>,
    topics: Vec<String>,
}

impl Client {
    /// Create a new, unnamed client around a connection's write side.
    pub fn new(sender: ClientSink) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            name: None,
            topics: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the name once. Returns `false` if the client was already named.
    pub(crate) fn set_name(&mut self, name: &str) -> bool {
        if self.name.is_some() {
            return false;
        }
        self.name = Some(name.to_string());
        true
    }

    /// Topics this client is tracked as subscribed to, oldest first.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Records a subscription for teardown. Duplicates are ignored.
    pub fn track(&mut self, topic: &str) {
        if !self.topics.iter().any(|t| t == topic) {
            self.topics.push(topic.to_string());
        }
    }

    pub fn untrack(&mut self, topic: &str) {
        self.topics.retain(|t| t != topic);
    }
}

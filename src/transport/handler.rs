//! Connection handler
//!
//! One handler runs per admitted connection. It reads `\n`-terminated lines,
//! dispatches each to the registry and answers `:invalid` for anything the
//! registry or the parser rejects. On end-of-stream or a read error it
//! cleans the client out of the registry, closes the connection and finally
//! releases its admission slot.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tracing::{debug, warn};

use crate::broker::{AdmissionSlot, Outcome, SharedRegistry};
use crate::client::{Client, ClientSink};
use crate::transport::message::{ClientCommand, ServerMessage};
use crate::utils::error::CommandError;

/// Services one connection until the peer goes away.
pub async fn handle_connection<R, W>(
    reader: R,
    writer: W,
    registry: SharedRegistry,
    slot: AdmissionSlot,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let mut handler = ConnectionHandler::new(ClientSink::new(writer), registry).await;
    handler.serve(BufReader::new(reader)).await;
    handler.finish().await;
    drop(slot);
}

#[derive(Debug)]
pub struct ConnectionHandler {
    client: Client,
    registry: SharedRegistry,
}

impl ConnectionHandler {
    /// Creates the client for a freshly admitted connection and counts it.
    pub async fn new(sink: ClientSink, registry: SharedRegistry) -> Self {
        let client = Client::new(sink);
        registry.lock().await.connect();
        debug!(client = %client.id, "connection opened");
        Self { client, registry }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Reads and dispatches lines until end-of-stream or a read error.
    pub async fn serve<R>(&mut self, mut reader: R)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf);
                    self.dispatch(&line).await;
                }
                Err(e) => {
                    debug!(client = %self.client.id, "read failed: {e}");
                    break;
                }
            }
        }
    }

    /// Handles a single protocol line.
    pub async fn dispatch(&mut self, line: &str) {
        let result = match ClientCommand::parse(line) {
            Ok(command) => self.apply(command).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            debug!(client = %self.client.id, "rejected: {e}");
            if let Err(e) = self
                .client
                .sender
                .send_line(&ServerMessage::Invalid.to_string())
                .await
            {
                warn!(client = %self.client.id, "failed to send reply: {e}");
            }
        }
    }

    async fn apply(&mut self, command: ClientCommand<'_>) -> Result<Outcome, CommandError> {
        let mut registry = self.registry.lock().await;
        match command {
            ClientCommand::Name(name) => registry.set_name(&mut self.client, name),
            ClientCommand::Subscribe(topic) => {
                let outcome = registry.subscribe(&self.client, topic)?;
                if outcome == Outcome::Applied {
                    self.client.track(topic);
                }
                Ok(outcome)
            }
            ClientCommand::Unsubscribe(topic) => {
                let outcome = registry.unsubscribe(&self.client, topic, true)?;
                self.client.untrack(topic);
                Ok(outcome)
            }
            ClientCommand::Publish(topic_and_value) => {
                registry.publish(&self.client, topic_and_value).await
            }
        }
    }

    /// Removes the client from the registry and closes its connection.
    pub async fn finish(self) {
        self.registry.lock().await.cleanup(&self.client);
        if let Err(e) = self.client.sender.shutdown().await {
            debug!(client = %self.client.id, "shutdown failed: {e}");
        }
        debug!(client = %self.client.id, "connection closed");
    }
}

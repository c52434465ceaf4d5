//! TCP listener
//!
//! Binds the listening socket, then accepts connections forever. Each
//! accepted connection waits for an admission slot before its handler is
//! spawned, so connections beyond the cap sit accepted but unserviced until
//! an earlier one closes.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tracing::{debug, info, warn};

use crate::broker::{Admission, SharedRegistry};
use crate::config::Settings;
use crate::transport::handler::handle_connection;
use crate::utils::error::BrokerError;

const LISTEN_BACKLOG: u32 = 1024;

/// Pause after a failed accept so persistent errors (EMFILE) don't spin.
pub(crate) const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    port: u16,
    registry: SharedRegistry,
    admission: Admission,
}

impl Server {
    /// Resolves the configured address, binds and starts listening.
    pub async fn bind(settings: &Settings, registry: SharedRegistry) -> Result<Self, BrokerError> {
        let admission = Admission::new(settings.broker.max_connections as usize)?;

        let target = format!("{}:{}", settings.server.host, settings.server.port);
        let addr = lookup_host(&target)
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| BrokerError::Resolve(target.clone()))?;

        let listener = listen(addr)?;
        let port = listener.local_addr()?.port();
        info!(%addr, port, "listening");

        Ok(Self {
            listener,
            port,
            registry,
            admission,
        })
    }

    /// The port actually bound, which differs from the configured one when
    /// that was 0.
    pub fn local_port(&self) -> u16 {
        self.port
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Accepts and services connections. Never returns.
    pub async fn run(self) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept failed: {e}");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            let slot = self.admission.acquire().await;
            debug!(%peer, "admitted connection");

            let registry = self.registry.clone();
            tokio::spawn(async move {
                let (reader, writer) = stream.into_split();
                handle_connection(reader, writer, registry, slot).await;
                debug!(%peer, "handler finished");
            });
        }
    }
}

fn listen(addr: SocketAddr) -> Result<TcpListener, BrokerError> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    Ok(socket.listen(LISTEN_BACKLOG)?)
}

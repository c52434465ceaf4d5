//! Statistics reporting
//!
//! The reporter sleeps on a trigger stream and, for every item, takes a
//! snapshot of the registry counters under the registry lock and writes the
//! five-line report to the diagnostic output. It never mutates the registry.
//! On Unix the production trigger is SIGHUP (see [`hangup_trigger`]).

use std::fmt;
use std::io::{self, Write};

use futures_util::stream::{self, Stream, StreamExt};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, warn};

use crate::broker::registry::SharedRegistry;

/// Snapshot of the registry counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Connections currently being serviced.
    pub connected: u64,
    /// Connections that have been serviced and closed.
    pub completed: u64,
    pub publishes: u64,
    pub subscribes: u64,
    pub unsubscribes: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connected clients:{}", self.connected)?;
        writeln!(f, "Completed clients:{}", self.completed)?;
        writeln!(f, "pub operations:{}", self.publishes)?;
        writeln!(f, "sub operations:{}", self.subscribes)?;
        writeln!(f, "unsub operations:{}", self.unsubscribes)
    }
}

/// A trigger stream that yields once per SIGHUP delivered to the process.
///
/// The signal handler is installed by this call, so call it before the
/// process can be signalled (the default SIGHUP action terminates).
pub fn hangup_trigger() -> io::Result<impl Stream<Item = ()> + Send + Unpin> {
    let hangups = signal(SignalKind::hangup())?;
    Ok(Box::pin(stream::unfold(hangups, |mut hangups| async move {
        hangups.recv().await.map(|()| ((), hangups))
    })))
}

/// Writes one report per trigger until the trigger stream ends.
pub async fn run_stats_reporter<T, W>(registry: SharedRegistry, mut trigger: T, mut out: W)
where
    T: Stream<Item = ()> + Unpin,
    W: Write,
{
    while trigger.next().await.is_some() {
        let snapshot = registry.lock().await.stats();
        debug!(?snapshot, "stats requested");

        if let Err(e) = write!(out, "{snapshot}").and_then(|()| out.flush()) {
            warn!("failed to write stats report: {e}");
        }
    }
}

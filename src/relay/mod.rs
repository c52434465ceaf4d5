//! Reference client
//!
//! A thin line relay: after announcing its name and initial subscriptions
//! it copies every input line to the broker as a raw command while a second
//! branch copies every broker line to the output. The session ends when
//! either side closes.

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tracing::debug;

use crate::utils::error::RelayError;

/// Client-side argument check: non-empty and free of spaces, colons and
/// newlines.
pub fn is_valid_argument(s: &str) -> bool {
    !s.is_empty() && !s.contains([' ', ':', '\n'])
}

/// Validates the name and topics given on the command line.
pub fn validate(name: &str, topics: &[String]) -> Result<(), RelayError> {
    if !is_valid_argument(name) {
        return Err(RelayError::InvalidName);
    }
    if !topics.iter().all(|t| is_valid_argument(t)) {
        return Err(RelayError::InvalidTopic);
    }
    Ok(())
}

/// Connects to a broker on `localhost`. `port` is passed through as text.
pub async fn connect(port: &str) -> Result<TcpStream, RelayError> {
    TcpStream::connect(format!("localhost:{port}"))
        .await
        .map_err(|source| RelayError::Connect {
            port: port.to_string(),
            source,
        })
}

/// How a relay session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The input ran out; the client exits normally.
    InputClosed,
    /// The broker closed the connection (or writing to it failed).
    BrokerClosed,
}

impl SessionEnd {
    pub fn exit_code(self) -> u8 {
        match self {
            SessionEnd::InputClosed => 0,
            SessionEnd::BrokerClosed => 4,
        }
    }
}

/// Runs one relay session over an established connection.
pub async fn run_session<I, O, R, W>(
    name: &str,
    topics: &[String],
    input: I,
    mut output: O,
    from_broker: R,
    mut to_broker: W,
) -> Result<SessionEnd, RelayError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    send_line(&mut to_broker, &format!("name {name}")).await?;
    for topic in topics {
        send_line(&mut to_broker, &format!("sub {topic}")).await?;
    }

    tokio::select! {
        res = print_broker_lines(BufReader::new(from_broker), &mut output) => {
            res?;
            Ok(SessionEnd::BrokerClosed)
        }
        res = forward_input(input, &mut to_broker) => match res {
            Ok(()) => Ok(SessionEnd::InputClosed),
            Err(e) => {
                debug!("write to broker failed: {e}");
                Ok(SessionEnd::BrokerClosed)
            }
        },
    }
}

async fn send_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(format!("{line}\n").as_bytes()).await?;
    writer.flush().await
}

/// Copies broker lines to `output` until the broker closes the stream.
async fn print_broker_lines<R, O>(mut reader: R, output: &mut O) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return Ok(()),
            Ok(_) => {
                if buf.last() != Some(&b'\n') {
                    buf.push(b'\n');
                }
                output.write_all(&buf).await?;
                output.flush().await?;
            }
            Err(e) => {
                debug!("read from broker failed: {e}");
                return Ok(());
            }
        }
    }
}

/// Copies input lines to the broker byte for byte until the input ends.
/// Only write failures are reported; an unreadable input counts as ended.
async fn forward_input<I, W>(mut input: I, writer: &mut W) -> std::io::Result<()>
where
    I: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf).await {
            Ok(0) => return Ok(()),
            Ok(_) => {
                if buf.last() != Some(&b'\n') {
                    buf.push(b'\n');
                }
                writer.write_all(&buf).await?;
                writer.flush().await?;
            }
            Err(e) => {
                debug!("read from input failed: {e}");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests;

//! The `error` module defines the error types used across `psbroker`.
//!
//! Protocol rejections (`CommandError`) never end a session: the connection
//! handler turns every one of them into a `:invalid` reply. Startup failures
//! (`BrokerError`, `RelayError`) are fatal and map to process exit codes.

use std::io;

use thiserror::Error;

/// A client command the broker refuses to act on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid name `{0}`")]
    InvalidName(String),

    #[error("invalid topic `{0}`")]
    InvalidTopic(String),

    #[error("malformed publish `{0}`")]
    MalformedPublish(String),

    #[error("malformed command `{0}`")]
    MalformedCommand(String),
}

/// Fatal errors raised while bringing the broker up.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("connection cap {0} exceeds the supported maximum of {1}")]
    ConnectionCapTooLarge(usize, usize),

    #[error("unable to resolve listen address {0}")]
    Resolve(String),

    #[error("unable to open socket for listening: {0}")]
    Listen(#[from] io::Error),
}

/// Errors raised by the reference client before or during its session.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid name")]
    InvalidName,

    #[error("invalid topic")]
    InvalidTopic,

    #[error("unable to connect to port {port}")]
    Connect {
        port: String,
        #[source]
        source: io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl RelayError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RelayError::InvalidName | RelayError::InvalidTopic => 2,
            RelayError::Connect { .. } => 3,
            RelayError::Io(_) => 4,
        }
    }
}

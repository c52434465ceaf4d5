//! The `client` module defines the broker-side representation of a client.
//!
//! It provides the `Client` struct, which encapsulates the state of a single
//! connection (its identifier, optional name and tracked subscriptions), and
//! `ClientSink`, the shared handle used to write lines to it.

pub mod pubsub_client;
pub use pubsub_client::{Client, ClientSink};

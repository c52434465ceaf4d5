//! # psbroker
//!
//! `psbroker` is a minimalist, in-memory publish/subscribe broker spoken over
//! plain TCP text lines, together with a small reference client. Clients name
//! themselves, subscribe to topics and publish values; the broker fans each
//! publication out to every current subscriber. Delivery is best-effort and
//! nothing is persisted.
//!
//! ## Core Modules
//!
//! - `broker`: the subscription registry, admission control and stats reporting.
//! - `client`: the broker-side view of a connected client.
//! - `transport`: the line protocol, connection handler and TCP listener.
//! - `relay`: the reference client session.
//! - `config`: settings for the broker process.
//! - `cli`: command-line arguments for both binaries.
//! - `utils`: error types and logging.

pub mod broker;
pub mod cli;
pub mod client;
pub mod config;
pub mod relay;
pub mod transport;
pub mod utils;

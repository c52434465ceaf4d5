//! The `transport` module handles network communication with clients over
//! plain TCP text lines.
//!
//! It defines the line protocol spoken between clients and the broker, the
//! per-connection handler that turns lines into registry operations, and the
//! listener that accepts connections under admission control.

pub mod handler;
pub mod message;
pub mod server;

pub use server::Server;

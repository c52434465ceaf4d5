//! The `utils` module provides shared definitions used across `psbroker`:
//! the error types and the logging bootstrap.

pub mod error;
pub mod logging;

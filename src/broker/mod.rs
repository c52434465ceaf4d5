//! The broker core: the subscription registry and the pieces that share it.
//!
//! - `registry`: topic → subscriber lists plus the operation counters, all
//!   behind one lock.
//! - `topic`: the ordered subscriber list for a single topic.
//! - `admission`: the connection cap.
//! - `stats`: counter snapshots and the triggered reporter task.

pub mod admission;
pub mod registry;
pub mod stats;
pub mod topic;

pub use admission::{Admission, AdmissionSlot};
pub use registry::{Outcome, Registry, SharedRegistry};
pub use stats::Stats;

//! Admission control
//!
//! Bounds how many connections are serviced at once. The listener acquires
//! an [`AdmissionSlot`] before spawning a handler and the handler drops it
//! as the last step of its teardown, which returns exactly one unit to the
//! pool however the connection ended.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::utils::error::BrokerError;

#[derive(Debug, Clone)]
pub struct Admission {
    permits: Option<Arc<Semaphore>>,
}

/// One reserved unit of the connection cap. Dropping it releases the unit.
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: Option<OwnedSemaphorePermit>,
}

impl Admission {
    /// A cap of 0 disables admission control.
    pub fn new(cap: usize) -> Result<Self, BrokerError> {
        if cap == 0 {
            return Ok(Self::unbounded());
        }
        if cap > Semaphore::MAX_PERMITS {
            return Err(BrokerError::ConnectionCapTooLarge(
                cap,
                Semaphore::MAX_PERMITS,
            ));
        }
        Ok(Self {
            permits: Some(Arc::new(Semaphore::new(cap))),
        })
    }

    pub fn unbounded() -> Self {
        Self { permits: None }
    }

    /// Waits until a unit is free and reserves it.
    pub async fn acquire(&self) -> AdmissionSlot {
        let permit = match &self.permits {
            // the semaphore is never closed, so this only waits
            Some(permits) => permits.clone().acquire_owned().await.ok(),
            None => None,
        };
        AdmissionSlot { _permit: permit }
    }

    /// Free units, or `None` when unbounded.
    pub fn available(&self) -> Option<usize> {
        self.permits.as_ref().map(|p| p.available_permits())
    }
}

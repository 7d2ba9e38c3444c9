//! Single-flight gate
//!
//! One-slot admission for print jobs. Acquisition never waits: a request
//! either gets the [`GatePermit`] immediately or is turned away as busy.
//! The permit is the only way to release the gate, so release happens
//! exactly once per acquisition, when the permit is dropped.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Process-wide print admission, shared by cloned handle
#[derive(Debug, Clone)]
pub struct SingleFlightGate {
    slot: Arc<Semaphore>,
}

impl SingleFlightGate {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the gate if it is free; `None` means another job holds it
    pub fn try_acquire(&self) -> Option<GatePermit> {
        Arc::clone(&self.slot)
            .try_acquire_owned()
            .ok()
            .map(|permit| GatePermit { _permit: permit })
    }

    pub fn is_held(&self) -> bool {
        self.slot.available_permits() == 0
    }
}

impl Default for SingleFlightGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of holding the gate; dropping it frees the gate
#[must_use = "the gate is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl GatePermit {
    pub fn release(self) {
        drop(self);
    }
}

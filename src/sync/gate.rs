use std::sync::atomic::{AtomicBool, Ordering};

use super::{Phase, SyncError};

/// Mutual exclusion for mutations: at most one [`BusyGuard`] exists at a time.
#[derive(Debug, Default)]
pub struct BusyGate {
    busy: AtomicBool,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the busy state, or fail with [`SyncError::Busy`] if already in it.
    pub fn try_enter(&self) -> Result<BusyGuard<'_>, SyncError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard { gate: self })
            .map_err(|_| SyncError::Busy)
    }

    pub fn phase(&self) -> Phase {
        if self.busy.load(Ordering::Acquire) {
            Phase::Busy
        } else {
            Phase::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase() == Phase::Busy
    }
}

/// Holds the gate busy until dropped.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    gate: &'a BusyGate,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

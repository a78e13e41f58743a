//! Keeping local mirrors of remote collections in step with the store.
//!
//! A [`Mirror`] is a cache: after every successful write it is reloaded from
//! the store in full instead of being patched locally. Writes go through a
//! [`BusyGate`] so that only one runs at a time, and every outcome a user
//! should see is reported through a [`Notifier`].

mod gate;
mod mirror;
mod notify;

pub use gate::*;
pub use mirror::*;
pub use notify::*;

/// Why a page operation did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Fetching the collection failed; the mirror kept its previous contents.
    #[error("load failed: {0}")]
    Load(String),
    /// The remote write failed; nothing was reloaded.
    #[error("mutation failed: {0}")]
    Mutation(String),
    /// Local input was missing or invalid, so no request was made.
    #[error("skipped: {0}")]
    Skipped(String),
    /// Another mutation is in flight.
    #[error("another operation is in progress")]
    Busy,
    /// The user declined a confirmation.
    #[error("cancelled")]
    Declined,
}

/// Whether a mutation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy,
}

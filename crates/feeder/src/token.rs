//! Token - one-shot capability for a held permit.
//!
//! The release guard is an atomic flag, not a nulled reference: under any
//! number of concurrent release attempts exactly one claims the Live ->
//! Released transition, and only the claimant signals the permit back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::feeder::FeederInner;

/// A live permit, minted by a successful [`Feeder`](crate::Feeder)
/// acquisition.
///
/// Dropping the token releases its permit, so holding it for the duration of
/// the guarded work is enough to guarantee return on every exit path,
/// including `?` returns and panics. [`release`](Self::release) is the
/// explicit form; extra calls after the first are no-ops.
pub struct Token {
    feeder: Arc<FeederInner>,
    released: AtomicBool,
}

impl Token {
    pub(crate) fn new(feeder: Arc<FeederInner>) -> Self {
        Self {
            feeder,
            released: AtomicBool::new(false),
        }
    }

    /// Return the permit to the feeder. Exactly one call takes effect;
    /// the rest observe the terminal Released state and do nothing.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        self.feeder.outstanding.fetch_sub(1, Ordering::AcqRel);
        if self.feeder.disposed.load(Ordering::Acquire) {
            // Only reachable if the feeder was disposed out from under a live
            // token, which dispose() refuses; the permit has nowhere to go.
            tracing::warn!("Token released after its feeder was disposed - permit dropped");
            return;
        }
        self.feeder.semaphore.add_permits(1);
        tracing::debug!("Permit returned to feeder");
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("released", &self.is_released())
            .finish()
    }
}

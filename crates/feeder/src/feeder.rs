//! Feeder - owner of a bounded permit pool.
//!
//! The count itself lives in `tokio::sync::Semaphore`; the feeder adds the
//! capability wrapping (tokens), cancellation, bounded waits, and the dispose
//! precondition check. No locks beyond the semaphore's own atomicity.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::FeederError;
use crate::token::Token;

/// State shared between a feeder and every token it has minted.
///
/// Tokens hold a non-owning handle to this (via `Arc`) so they can signal
/// their permit back; nothing here keeps the `Feeder` value itself alive.
pub(crate) struct FeederInner {
    pub(crate) semaphore: Arc<Semaphore>,
    /// Tokens currently live. At every quiescent instant
    /// `outstanding + available_permits == initial`.
    pub(crate) outstanding: AtomicUsize,
    pub(crate) disposed: AtomicBool,
    initial: usize,
    capacity: usize,
}

/// Gatekeeper for a bounded pool of interchangeable permits.
///
/// `acquire`/`try_acquire` may be called concurrently from any number of
/// tasks. A suspended acquisition yields to the scheduler until another
/// task's [`Token::release`] frees a permit. Wake order among waiters is
/// whatever the underlying semaphore provides - callers must not rely on
/// acquisitions resolving in request order.
pub struct Feeder {
    inner: Arc<FeederInner>,
}

impl Feeder {
    /// Create a feeder with `initial` available permits, optionally bounded
    /// by `max`. `max`, if given, must be at least `initial`.
    pub fn new(initial: usize, max: Option<usize>) -> Result<Self, FeederError> {
        if let Some(max) = max
            && max < initial
        {
            return Err(FeederError::Config(format!(
                "max permit count {max} is less than initial count {initial}"
            )));
        }
        let capacity = max.unwrap_or(initial);
        if capacity > Semaphore::MAX_PERMITS {
            return Err(FeederError::Config(format!(
                "permit count {capacity} exceeds supported maximum {}",
                Semaphore::MAX_PERMITS
            )));
        }

        tracing::debug!(initial, capacity, "Feeder created");
        Ok(Self {
            inner: Arc::new(FeederInner {
                semaphore: Arc::new(Semaphore::new(initial)),
                outstanding: AtomicUsize::new(0),
                disposed: AtomicBool::new(false),
                initial,
                capacity,
            }),
        })
    }

    /// Wait until a permit is available, consuming it into a live [`Token`].
    ///
    /// Returns [`FeederError::Cancelled`] if `cancel` fires first; no permit
    /// is consumed in that case. A cancellation that is already set wins even
    /// when a permit is free.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<Token, FeederError> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!("Acquisition cancelled while waiting for a permit");
                Err(FeederError::Cancelled)
            }
            acquired = Arc::clone(&self.inner.semaphore).acquire_owned() => {
                match acquired {
                    Ok(permit) => Ok(self.mint(permit)),
                    Err(_) => Err(FeederError::Disposed),
                }
            }
        }
    }

    /// Bounded variant of [`acquire`](Self::acquire).
    ///
    /// `Ok(None)` means the timeout elapsed with no permit available - a
    /// normal outcome, not an error, and distinguishable from cancellation.
    /// The permit count is unchanged on both expiry and cancellation.
    pub async fn try_acquire(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Token>, FeederError> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!("Bounded acquisition cancelled while waiting for a permit");
                Err(FeederError::Cancelled)
            }
            attempt = tokio::time::timeout(timeout, Arc::clone(&self.inner.semaphore).acquire_owned()) => {
                match attempt {
                    Ok(Ok(permit)) => Ok(Some(self.mint(permit))),
                    Ok(Err(_)) => Err(FeederError::Disposed),
                    Err(_elapsed) => {
                        tracing::debug!(?timeout, "Bounded acquisition expired with no permit");
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Tear down the feeder, closing the underlying semaphore.
    ///
    /// Precondition: no live tokens. Violations are refused with
    /// [`FeederError::TokensOutstanding`] and leave the feeder untouched.
    /// Pending acquisitions are woken with [`FeederError::Disposed`];
    /// idempotent once it has succeeded.
    pub fn dispose(&self) -> Result<(), FeederError> {
        let live = self.inner.outstanding.load(Ordering::Acquire);
        if live > 0 {
            tracing::warn!(live, "Dispose refused - tokens still live");
            return Err(FeederError::TokensOutstanding(live));
        }
        if !self.inner.disposed.swap(true, Ordering::AcqRel) {
            self.inner.semaphore.close();
            tracing::debug!("Feeder disposed");
        }
        Ok(())
    }

    /// Permits currently available for acquisition.
    pub fn available_permits(&self) -> usize {
        self.inner.semaphore.available_permits()
    }

    /// Tokens currently live.
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Upper bound on permits (the `max` given at construction, or the
    /// initial count when no max was supplied).
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Permit count the feeder started with.
    pub fn initial_permits(&self) -> usize {
        self.inner.initial
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    fn mint(&self, permit: OwnedSemaphorePermit) -> Token {
        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        // The semaphore permit moves into token custody: the token's one-shot
        // guard decides when the count goes back, not this guard's drop.
        permit.forget();
        tracing::debug!(
            outstanding = self.inner.outstanding.load(Ordering::Relaxed),
            "Permit acquired"
        );
        Token::new(Arc::clone(&self.inner))
    }
}

impl std::fmt::Debug for Feeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feeder")
            .field("initial", &self.initial_permits())
            .field("capacity", &self.inner.capacity)
            .field("available", &self.available_permits())
            .field("outstanding", &self.outstanding())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

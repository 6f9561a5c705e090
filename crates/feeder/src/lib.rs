//! feeder: bounded-concurrency admission.
//!
//! A [`Feeder`] owns a fixed pool of interchangeable permits. Acquisition
//! suspends until a permit frees, a timeout elapses, or the caller's
//! [`CancellationToken`] fires; success mints a [`Token`] that returns its
//! permit exactly once, no matter how many times or from how many tasks
//! release is attempted.

mod error;
mod feeder;
mod token;

pub use tokio_util::sync::CancellationToken;

pub use error::FeederError;
pub use feeder::Feeder;
pub use token::Token;

/// Route tracing events from tests through the captured test writer,
/// filtered by `RUST_LOG`. Safe to call from every test; only the first
/// call installs the subscriber.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

//! "First signal wins" wait used by every stream operation.
//!
//! An operation future is raced against a deadline with `tokio::select!`.
//! Whichever finishes first decides the [`Settled`] outcome and the other
//! future is dropped on the spot: a completed operation leaves no timer
//! behind, and a timed-out operation is aborted.
//!
//! The operation's own `Err` is the transport-error signal, so the three
//! signals (completion, error, timeout) collapse into two select branches.

use std::future::Future;
use std::io;
use std::time::Duration;

/// How a raced operation ended.  Produced exactly once per [`race`] call.
#[derive(Debug)]
pub enum Settled<T> {
    /// The operation finished successfully before the deadline.
    Completed(T),
    /// The operation reported a transport error before the deadline.
    Failed(io::Error),
    /// The deadline elapsed first; the operation future has been dropped.
    TimedOut,
}

impl<T> Settled<T> {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Run `operation` until it finishes or `deadline` elapses.
///
/// `biased` makes a completion that is ready on the same poll as the timer win.
pub async fn race<T, F>(deadline: Duration, operation: F) -> Settled<T>
where
    F: Future<Output = io::Result<T>>,
{
    tokio::select! {
        biased;
        result = operation => match result {
            Ok(value) => Settled::Completed(value),
            Err(e) => Settled::Failed(e),
        },
        _ = tokio::time::sleep(deadline) => Settled::TimedOut,
    }
}

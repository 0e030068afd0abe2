//! # Asynchronous Result
//!
//! Every service operation returns a [`Pending`]: a handle that settles exactly
//! once into a [`Settled`] outcome and is read exactly once. Most services
//! settle immediately ([`Pending::value`], [`Pending::absent`],
//! [`Pending::failed`]); work that runs elsewhere uses [`Pending::spawn`].
//!
//! Reading is always bounded: [`Pending::wait`] takes the maximum time to wait
//! and turns an unsettled result into [`ApiError::TimedOut`]. On the request
//! path the timeout is the one configured on the response adapter.
//!
//! Spawned work runs on a `may` coroutine and its outcome travels over a
//! `may::sync::mpsc` channel. That channel has no `recv_timeout`, so `wait`
//! polls with `try_recv` and yields through `may::coroutine::sleep` between
//! polls. A request waiting on a slow result never holds its worker thread;
//! other coroutines on the same worker keep running. Outside a coroutine the
//! same loop sleeps the calling thread.

use crate::error::ApiError;
use may::coroutine;
use may::sync::mpsc;
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};
use tracing::error;

/// Longest pause between two polls of a spawned result
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(8);

/// Outcome of a settled [`Pending`]
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T> {
    /// Success with a value
    Value(T),
    /// Success with explicit absence ("not found")
    Absent,
    /// Failure with a cause
    Failed(ApiError),
}

impl<T> Settled<T> {
    /// `Some(v)` becomes `Value(v)`, `None` becomes `Absent`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Settled::Value(v),
            None => Settled::Absent,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Settled<U> {
        match self {
            Settled::Value(v) => Settled::Value(f(v)),
            Settled::Absent => Settled::Absent,
            Settled::Failed(e) => Settled::Failed(e),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Result<U, ApiError>) -> Settled<U> {
        match self {
            Settled::Value(v) => match f(v) {
                Ok(u) => Settled::Value(u),
                Err(e) => Settled::Failed(e),
            },
            Settled::Absent => Settled::Absent,
            Settled::Failed(e) => Settled::Failed(e),
        }
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Settled::Value(_))
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Settled::Absent)
    }

    /// The value, if this settled with one.
    pub fn into_value(self) -> Option<T> {
        match self {
            Settled::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The failure cause, if this settled with one.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Settled::Failed(e) => Some(e),
            _ => None,
        }
    }
}

type Settle<T> = Box<dyn FnOnce(Duration) -> Settled<T> + Send>;

/// A result that settles once and is read once, with a bounded wait
pub struct Pending<T> {
    settle: Settle<T>,
}

impl<T: Send + 'static> Pending<T> {
    /// Already settled with `outcome`.
    pub fn ready(outcome: Settled<T>) -> Self {
        Self {
            settle: Box::new(move |_| outcome),
        }
    }

    pub fn value(value: T) -> Self {
        Self::ready(Settled::Value(value))
    }

    pub fn absent() -> Self {
        Self::ready(Settled::Absent)
    }

    pub fn failed(error: ApiError) -> Self {
        Self::ready(Settled::Failed(error))
    }

    pub fn from_option(value: Option<T>) -> Self {
        Self::ready(Settled::from_option(value))
    }

    /// Run `work` on a new coroutine; the result settles when `work` returns.
    ///
    /// `work` shares the scheduler with request handling, so it should wait
    /// with `may` primitives rather than block the thread. If `work` panics
    /// the result settles as an internal failure.
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> Settled<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may runtime.
        // The closure owns its captures and only runs `work` and sends the outcome.
        let spawned = unsafe {
            coroutine::Builder::new()
                .name("brrtcrud-pending".to_string())
                .spawn(move || {
                    // Receiver may be gone after a timeout
                    let _ = tx.send(work());
                })
        };
        if let Err(e) = spawned {
            error!(error = %e, "Failed to spawn coroutine for pending result");
            return Self::failed(ApiError::internal(format!(
                "Failed to schedule work: {e}"
            )));
        }
        Self {
            settle: Box::new(move |timeout| receive_within(&rx, timeout)),
        }
    }

    /// Wait at most `timeout` for the outcome.
    #[must_use]
    pub fn wait(self, timeout: Duration) -> Settled<T> {
        (self.settle)(timeout)
    }

    /// Transform the value once it settles.
    pub fn map<U, F>(self, f: F) -> Pending<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let settle = self.settle;
        Pending {
            settle: Box::new(move |timeout| settle(timeout).map(f)),
        }
    }

    /// Transform the value once it settles; an `Err` turns the outcome into a failure.
    pub fn and_then<U, F>(self, f: F) -> Pending<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, ApiError> + Send + 'static,
    {
        let settle = self.settle;
        Pending {
            settle: Box::new(move |timeout| settle(timeout).and_then(f)),
        }
    }
}

/// Poll `rx` until a value arrives, the sender is gone, or `timeout` elapses.
///
/// The pause between polls doubles from 1 ms up to [`MAX_POLL_INTERVAL`].
fn receive_within<T>(rx: &mpsc::Receiver<Settled<T>>, timeout: Duration) -> Settled<T> {
    let deadline = Instant::now() + timeout;
    let mut interval = Duration::from_millis(1);
    loop {
        match rx.try_recv() {
            Ok(outcome) => return outcome,
            Err(TryRecvError::Disconnected) => {
                return Settled::Failed(ApiError::internal(
                    "Worker terminated before producing a result",
                ))
            }
            Err(TryRecvError::Empty) => {}
        }
        let now = Instant::now();
        if now >= deadline {
            return Settled::Failed(ApiError::TimedOut(timeout));
        }
        coroutine::sleep(interval.min(deadline - now));
        interval = (interval * 2).min(MAX_POLL_INTERVAL);
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_ready_outcomes() {
        assert_eq!(Pending::value(7).wait(WAIT), Settled::Value(7));
        assert_eq!(Pending::<i32>::absent().wait(WAIT), Settled::Absent);
        assert_eq!(
            Pending::<i32>::failed(ApiError::Unsupported).wait(WAIT),
            Settled::Failed(ApiError::Unsupported)
        );
        assert_eq!(Pending::from_option(None::<i32>).wait(WAIT), Settled::Absent);
    }

    #[test]
    fn test_map_and_then() {
        let doubled = Pending::value(21).map(|v| v * 2);
        assert_eq!(doubled.wait(WAIT), Settled::Value(42));

        let failed = Pending::value(1).and_then(|_| Err::<i32, _>(ApiError::internal("nope")));
        assert_eq!(
            failed.wait(WAIT),
            Settled::Failed(ApiError::internal("nope"))
        );

        let absent = Pending::<i32>::absent().map(|v| v + 1);
        assert!(absent.wait(WAIT).is_absent());
    }

    #[test]
    fn test_spawn_settles() {
        let pending = Pending::spawn(|| Settled::Value("done".to_string()));
        assert_eq!(pending.wait(WAIT), Settled::Value("done".to_string()));
    }

    #[test]
    fn test_spawn_times_out() {
        let pending = Pending::spawn(|| {
            coroutine::sleep(Duration::from_millis(500));
            Settled::Value(1)
        });
        let waited = Duration::from_millis(20);
        assert_eq!(pending.wait(waited), Settled::Failed(ApiError::TimedOut(waited)));
    }

    #[test]
    fn test_spawn_panic_is_internal_failure() {
        let pending: Pending<i32> = Pending::spawn(|| panic!("worker blew up"));
        let outcome = pending.wait(WAIT);
        assert_eq!(
            outcome.error().map(ApiError::kind),
            Some(crate::error::ErrorKind::InternalFailure)
        );
    }
}

//! Polling a predicate until it reaches a desired value or a deadline passes.
//!
//! This module provides [`wait_until`], the primitive every other helper in
//! this crate is built on. It turns an event-driven UI condition ("Safari is in
//! the foreground", "the login button is displayed") into a plain
//! [`WaitOutcome`] that sequential test code can branch on.
//!
//! Timing out is not an error: it is the [`WaitOutcome::TimedOut`] variant.
//! Errors produced by the predicate itself are logged and counted as a
//! non-matching evaluation, so a transiently unavailable resource never aborts
//! the wait.
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::time::Duration;
//! use appwait_core::wait::{wait_until, WaitConfig, WaitRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WaitConfig::new(Duration::from_secs(5), Duration::from_millis(250))?;
//! let outcome = wait_until(
//!     WaitRequest::new(|| async { Ok::<_, Infallible>(std::path::Path::new("/tmp/ready").exists()) })
//!         .config(config),
//! )
//! .await;
//!
//! if outcome.is_satisfied() {
//!     println!("ready");
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt::{self, Display};
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

/// Default overall timeout for a wait (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between predicate evaluations (100 ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An evaluation must finish this long before `deadline + poll_interval`.
const EVALUATION_MARGIN: Duration = Duration::from_millis(1);

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Errors raised when building a [`WaitConfig`] from invalid timings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitConfigError {
    /// The timeout was zero.
    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    /// The poll interval was zero.
    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,

    /// The poll interval was longer than the timeout.
    #[error("Poll interval ({poll_interval_ms}ms) exceeds timeout ({timeout_ms}ms)")]
    IntervalExceedsTimeout {
        /// The requested poll interval in milliseconds.
        poll_interval_ms: u64,
        /// The requested timeout in milliseconds.
        timeout_ms: u64,
    },
}

/// Validated timing parameters for a wait.
///
/// Both durations are non-zero and the poll interval never exceeds the
/// timeout. The only ways to obtain a value are [`WaitConfig::new`],
/// [`WaitConfig::from_millis`], [`Default`], and deserialization, which runs
/// the same validation.
///
/// Serialized as `{"timeout_ms": .., "poll_interval_ms": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWaitConfig", into = "RawWaitConfig")]
pub struct WaitConfig {
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a config, rejecting zero durations and intervals longer than the timeout.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Result<Self, WaitConfigError> {
        if timeout.is_zero() {
            return Err(WaitConfigError::ZeroTimeout);
        }
        if poll_interval.is_zero() {
            return Err(WaitConfigError::ZeroPollInterval);
        }
        if poll_interval > timeout {
            return Err(WaitConfigError::IntervalExceedsTimeout {
                poll_interval_ms: duration_millis(poll_interval),
                timeout_ms: duration_millis(timeout),
            });
        }
        Ok(Self {
            timeout,
            poll_interval,
        })
    }

    /// Like [`new`](Self::new) but takes milliseconds.
    pub fn from_millis(timeout_ms: u64, poll_interval_ms: u64) -> Result<Self, WaitConfigError> {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(poll_interval_ms),
        )
    }

    /// Returns a copy with a different timeout, keeping the poll interval.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, WaitConfigError> {
        Self::new(timeout, self.poll_interval)
    }

    /// Returns a copy with a different poll interval, keeping the timeout.
    pub fn with_poll_interval(self, poll_interval: Duration) -> Result<Self, WaitConfigError> {
        Self::new(self.timeout, poll_interval)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout_ms(&self) -> u64 {
        duration_millis(self.timeout)
    }

    pub fn poll_interval_ms(&self) -> u64 {
        duration_millis(self.poll_interval)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

fn default_timeout_ms() -> u64 {
    duration_millis(DEFAULT_TIMEOUT)
}

fn default_poll_interval_ms() -> u64 {
    duration_millis(DEFAULT_POLL_INTERVAL)
}

#[derive(Serialize, Deserialize)]
struct RawWaitConfig {
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
}

impl TryFrom<RawWaitConfig> for WaitConfig {
    type Error = WaitConfigError;

    fn try_from(raw: RawWaitConfig) -> Result<Self, Self::Error> {
        WaitConfig::from_millis(raw.timeout_ms, raw.poll_interval_ms)
    }
}

impl From<WaitConfig> for RawWaitConfig {
    fn from(config: WaitConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms(),
            poll_interval_ms: config.poll_interval_ms(),
        }
    }
}

/// Terminal result of [`wait_until`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The predicate returned the desired value.
    Satisfied,
    /// The deadline passed (or the wait was cancelled) first.
    TimedOut,
}

impl WaitOutcome {
    pub fn is_satisfied(self) -> bool {
        self == WaitOutcome::Satisfied
    }

    pub fn is_timed_out(self) -> bool {
        self == WaitOutcome::TimedOut
    }
}

impl Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitOutcome::Satisfied => write!(f, "satisfied"),
            WaitOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// A single wait: the predicate to poll plus the value and timings to poll for.
///
/// The predicate is any `FnMut() -> impl Future<Output = Result<bool, E>>`.
/// Closures that borrow state should capture references and return an
/// `async move` block:
///
/// ```no_run
/// # use std::convert::Infallible;
/// # use appwait_core::wait::WaitRequest;
/// let ready = std::sync::atomic::AtomicBool::new(false);
/// let flag = &ready;
/// let request = WaitRequest::new(move || async move {
///     Ok::<_, Infallible>(flag.load(std::sync::atomic::Ordering::SeqCst))
/// });
/// ```
pub struct WaitRequest<P> {
    predicate: P,
    desired: bool,
    config: WaitConfig,
    cancel: Option<CancellationToken>,
}

impl<P> WaitRequest<P> {
    /// Creates a request that waits for `true` using [`WaitConfig::default`].
    pub fn new(predicate: P) -> Self {
        Self {
            predicate,
            desired: true,
            config: WaitConfig::default(),
            cancel: None,
        }
    }

    /// Sets the value the predicate must return for the wait to succeed.
    pub fn desired(mut self, desired: bool) -> Self {
        self.desired = desired;
        self
    }

    /// Sets the timeout and poll interval.
    pub fn config(mut self, config: WaitConfig) -> Self {
        self.config = config;
        self
    }

    /// Stops the wait early when `token` is cancelled.
    ///
    /// A cancelled wait reports [`WaitOutcome::TimedOut`].
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn desired_value(&self) -> bool {
        self.desired
    }

    pub fn wait_config(&self) -> WaitConfig {
        self.config
    }
}

/// Polls the request's predicate until it returns the desired value or the
/// deadline passes.
///
/// The first evaluation happens immediately. Between evaluations the waiter
/// sleeps for the poll interval, clamped so the last evaluation lands on the
/// deadline. Each evaluation is itself bounded by the larger of the remaining
/// time and one poll interval, and always ends before `deadline +
/// poll_interval`; an evaluation that overruns that budget, or that returns
/// `Err`, counts as a non-match.
///
/// Returns [`WaitOutcome::TimedOut`] only once the deadline has passed (or the
/// cancellation token fired), so a timed-out call has always waited at least
/// the configured timeout and less than the timeout plus one poll interval.
pub async fn wait_until<P, Fut, E>(request: WaitRequest<P>) -> WaitOutcome
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    let WaitRequest {
        mut predicate,
        desired,
        config,
        cancel,
    } = request;

    let span = info_span!(
        "wait_until",
        desired,
        timeout_ms = config.timeout_ms(),
        poll_interval_ms = config.poll_interval_ms(),
    );

    async move {
        let start = Instant::now();
        let deadline = start + config.timeout;
        let mut attempts: u32 = 0;

        loop {
            if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                debug!(attempts, "wait cancelled");
                return WaitOutcome::TimedOut;
            }

            attempts += 1;
            let now = Instant::now();
            let hard_stop = (deadline + config.poll_interval)
                .saturating_duration_since(now)
                .saturating_sub(EVALUATION_MARGIN);
            let budget = deadline
                .saturating_duration_since(now)
                .max(config.poll_interval)
                .min(hard_stop);

            match tokio::time::timeout(budget, predicate()).await {
                Ok(Ok(value)) if value == desired => {
                    debug!(
                        attempts,
                        elapsed_ms = duration_millis(start.elapsed()),
                        "predicate satisfied"
                    );
                    return WaitOutcome::Satisfied;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    debug!(attempts, error = %e, "predicate failed, treating as no match");
                }
                Err(_) => {
                    debug!(
                        attempts,
                        budget_ms = duration_millis(budget),
                        "predicate evaluation overran its budget"
                    );
                }
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(
                    attempts,
                    elapsed_ms = duration_millis(start.elapsed()),
                    "wait timed out"
                );
                return WaitOutcome::TimedOut;
            }

            let nap = config.poll_interval.min(deadline - now);
            match &cancel {
                Some(token) => {
                    tokio::select! {
                        _ = tokio::time::sleep(nap) => {}
                        _ = token.cancelled() => {
                            debug!(attempts, "wait cancelled");
                            return WaitOutcome::TimedOut;
                        }
                    }
                }
                None => tokio::time::sleep(nap).await,
            }
        }
    }
    .instrument(span)
    .await
}

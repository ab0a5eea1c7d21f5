//! Timeout, retry and cancellation around network publish steps.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use hoist_core::config::{DeploySettings, MAX_RETRIES, MIN_RETRIES};
use hoist_util::errors::HoistError;

const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// How often and how long a publish step may run.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    attempts: u32,
    timeout: Duration,
    backoff: Duration,
    cancel: CancellationToken,
}

impl RetryPolicy {
    /// `attempts` is clamped into `1..=10`.
    pub fn new(attempts: u32, timeout: Duration) -> Self {
        Self {
            attempts: attempts.clamp(MIN_RETRIES, MAX_RETRIES),
            timeout,
            backoff: DEFAULT_BACKOFF,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_settings(settings: &DeploySettings) -> Self {
        Self::new(settings.retry_count(), settings.timeout())
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn cancelled(&self, label: &str) -> miette::Report {
        HoistError::Cancelled {
            message: format!("{label} was interrupted"),
        }
        .into()
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// Each attempt is bounded by the timeout; back-off grows linearly.
    /// Cancellation aborts immediately, including mid-attempt, and is never
    /// retried. The last failure is returned; a timed-out attempt counts as a
    /// network failure.
    pub async fn run<T, F, Fut>(&self, label: &str, op: F) -> miette::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = miette::Result<T>>,
    {
        self.run_with(label, |message| HoistError::Network { message }, op)
            .await
    }

    /// Like [`run`](Self::run), with `timed_out` building the error reported
    /// for an attempt that hits the timeout.
    pub async fn run_with<T, F, Fut, E>(
        &self,
        label: &str,
        timed_out: E,
        mut op: F,
    ) -> miette::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = miette::Result<T>>,
        E: Fn(String) -> HoistError,
    {
        let mut last_err = None;

        for attempt in 1..=self.attempts {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(label));
            }
            if attempt > 1 {
                tracing::warn!("Retrying deployment attempt {attempt} of {}", self.attempts);
            }

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => return Err(self.cancelled(label)),
                r = tokio::time::timeout(self.timeout, op()) => r,
            };

            match outcome {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    tracing::warn!("{label} failed (attempt {attempt}/{}): {e}", self.attempts);
                    last_err = Some(e);
                }
                Err(_) => {
                    tracing::warn!(
                        "{label} timed out after {}s (attempt {attempt}/{})",
                        self.timeout.as_secs(),
                        self.attempts
                    );
                    last_err = Some(
                        timed_out(format!(
                            "{label} timed out after {}s",
                            self.timeout.as_secs()
                        ))
                        .into(),
                    );
                }
            }

            if attempt < self.attempts {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(self.cancelled(label)),
                    _ = tokio::time::sleep(self.backoff * attempt) => {}
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            HoistError::Generic {
                message: format!("{label} was never attempted"),
            }
            .into()
        }))
    }
}

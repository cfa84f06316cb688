use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};

pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);
const BACKOFF_MULTIPLIER: u32 = 2;

/// Exponential backoff with up to 100% jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_BACKOFF,
            max: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl Backoff {
    /// Pause for the current `delay`: `delay + uniform[0, delay)`, capped at `max`.
    pub fn pause<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        let nanos = delay.as_nanos().min(u64::MAX as u128) as u64;
        let jitter = if nanos == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(rng.gen_range(0..nanos))
        };
        (delay + jitter).min(self.max)
    }

    pub fn next_delay(&self, delay: Duration) -> Duration {
        delay.saturating_mul(BACKOFF_MULTIPLIER).min(self.max)
    }
}

/// Retry budget for one call: `max_retries` re-attempts after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Negative counts clamp to zero (a single attempt).
    pub fn new(max_retries: i32) -> Self {
        Self {
            max_retries: max_retries.max(0) as u32,
            backoff: Backoff::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Runs `operation` until it succeeds, fails with an error `should_retry`
    /// rejects, or the budget runs out (the last error is returned). A
    /// cancelled `cancel` token cuts a backoff sleep short.
    pub async fn run<T, F, Fut, P>(
        &self,
        cancel: Option<&CancelToken>,
        mut operation: F,
        should_retry: P,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&Error) -> bool,
    {
        let mut delay = self.backoff.initial;
        let mut attempt = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !should_retry(&err) || attempt >= self.max_retries {
                return Err(err);
            }
            attempt += 1;

            let pause = self.backoff.pause(delay, &mut rand::thread_rng());
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = pause.as_millis() as u64,
                code = %err.code(),
                status = err.status().as_u16(),
                "retrying request"
            );
            match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            return Err(Error::cancelled("call cancelled during retry backoff"));
                        }
                        _ = tokio::time::sleep(pause) => {}
                    }
                }
                None => tokio::time::sleep(pause).await,
            }
            delay = self.backoff.next_delay(delay);
        }
    }
}

/// Runs `operation` with up to `max_retries` re-attempts under the default backoff.
pub async fn retry<T, F, Fut, P>(max_retries: i32, operation: F, should_retry: P) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    RetryPolicy::new(max_retries)
        .run(None, operation, should_retry)
        .await
}

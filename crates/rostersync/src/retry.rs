//! Retry policy for provider requests.
//!
//! Only rate-limit responses are retried. Anything else is a fetch failure
//! and ends that provider's pagination loop.
//!
//! Delays grow exponentially from [`INITIAL_BACKOFF_MS`]. When a 429 carries a
//! `Retry-After` hint longer than the scheduled delay, the next attempt waits
//! out the difference, never past `max_delay`.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::entity::provider::Provider;
use crate::provider::{ProviderError, Result};
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// First backoff delay, and the wait used when a 429 has no `Retry-After`.
pub const INITIAL_BACKOFF_MS: u64 = 2_000;

pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Rate-limit retries before a request is given up on.
pub const MAX_RATE_LIMIT_RETRIES: usize = 5;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_retries: usize,
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RATE_LIMIT_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);
        if self.with_jitter { builder.with_jitter() } else { builder }
    }

    /// Extra wait needed on top of `scheduled` to honor a server hint.
    fn top_up(&self, hint: Option<Duration>, scheduled: Duration) -> Option<Duration> {
        let wanted = hint?.min(self.max_delay);
        wanted.checked_sub(scheduled).filter(|d| !d.is_zero())
    }
}

fn retry_after(err: &ProviderError) -> Option<Duration> {
    match err {
        ProviderError::RateLimited { retry_after } => *retry_after,
        _ => None,
    }
}

/// Run a provider request, backing off while it keeps returning 429.
///
/// Each retry is reported as [`SyncProgress::RateLimitBackoff`] with the
/// total wait before the next attempt, and logged at warn level.
pub async fn with_retry<T, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    provider: Provider,
    on_progress: Option<&ProgressCallback>,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempt = AtomicU32::new(0);
    let pending_top_up: Mutex<Option<Duration>> = Mutex::new(None);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        let top_up = pending_top_up
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let request = operation();
        async move {
            if let Some(extra) = top_up {
                tokio::time::sleep(extra).await;
            }
            request.await
        }
    };

    retry_op
        .retry(config.backoff())
        .when(ProviderError::is_rate_limited)
        .notify(|err: &ProviderError, scheduled: Duration| {
            let top_up = config.top_up(retry_after(err), scheduled);
            *pending_top_up.lock().unwrap_or_else(|e| e.into_inner()) = top_up;

            let wait = scheduled + top_up.unwrap_or_default();
            let current_attempt = attempt.load(Ordering::SeqCst);
            emit(
                on_progress,
                SyncProgress::RateLimitBackoff {
                    provider,
                    retry_after_ms: wait.as_millis() as u64,
                    attempt: current_attempt,
                },
            );
            tracing::warn!(
                provider = %provider,
                attempt = current_attempt,
                delay_ms = wait.as_millis() as u64,
                error = %err,
                "Rate limited, backing off"
            );
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn quick() -> RetryConfig {
        RetryConfig::new(Duration::from_millis(10), Duration::from_secs(120), 3).with_jitter(false)
    }

    fn recorder() -> (Arc<Mutex<Vec<SyncProgress>>>, ProgressCallback) {
        let events: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event: SyncProgress| {
            capture.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        });
        (events, callback)
    }

    #[test]
    fn defaults_start_at_two_seconds() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_secs(2));
        assert_eq!(config.max_delay, Duration::from_secs(60));
        assert_eq!(config.max_retries, MAX_RATE_LIMIT_RETRIES);
        assert!(config.with_jitter);
    }

    #[test]
    fn top_up_covers_only_the_gap_and_respects_the_cap() {
        let config = RetryConfig::new(Duration::from_secs(1), Duration::from_secs(30), 3);
        let scheduled = Duration::from_secs(2);

        assert_eq!(config.top_up(None, scheduled), None);
        assert_eq!(config.top_up(Some(Duration::from_secs(1)), scheduled), None);
        assert_eq!(config.top_up(Some(Duration::from_secs(5)), scheduled), Some(Duration::from_secs(3)));
        assert_eq!(config.top_up(Some(Duration::from_secs(600)), scheduled), Some(Duration::from_secs(28)));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_rate_limits_and_reports_each_backoff() {
        let calls = AtomicU32::new(0);
        let (events, callback) = recorder();

        let result = with_retry(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ProviderError::RateLimited { retry_after: None })
                } else {
                    Ok(7u32)
                }
            },
            &quick(),
            Provider::BallDontLie,
            Some(&callback),
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let events = events.lock().unwrap();
        let backoffs = events
            .iter()
            .filter(|e| matches!(e, SyncProgress::RateLimitBackoff { .. }))
            .count();
        assert_eq!(backoffs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_out_the_retry_after_hint() {
        let calls = AtomicU32::new(0);
        let (events, callback) = recorder();
        let started = tokio::time::Instant::now();

        let result = with_retry(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ProviderError::RateLimited {
                        retry_after: Some(Duration::from_secs(90)),
                    })
                } else {
                    Ok(())
                }
            },
            &quick(),
            Provider::NbaApi,
            Some(&callback),
        )
        .await;

        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_secs(90));
        let events = events.lock().unwrap();
        assert!(matches!(
            events.first(),
            Some(SyncProgress::RateLimitBackoff { retry_after_ms, attempt: 1, .. }) if *retry_after_ms >= 90_000
        ));
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let err = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ProviderError::api(500, "Internal Server Error"))
            },
            &quick(),
            Provider::NbaApi,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::Api { status: 500, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

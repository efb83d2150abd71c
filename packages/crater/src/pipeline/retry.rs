//! Bounded retry for remote calls, on `backon`'s exponential backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::types::RetryPolicy;

/// Run `call` until it succeeds, fails permanently, or attempts run out.
///
/// `is_transient` decides whether an error is worth another attempt. With the
/// default policy (`max_attempts = 1`) the call runs exactly once.
pub async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    operation: &'static str,
    is_transient: impl Fn(&E) -> bool,
    call: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let backoff = ExponentialBuilder::default()
        .with_min_delay(policy.initial_backoff)
        .with_max_times(policy.retries());

    let mut attempt = 1;
    call.retry(backoff)
        .when(|e: &E| is_transient(e))
        .notify(|e: &E, delay: Duration| {
            attempt += 1;
            warn!(
                operation,
                attempt,
                max_attempts = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %e,
                "Transient failure, retrying"
            );
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_default_policy_calls_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(RetryPolicy::none(), "op", |_| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::with_backoff(3, Duration::from_millis(1));
        let result: Result<u32, String> = with_retry(policy, "op", |_| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err("busy".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn test_backoff_grows_between_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::with_backoff(3, Duration::from_millis(20));
        let started = std::time::Instant::now();
        let result: Result<(), String> = with_retry(policy, "op", |_| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("busy".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 20ms, then 40ms
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::with_backoff(5, Duration::from_millis(1));
        let result: Result<(), String> = with_retry(policy, "op", |e: &String| e != "fatal", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("fatal".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

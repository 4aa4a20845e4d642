//! Async utilities and patterns
//!
//! Provides fixed-delay retries, timeouts and order-preserving bounded concurrency

use crate::error::{ErrorContext, LeafletError, LeafletResult};
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, warn};

/// Retry policy: a fixed number of attempts with a fixed wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: usize,
    /// Wait before each retry in milliseconds
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn fixed(max_attempts: usize, delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay_ms,
        }
    }
}

/// Retry an async operation, but only for errors accepted by `should_retry`
pub async fn retry_async_if<F, P, T, E>(
    operation: F,
    should_retry: P,
    config: RetryConfig,
    operation_name: &str,
) -> Result<T, E>
where
    F: Fn() -> BoxFuture<'static, Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        debug!(
            operation = operation_name,
            attempt = attempt,
            max_attempts = config.max_attempts,
            "Attempting operation"
        );

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                if !should_retry(&error) {
                    return Err(error);
                }

                if attempt >= config.max_attempts {
                    error!(
                        operation = operation_name,
                        attempt = attempt,
                        error = %error,
                        "Operation failed after all retry attempts"
                    );
                    return Err(error);
                }

                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    delay_ms = config.delay_ms,
                    "Operation failed, retrying"
                );

                sleep(Duration::from_millis(config.delay_ms)).await;
            }
        }
    }
}

/// Timeout wrapper for async operations
pub async fn with_timeout<F, T>(future: F, timeout_ms: u64, operation_name: &str) -> LeafletResult<T>
where
    F: std::future::Future<Output = T>,
{
    match timeout(Duration::from_millis(timeout_ms), future).await {
        Ok(result) => Ok(result),
        Err(_) => Err(LeafletError::Timeout {
            operation: operation_name.to_string(),
            duration_ms: timeout_ms,
            context: ErrorContext::new("async_utils")
                .with_operation("timeout")
                .with_metadata("timeout_ms", &timeout_ms.to_string())
                .with_suggestion("Increase timeout duration"),
        }),
    }
}

/// Run `processor` over `items` with at most `max_concurrent` in flight.
///
/// Results come back in input order, not completion order.
pub async fn process_in_order<T, R, F, Fut>(
    items: Vec<T>,
    max_concurrent: usize,
    processor: F,
) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: std::future::Future<Output = R>,
{
    stream::iter(items)
        .map(processor)
        .buffered(max_concurrent.max(1))
        .collect::<Vec<_>>()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn retries_until_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result = retry_async_if(
            move || {
                let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if count < 3 {
                        Err(std::io::Error::other("temporary failure"))
                    } else {
                        Ok("done")
                    }
                }
                .boxed()
            },
            |_| true,
            RetryConfig::fixed(5, 1),
            "flaky",
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_immediately() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), std::io::Error> = retry_async_if(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(std::io::Error::other("fatal")) }.boxed()
            },
            |_| false,
            RetryConfig::fixed(3, 1),
            "fatal",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result: Result<(), std::io::Error> = retry_async_if(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(std::io::Error::other("busy")) }.boxed()
            },
            |_| true,
            RetryConfig::fixed(0, 1),
            "busy",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_maps_to_timeout_error() {
        let slow = async {
            sleep(Duration::from_millis(200)).await;
        };

        match with_timeout(slow, 10, "slow").await {
            Err(LeafletError::Timeout { duration_ms, .. }) => assert_eq!(duration_ms, 10),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn process_in_order_keeps_input_order() {
        let results = process_in_order(vec![30u64, 1, 15], 3, |ms| async move {
            sleep(Duration::from_millis(ms)).await;
            ms
        })
        .await;

        assert_eq!(results, vec![30, 1, 15]);
    }
}

//! Resubmission of transient failures
//!
//! Connection failures and gateway errors are retried until the request
//! succeeds. There is no backoff: each attempt goes back through the rate
//! limiter, which is the only pacing. By default there is no attempt limit
//! either, so a gateway that never recovers hangs the caller; a bound can be
//! opted into with [`RetryBuilder::max_attempts`].

use crate::error::{Error, Result};

/// Retry behaviour of the request pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Total attempts including the first; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry transient failures forever
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

/// Retry a fallible async operation while `is_retryable` holds
///
/// # Example
/// ```ignore
/// let body = with_retry(
///     &RetryPolicy::default(),
///     || async { pipeline.send_once(&request).await },
///     Error::is_retryable,
/// ).await?;
/// ```
pub async fn with_retry<T, F, Fut, R>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: R,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
    R: Fn(&Error) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) || policy.exhausted(attempt) {
                    return Err(e);
                }

                tracing::warn!(attempt = attempt, error = %e, "Retrying after transient error");
            }
        }
    }
}

/// Builder for [`RetryPolicy`]
#[derive(Debug, Clone, Default)]
pub struct RetryBuilder {
    max_attempts: Option<u32>,
}

impl RetryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n.max(1));
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_attempts = None;
        self
    }

    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_default_is_unbounded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, None);
        assert!(!policy.exhausted(u32::MAX));
        assert_eq!(policy, RetryPolicy::unbounded());
    }

    #[test]
    fn test_retry_builder() {
        let policy = RetryBuilder::new().max_attempts(5).build();
        assert_eq!(policy.max_attempts, Some(5));

        let policy = RetryBuilder::new().max_attempts(0).build();
        assert_eq!(policy.max_attempts, Some(1));

        let policy = RetryBuilder::new().max_attempts(3).unbounded().build();
        assert_eq!(policy.max_attempts, None);
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let mut calls = 0;

        let result = with_retry(
            &RetryPolicy::default(),
            || {
                calls += 1;
                async { Ok::<_, Error>(42) }
            },
            Error::is_retryable,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = with_retry(
            &RetryPolicy::default(),
            || {
                let cc = call_count_clone.clone();
                async move {
                    match cc.fetch_add(1, Ordering::SeqCst) {
                        0..=9 => Err(Error::api(ErrorKind::BadGateway, "gateway")),
                        10 => Err(Error::Network("connection reset".to_string())),
                        _ => Ok("done"),
                    }
                }
            },
            Error::is_retryable,
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(call_count.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_retry_bounded() {
        let policy = RetryBuilder::new().max_attempts(2).build();
        let mut calls = 0;

        let result: Result<()> = with_retry(
            &policy,
            || {
                calls += 1;
                async { Err(Error::Network("always fails".to_string())) }
            },
            Error::is_retryable,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_retry_non_retryable() {
        let mut calls = 0;

        let result: Result<()> = with_retry(
            &RetryPolicy::default(),
            || {
                calls += 1;
                async { Err(Error::api(ErrorKind::ServiceUnavailable, "down")) }
            },
            Error::is_retryable,
        )
        .await;

        assert!(matches!(
            result,
            Err(Error::Api {
                kind: ErrorKind::ServiceUnavailable,
                ..
            })
        ));
        assert_eq!(calls, 1);
    }
}

//! Bounded Retry with Backoff
//!
//! A generic retry wrapper parameterized by a retryability predicate.
//! Network-calling components share this instead of hand-rolling loops:
//! the predicate decides which errors are worth another attempt (credential
//! errors never are), the policy bounds attempts and spaces them with
//! exponential backoff, and cancellation is honored between attempts
//! rather than completing the backoff sequence blindly.

use bridge_traits::http::RetryPolicy;
use std::fmt::Display;
use std::future::Future;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Run `op` until it succeeds, the policy is exhausted, the predicate
/// rejects the error, or the token is cancelled.
///
/// The last error is returned unchanged; callers keep their own error
/// types.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::RetryPolicy;
/// use core_runtime::retry::retry_with_policy;
/// use tokio_util::sync::CancellationToken;
///
/// let policy = RetryPolicy { max_attempts: 3, ..Default::default() };
/// let cancel = CancellationToken::new();
/// let result = retry_with_policy(&policy, &cancel, |e: &MyError| e.is_transient(), || async {
///     fetch_remote().await
/// })
/// .await;
/// ```
pub async fn retry_with_policy<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= policy.max_attempts {
                    return Err(error);
                }
                if !is_retryable(&error) {
                    return Err(error);
                }
                if cancel.is_cancelled() {
                    return Err(error);
                }

                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "Operation failed, retrying"
                );

                tokio::select! {
                    _ = cancel.cancelled() => return Err(error),
                    _ = sleep(delay) => {}
                }
            }
        }
    }
}

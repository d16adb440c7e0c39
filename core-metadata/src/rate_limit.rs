//! Per-Provider Rate Limiting
//!
//! A minimum-interval gate tracking "time since the last request this
//! process issued to this host". Each provider client owns one instance;
//! nothing is shared across clients or processes. Multi-process
//! deployments therefore only approximate the interval, an accepted
//! trade-off, not a guarantee.

use bridge_traits::time::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Minimum spacing between requests to a metadata source.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(1100);

/// Enforces a minimum delay between consecutive requests.
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    last_request_ms: Option<i64>,
    min_delay: Duration,
}

impl RateLimiter {
    pub fn new(min_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_request_ms: None,
            min_delay,
        }
    }

    /// Suspend until the interval since the previous request has elapsed,
    /// then stamp the current request.
    pub async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request_ms {
            let now = self.clock.unix_timestamp_millis();
            let elapsed_ms = now - last;
            let required_ms = self.min_delay.as_millis() as i64;
            if elapsed_ms < required_ms {
                let wait = Duration::from_millis((required_ms - elapsed_ms) as u64);
                debug!("Rate limiting: waiting {:?}", wait);
                sleep(wait).await;
            }
        }
        self.last_request_ms = Some(self.clock.unix_timestamp_millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::SystemClock;

    #[tokio::test]
    async fn test_first_request_passes_immediately() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mut limiter = RateLimiter::new(Duration::from_secs(60), clock.clone());

        let before = clock.unix_timestamp_millis();
        limiter.wait_if_needed().await;
        let after = clock.unix_timestamp_millis();

        // No prior request: no waiting.
        assert!(after - before < 1000);
        assert!(limiter.last_request_ms.is_some());
    }

    #[tokio::test]
    async fn test_second_request_waits_out_interval() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mut limiter = RateLimiter::new(Duration::from_millis(50), clock.clone());

        limiter.wait_if_needed().await;
        let before = clock.unix_timestamp_millis();
        limiter.wait_if_needed().await;
        let after = clock.unix_timestamp_millis();

        assert!(after - before >= 40, "expected ~50ms spacing, got {}ms", after - before);
    }
}

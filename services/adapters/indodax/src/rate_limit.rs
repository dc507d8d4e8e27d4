//! Rate limiting for API requests

use governor::{DefaultDirectRateLimiter, Quota};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Shared budget for outbound REST calls
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    requests_per_minute: u32,
}

impl RateLimiter {
    /// `0` requests per minute disables limiting
    pub fn new(requests_per_minute: u32) -> Self {
        let limiter = match NonZeroU32::try_from(requests_per_minute) {
            Ok(rate) => Some(Arc::new(DefaultDirectRateLimiter::direct(Quota::per_minute(rate)))),
            Err(_) => {
                tracing::warn!("Rate limiting disabled for Indodax requests");
                None
            }
        };
        Self {
            limiter,
            requests_per_minute,
        }
    }

    /// Check if request is allowed (non-blocking)
    pub fn check(&self) -> bool {
        self.limiter
            .as_ref()
            .map(|limiter| limiter.check().is_ok())
            .unwrap_or(true)
    }

    /// Wait until request is allowed
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_minute", &self.requests_per_minute)
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_bounded() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }

    #[test]
    fn test_zero_disables() {
        let limiter = RateLimiter::new(0);
        for _ in 0..100 {
            assert!(limiter.check());
        }
    }

    #[tokio::test]
    async fn test_wait_within_budget() {
        let limiter = RateLimiter::new(60);
        limiter.wait().await;
        assert_eq!(limiter.requests_per_minute(), 60);
    }
}

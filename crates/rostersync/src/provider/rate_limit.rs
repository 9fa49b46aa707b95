use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default request rates per provider (requests per second).
pub mod rate_limits {
    /// balldontlie free tier allows a handful of requests per minute; two per
    /// second is the most it tolerates in bursts before answering 429.
    pub const BALLDONTLIE_DEFAULT_RPS: u32 = 2;
    /// RapidAPI plans meter per day, not per second.
    pub const NBA_API_DEFAULT_RPS: u32 = 5;
}

/// Client-side pacing applied before every provider request.
///
/// ```ignore
/// let limiter = ApiRateLimiter::new(rate_limits::BALLDONTLIE_DEFAULT_RPS);
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// A limiter spacing requests evenly at `requests_per_second`, without
    /// bursts (zero is treated as one).
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(Duration::from_secs(1) / rps.get())
            .unwrap_or_else(|| Quota::per_second(rps))
            .allow_burst(NonZeroU32::MIN);
        Self {
            inner: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wait until the next request is allowed.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

impl std::fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRateLimiter").finish_non_exhaustive()
    }
}

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::error::AdmissionError;

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    started_at: Instant,
}

/// Fixed-window request budget per client address.
///
/// Windows idle for a full window length are swept on every check, so the map only
/// holds clients seen within the last window.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, RateWindow>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, client: IpAddr) -> Result<(), AdmissionError> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: IpAddr, now: Instant) -> Result<(), AdmissionError> {
        let mut windows = self.windows.lock().unwrap_or_else(|p| {
            warn!("rate limiter mutex poisoned, recovering");
            p.into_inner()
        });

        windows.retain(|_, w| now.saturating_duration_since(w.started_at) < self.window);

        let window = windows.entry(client).or_insert(RateWindow {
            count: 0,
            started_at: now,
        });

        if window.count >= self.limit {
            warn!("Rate limit exceeded for {}", client);
            return Err(AdmissionError::RateLimited);
        }
        window.count += 1;
        Ok(())
    }

    /// Clients currently holding an open window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or_else(|p| p.into_inner().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio_test::{assert_err, assert_ok};

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_admits_exactly_limit_per_window() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();

        for i in 0..5 {
            assert_ok!(limiter.check_at(ip(1), start + Duration::from_secs(i)));
        }
        let rejected = limiter.check_at(ip(1), start + Duration::from_secs(10));
        assert_eq!(rejected, Err(AdmissionError::RateLimited));
        assert_err!(limiter.check_at(ip(1), start + Duration::from_secs(59)));
    }

    #[test]
    fn test_window_resets_after_elapsing() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert_ok!(limiter.check_at(ip(1), start));
        assert_ok!(limiter.check_at(ip(1), start));
        assert_err!(limiter.check_at(ip(1), start + Duration::from_secs(30)));

        let later = start + Duration::from_secs(60);
        assert_ok!(limiter.check_at(ip(1), later));
        assert_ok!(limiter.check_at(ip(1), later));
        assert_err!(limiter.check_at(ip(1), later));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert_ok!(limiter.check_at(ip(1), now));
        assert_err!(limiter.check_at(ip(1), now));
        assert_ok!(limiter.check_at(ip(2), now));
    }

    #[test]
    fn test_rejections_do_not_extend_the_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert_ok!(limiter.check_at(ip(1), start));
        for s in 1..60 {
            assert_err!(limiter.check_at(ip(1), start + Duration::from_secs(s)));
        }
        assert_ok!(limiter.check_at(ip(1), start + Duration::from_secs(60)));
    }

    #[test]
    fn test_idle_windows_are_swept() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let start = Instant::now();

        for i in 1..=5 {
            assert_ok!(limiter.check_at(ip(i), start));
        }
        assert_eq!(limiter.tracked_clients(), 5);

        assert_ok!(limiter.check_at(ip(9), start + Duration::from_secs(61)));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_zero_limit_rejects_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        assert_err!(limiter.check(ip(1)));
    }
}

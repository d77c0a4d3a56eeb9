// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window request limiting per client address.
//!
//! Each client IP gets its own window, opened by its first request and
//! reset lazily once it has elapsed. A request beyond the limit inside the
//! window is rejected with 429 and a `Retry-After` hint.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use frugal_core::FrugalError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ApiError, rate_limited};

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<IpAddr, RateWindow>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts a request from `client`, returning how many remain in its window.
    ///
    /// # Errors
    /// [`FrugalError::RateLimited`] with the time until the window resets.
    pub fn check(&self, client: IpAddr) -> Result<u32, FrugalError> {
        let now = Instant::now();
        let mut entry = self.windows.entry(client).or_insert(RateWindow {
            started: now,
            count: 0,
        });

        let elapsed = now.duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let retry_after = self.window.saturating_sub(now.duration_since(entry.started));
            return Err(FrugalError::RateLimited { retry_after });
        }

        entry.count += 1;
        Ok(self.max_requests - entry.count)
    }

    /// Drops windows that have fully elapsed.
    pub fn purge_expired(&self) -> usize {
        let before = self.windows.len();
        let window = self.window;
        self.windows
            .retain(|_, w| w.started.elapsed() < window);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Periodically purges elapsed windows until `cancel` fires.
    pub fn spawn_purger(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.window);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.purge_expired();
                        if removed > 0 {
                            debug!(removed, "rate limit windows purged");
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        })
    }
}

/// Identity used for limiting: the peer address, when the server recorded it.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware applying [`RateLimiter`] to the wrapped routes.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    match limiter.check(client) {
        Ok(remaining) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("ratelimit-limit", HeaderValue::from(limiter.max_requests()));
            headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
            response
        }
        Err(FrugalError::RateLimited { retry_after }) => {
            warn!(%client, retry_after_secs = retry_after.as_secs(), "rate limit exceeded");
            rate_limited(limiter.window(), retry_after)
        }
        Err(other) => ApiError(other).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(900);

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[tokio::test(start_paused = true)]
    async fn hundredth_accepted_hundred_first_rejected() {
        let limiter = RateLimiter::new(100, WINDOW);
        for n in 1..=100 {
            assert_eq!(limiter.check(ip(1)).unwrap(), 100 - n);
        }
        let err = limiter.check(ip(1)).unwrap_err();
        assert!(matches!(err, FrugalError::RateLimited { retry_after } if retry_after == WINDOW));
    }

    #[tokio::test(start_paused = true)]
    async fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, WINDOW);
        assert!(limiter.check(ip(1)).is_ok());
        assert!(limiter.check(ip(1)).is_err());
        assert!(limiter.check(ip(2)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_it_elapses() {
        let limiter = RateLimiter::new(2, WINDOW);
        limiter.check(ip(1)).unwrap();
        limiter.check(ip(1)).unwrap();

        tokio::time::advance(Duration::from_secs(600)).await;
        let FrugalError::RateLimited { retry_after } = limiter.check(ip(1)).unwrap_err() else {
            panic!("expected rate limit");
        };
        assert_eq!(retry_after, Duration::from_secs(300));

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(limiter.check(ip(1)).unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_elapsed_windows() {
        let limiter = RateLimiter::new(10, WINDOW);
        limiter.check(ip(1)).unwrap();
        tokio::time::advance(Duration::from_secs(800)).await;
        limiter.check(ip(2)).unwrap();
        tokio::time::advance(Duration::from_secs(100)).await;

        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }
}

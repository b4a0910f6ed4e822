//! In-memory fixed-window rate limiter keyed by client address.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::extract::client_ip;
use crate::state::AppState;

/// Table size above which expired windows are swept on the next check.
const SWEEP_THRESHOLD: usize = 1000;

struct RateEntry {
    count: u32,
    window_start: Instant,
}

/// Per-client request budget. `max_requests == 0` disables limiting.
#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<Mutex<HashMap<String, RateEntry>>>,
    max_requests: u32,
    window_secs: u64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window_secs,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    /// Count one request for `key`. Returns `false` once the budget is spent.
    pub async fn check(&self, key: &str) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.len() > SWEEP_THRESHOLD {
            entries.retain(|_, v| now.duration_since(v.window_start).as_secs() < self.window_secs);
        }

        let entry = entries.entry(key.to_string()).or_insert(RateEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= self.window_secs {
            entry.count = 1;
            entry.window_start = now;
            return true;
        }

        entry.count += 1;
        entry.count <= self.max_requests
    }
}

/// Middleware rejecting a client with 429 once its window budget is spent.
pub async fn enforce(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(req.headers(), req.extensions(), &state.config.trusted_proxies);

    if !state.rate_limiter.check(&ip).await {
        tracing::warn!(client_ip = %ip, "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn budget_is_per_client() {
        let limiter = RateLimiter::new(2, 60);
        assert!(limiter.check("a").await);
        assert!(limiter.check("a").await);
        assert!(!limiter.check("a").await);
        assert!(limiter.check("b").await);
    }

    #[tokio::test]
    async fn zero_budget_disables_limiting() {
        let limiter = RateLimiter::new(0, 60);
        for _ in 0..10 {
            assert!(limiter.check("a").await);
        }
    }
}

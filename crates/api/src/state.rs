use std::sync::Arc;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;
use crate::services::audit::AuditRecorder;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pxe_db::DbPool,
    /// Server configuration, including auth tokens and lifecycle policy.
    pub config: Arc<ServerConfig>,
    /// Audit writer with its failure counter.
    pub audit: AuditRecorder,
    /// Per-client request budget.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(pool: pxe_db::DbPool, config: ServerConfig) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute, 60);
        Self {
            pool,
            config: Arc::new(config),
            audit: AuditRecorder::default(),
            rate_limiter,
        }
    }
}

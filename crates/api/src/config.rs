use std::path::PathBuf;
use std::time::Duration;

use ipnetwork::IpNetwork;
use pxe_core::lifecycle::LifecyclePolicy;
use pxe_db::PoolSettings;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Whole-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://data/pxe.db`).
    pub database_url: String,
    pub db_max_connections: u32,
    /// Bound on waiting for a connection or the SQLite write lock.
    pub db_acquire_timeout_secs: u64,
    /// Accepted bearer tokens. Empty means every protected call is rejected.
    pub auth_tokens: Vec<String>,
    /// Peers whose `X-Forwarded-For` header is believed. Every other caller
    /// is identified by its socket address.
    pub trusted_proxies: Vec<IpNetwork>,
    /// Requests per client per minute; `0` disables rate limiting.
    pub rate_limit_per_minute: u32,
    /// Permit `pending -> installed` without a confirm.
    pub allow_direct_install: bool,
    /// Reject applying a template to a server that is still `pending`.
    pub apply_require_confirmed: bool,
    /// TFTP root for rendered boot files. `None` disables rendering.
    pub tftp_root: Option<PathBuf>,
    /// Also write the UEFI grub config when rendering.
    pub enable_uefi: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `8080`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:8000`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                     |
    /// | `DATABASE_URL`            | `sqlite://data/pxe.db`   |
    /// | `DB_MAX_CONNECTIONS`      | `8`                      |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                      |
    /// | `PXE_AUTH_TOKEN`          | (empty)                  |
    /// | `TRUSTED_PROXIES`         | (empty)                  |
    /// | `RATE_LIMIT_PER_MINUTE`   | `100`                    |
    /// | `ALLOW_DIRECT_INSTALL`    | `false`                  |
    /// | `APPLY_REQUIRE_CONFIRMED` | `false`                  |
    /// | `TFTP_ROOT`               | (unset)                  |
    /// | `PXE_ENABLE_UEFI`         | `true`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", "8080")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(&env_or("CORS_ORIGINS", "http://localhost:8000"));

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = env_or("DATABASE_URL", "sqlite://data/pxe.db");

        let db_max_connections: u32 = env_or("DB_MAX_CONNECTIONS", "8")
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let db_acquire_timeout_secs: u64 = env_or("DB_ACQUIRE_TIMEOUT_SECS", "5")
            .parse()
            .expect("DB_ACQUIRE_TIMEOUT_SECS must be a valid u64");

        let auth_tokens = split_list(&env_or("PXE_AUTH_TOKEN", ""));

        let trusted_proxies: Vec<IpNetwork> = split_list(&env_or("TRUSTED_PROXIES", ""))
            .iter()
            .map(|net| {
                net.parse::<IpNetwork>()
                    .unwrap_or_else(|e| panic!("Invalid TRUSTED_PROXIES entry '{net}': {e}"))
            })
            .collect();

        let rate_limit_per_minute: u32 = env_or("RATE_LIMIT_PER_MINUTE", "100")
            .parse()
            .expect("RATE_LIMIT_PER_MINUTE must be a valid u32");

        let allow_direct_install = parse_flag(&env_or("ALLOW_DIRECT_INSTALL", "false"))
            .expect("ALLOW_DIRECT_INSTALL must be true or false");

        let apply_require_confirmed = parse_flag(&env_or("APPLY_REQUIRE_CONFIRMED", "false"))
            .expect("APPLY_REQUIRE_CONFIRMED must be true or false");

        let tftp_root = std::env::var("TFTP_ROOT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let enable_uefi = parse_flag(&env_or("PXE_ENABLE_UEFI", "true"))
            .expect("PXE_ENABLE_UEFI must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            db_max_connections,
            db_acquire_timeout_secs,
            auth_tokens,
            trusted_proxies,
            rate_limit_per_minute,
            allow_direct_install,
            apply_require_confirmed,
            tftp_root,
            enable_uefi,
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }

    pub fn lifecycle_policy(&self) -> LifecyclePolicy {
        LifecyclePolicy {
            allow_direct_install: self.allow_direct_install,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a boolean switch. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

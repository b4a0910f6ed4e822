//! Shared helpers for API integration tests.
//!
//! Every test app gets its own migrated SQLite file in a temp directory and
//! the same router (and middleware stack) that `main.rs` serves.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use pxe_api::config::ServerConfig;
use pxe_api::router::build_app_router;
use pxe_api::state::AppState;
use pxe_db::repositories::AuditLogRepo;
use pxe_db::PoolSettings;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Bearer token accepted by every test app.
pub const TOKEN: &str = "test-token";

/// Build a test `ServerConfig` with safe defaults.
///
/// Rate limiting is off and PXE rendering is disabled unless a test opts in.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8000".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 8,
        db_acquire_timeout_secs: 5,
        auth_tokens: vec![TOKEN.to_string()],
        trusted_proxies: Vec::new(),
        rate_limit_per_minute: 0,
        allow_direct_install: false,
        apply_require_confirmed: false,
        tftp_root: None,
        enable_uefi: true,
    }
}

/// A running application plus the handles tests need to inspect it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    /// Send a request carrying the test bearer token.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {TOKEN}"));
        self.dispatch(builder, body).await
    }

    /// Send a request without any credentials.
    pub async fn send_anonymous(&self, method: Method, uri: &str) -> Response {
        self.dispatch(Request::builder().method(method).uri(uri), None)
            .await
    }

    pub async fn dispatch(
        &self,
        builder: axum::http::request::Builder,
        body: Option<Value>,
    ) -> Response {
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Option<Value>) -> Response {
        self.send(Method::POST, uri, body).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.send(Method::PUT, uri, Some(body)).await
    }

    /// Register a server through the report endpoint; it starts `pending`.
    pub async fn register_server(&self, serial: &str) {
        let response = self.post("/api/report", Some(report_body(serial, "req-1"))).await;
        assert_eq!(response.status(), StatusCode::OK, "report for {serial} failed");
    }

    /// Create a template and return its id.
    pub async fn create_template(&self, name: &str, system_type: &str) -> i64 {
        let response = self
            .post(
                "/api/configs",
                Some(json!({
                    "name": name,
                    "systemType": system_type,
                    "systemVersion": "8",
                    "configContent": "#body",
                    "kernelParams": "text",
                    "packages": "vim",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_i64().unwrap()
    }

    /// Number of stored audit entries.
    pub async fn audit_count(&self) -> i64 {
        AuditLogRepo::count(&self.state.pool).await.unwrap()
    }
}

/// Build a test app with the default test configuration.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Build a test app after letting the caller adjust the configuration.
pub async fn spawn_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.database_url = format!("sqlite://{}", dir.path().join("pxe.db").display());
    adjust(&mut config);

    let pool = pxe_db::create_pool(&config.database_url, &PoolSettings::default())
        .await
        .unwrap();
    pxe_db::run_migrations(&pool).await.unwrap();

    let state = AppState::new(pool, config.clone());
    let router = build_app_router(state.clone(), &config);
    TestApp { router, state, dir }
}

/// Minimal valid inventory report.
pub fn report_body(serial: &str, request_id: &str) -> Value {
    json!({
        "requestId": request_id,
        "serial": serial,
        "hostname": format!("srv-{}", serial.to_lowercase()),
        "ipAddress": "192.168.88.10",
        "macAddress": "00:11:22:aa:bb:cc",
        "gateway": "192.168.88.1",
        "lanNic": "eth0",
        "cpuProcessor": 16,
        "memTotal": 65536,
    })
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

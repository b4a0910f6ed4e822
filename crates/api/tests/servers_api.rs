//! Integration tests for the Server Registry endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, report_body};
use serde_json::json;

// ---------------------------------------------------------------------------
// Listing and lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_defaults_to_pending() {
    let app = common::spawn_app().await;
    app.register_server("AAA111").await;
    app.register_server("BBB222").await;
    app.post("/api/servers/BBB222/confirm", None).await;

    let json = body_json(app.get("/api/servers").await).await;
    let serials: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["serial"].as_str().unwrap())
        .collect();
    assert_eq!(serials, vec!["AAA111"]);

    let confirmed = body_json(app.get("/api/servers?status=confirmed").await).await;
    assert_eq!(confirmed.as_array().unwrap().len(), 1);
    assert_eq!(confirmed[0]["serial"], "BBB222");
}

#[tokio::test]
async fn unknown_status_filter_returns_empty_list() {
    let app = common::spawn_app().await;
    app.register_server("AAA111").await;

    let response = app.get("/api/servers?status=bogus").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn get_returns_inventory_in_camel_case() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;

    let response = app.get("/api/servers/ABC123").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["serial"], "ABC123");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["macAddress"], "00:11:22:aa:bb:cc");
    assert_eq!(json["cpuProcessor"], 16);
    assert!(json["createdAt"].is_string());
}

#[tokio::test]
async fn unknown_serial_is_404_for_every_operation() {
    let app = common::spawn_app().await;

    for response in [
        app.get("/api/servers/GHOST").await,
        app.post("/api/servers/GHOST/confirm", None).await,
        app.post("/api/servers/GHOST/install", None).await,
        app.get("/api/servers/GHOST/applications").await,
    ] {
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }
    assert_eq!(app.audit_count().await, 0);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirm_then_install() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;

    let response = app.post("/api/servers/ABC123/confirm", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["serverStatus"], "confirmed");
    assert_eq!(json["transitioned"], true);
    assert!(json["message"].as_str().unwrap().contains("ABC123"));

    let response = app.post("/api/servers/ABC123/install", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["serverStatus"], "installed");

    let server = body_json(app.get("/api/servers/ABC123").await).await;
    assert_eq!(server["status"], "installed");
}

#[tokio::test]
async fn repeated_confirm_is_idempotent_and_audited() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;
    let before = app.audit_count().await;

    app.post("/api/servers/ABC123/confirm", None).await;
    let response = app.post("/api/servers/ABC123/confirm", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["transitioned"], false);
    assert_eq!(json["serverStatus"], "confirmed");

    assert_eq!(app.audit_count().await, before + 2);

    let logs = body_json(app.get("/api/audit/logs?limit=1").await).await;
    assert_eq!(logs[0]["action"], "server.confirm");
    assert_eq!(logs[0]["metadata"]["transitioned"], false);
}

#[tokio::test]
async fn strict_policy_rejects_install_from_pending() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;
    let before = app.audit_count().await;

    let response = app.post("/api/servers/ABC123/install", None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"].as_str().unwrap().contains("must be confirmed"));
    assert_eq!(app.audit_count().await, before);

    let server = body_json(app.get("/api/servers/ABC123").await).await;
    assert_eq!(server["status"], "pending");
}

#[tokio::test]
async fn permissive_policy_allows_direct_install() {
    let app = common::spawn_app_with(|c| c.allow_direct_install = true).await;
    app.register_server("ABC123").await;

    let response = app.post("/api/servers/ABC123/install", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let logs = body_json(app.get("/api/audit/logs?limit=1").await).await;
    assert_eq!(logs[0]["metadata"]["from"], "pending");
    assert_eq!(logs[0]["metadata"]["to"], "installed");
}

#[tokio::test]
async fn installed_server_never_regresses() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;
    app.post("/api/servers/ABC123/confirm", None).await;
    app.post("/api/servers/ABC123/install", None).await;

    let again = app.post("/api/servers/ABC123/install", None).await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(body_json(again).await["transitioned"], false);

    let confirm = app.post("/api/servers/ABC123/confirm", None).await;
    assert_eq!(confirm.status(), StatusCode::CONFLICT);

    let server = body_json(app.get("/api/servers/ABC123").await).await;
    assert_eq!(server["status"], "installed");
}

#[tokio::test]
async fn concurrent_confirms_transition_exactly_once() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;
    let before = app.audit_count().await;

    let calls = (0..8).map(|_| app.post("/api/servers/ABC123/confirm", None));
    let responses = futures::future::join_all(calls).await;

    let mut transitioned = 0;
    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
        if body_json(response).await["transitioned"] == true {
            transitioned += 1;
        }
    }
    assert_eq!(transitioned, 1);
    assert_eq!(app.audit_count().await, before + 8);
}

// ---------------------------------------------------------------------------
// Enrollment reports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_registers_a_pending_server() {
    let app = common::spawn_app().await;

    let response = app
        .post("/api/report", Some(report_body("NEW001", "r-1")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["duplicate"], false);

    let logs = body_json(app.get("/api/audit/logs?limit=1").await).await;
    assert_eq!(logs[0]["action"], "server.report");
    assert_eq!(logs[0]["target"], "NEW001");
    assert_eq!(logs[0]["metadata"]["created"], true);
}

#[tokio::test]
async fn replayed_report_changes_nothing() {
    let app = common::spawn_app().await;
    app.post("/api/report", Some(report_body("NEW001", "r-1")))
        .await;
    let before = app.audit_count().await;

    let mut replay = report_body("NEW001", "r-1");
    replay["hostname"] = json!("renamed");
    let response = app.post("/api/report", Some(replay)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["duplicate"], true);
    assert_eq!(app.audit_count().await, before);

    let server = body_json(app.get("/api/servers/NEW001").await).await;
    assert_eq!(server["hostname"], "srv-new001");
}

#[tokio::test]
async fn re_report_refreshes_inventory_but_not_status() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;
    app.post("/api/servers/ABC123/confirm", None).await;

    let mut fresh = report_body("ABC123", "req-2");
    fresh["hostname"] = json!("rebuilt");
    let response = app.post("/api/report", Some(fresh)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let server = body_json(app.get("/api/servers/ABC123").await).await;
    assert_eq!(server["hostname"], "rebuilt");
    assert_eq!(server["status"], "confirmed");
}

#[tokio::test]
async fn report_without_required_fields_is_422() {
    let app = common::spawn_app().await;

    let mut body = report_body("ABC123", "r-1");
    body["macAddress"] = json!("");
    let response = app.post("/api/report", Some(body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("macAddress"));

    let response = app
        .post("/api/report", Some(json!({ "serial": "ABC123" })))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.audit_count().await, 0);
}

#[tokio::test]
async fn audit_write_failure_does_not_block_transition() {
    let app = common::spawn_app().await;
    app.register_server("ABC123").await;

    sqlx::query("DROP TABLE audit_logs")
        .execute(&app.state.pool)
        .await
        .unwrap();

    let response = app.post("/api/servers/ABC123/confirm", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(app.send_anonymous(Method::GET, "/health").await).await;
    assert_eq!(health["auditWriteFailures"], 1);

    let server = body_json(app.get("/api/servers/ABC123").await).await;
    assert_eq!(server["status"], "confirmed");
}

//! Integration tests for the ConfigTemplate Store endpoints.

mod common;

use axum::http::{Method, Request, StatusCode};
use common::body_json;
use serde_json::json;

fn centos_base() -> serde_json::Value {
    json!({
        "name": "CentOS-Base",
        "description": "Minimal CentOS 8",
        "systemType": "CentOS",
        "systemVersion": "8",
        "configContent": "#kickstart body",
        "kernelParams": "text console=ttyS0",
        "packages": "vim\nnet-tools",
    })
}

#[tokio::test]
async fn create_then_get_returns_submitted_fields() {
    let app = common::spawn_app().await;

    let response = app.post("/api/configs", Some(centos_base())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["warnings"], json!([]));

    let template = body_json(app.get("/api/configs/1").await).await;
    for field in [
        "name",
        "description",
        "systemType",
        "systemVersion",
        "configContent",
        "kernelParams",
        "packages",
    ] {
        assert_eq!(template[field], centos_base()[field], "field {field}");
    }
    assert_eq!(template["status"], "active");
}

#[tokio::test]
async fn empty_system_version_is_flagged() {
    let app = common::spawn_app().await;

    let response = app
        .post(
            "/api/configs",
            Some(json!({ "name": "Debian", "systemType": "debian" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await["warnings"],
        json!(["systemVersion is empty"])
    );
}

#[tokio::test]
async fn missing_required_fields_are_422() {
    let app = common::spawn_app().await;

    for body in [
        json!({ "systemType": "CentOS" }),
        json!({ "name": "CentOS-Base", "systemType": "  " }),
    ] {
        let response = app.post("/api/configs", Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
    assert_eq!(app.audit_count().await, 0);
}

#[tokio::test]
async fn malformed_json_is_422_with_json_body() {
    let app = common::spawn_app().await;

    let builder = Request::builder()
        .method(Method::POST)
        .uri("/api/configs")
        .header("Authorization", format!("Bearer {}", common::TOKEN))
        .header("Content-Type", "application/json");
    let request = builder.body(axum::body::Body::from("{not json")).unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_is_a_total_overwrite() {
    let app = common::spawn_app().await;
    app.post("/api/configs", Some(centos_base())).await;

    let response = app
        .put(
            "/api/configs/1",
            json!({ "name": "Ubuntu-Base", "systemType": "ubuntu", "systemVersion": "22.04" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let template = body_json(app.get("/api/configs/1").await).await;
    assert_eq!(template["name"], "Ubuntu-Base");
    assert_eq!(template["systemVersion"], "22.04");
    assert_eq!(template["description"], "");
    assert_eq!(template["configContent"], "");
    assert_eq!(template["kernelParams"], "");
    assert_eq!(template["packages"], "");

    let logs = body_json(app.get("/api/audit/logs?limit=1").await).await;
    assert_eq!(logs[0]["action"], "config.update");
    assert_eq!(logs[0]["target"], "1");
}

#[tokio::test]
async fn update_unknown_template_is_404() {
    let app = common::spawn_app().await;

    let response = app.put("/api/configs/42", centos_base()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.put("/api/configs/not-a-number", centos_base()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.audit_count().await, 0);
}

#[tokio::test]
async fn update_with_invalid_fields_is_422_and_keeps_old_values() {
    let app = common::spawn_app().await;
    app.post("/api/configs", Some(centos_base())).await;

    let response = app.put("/api/configs/1", json!({ "name": "" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let template = body_json(app.get("/api/configs/1").await).await;
    assert_eq!(template["name"], "CentOS-Base");
}

#[tokio::test]
async fn list_is_ordered_by_id_and_allows_duplicate_names() {
    let app = common::spawn_app().await;
    app.post("/api/configs", Some(centos_base())).await;
    app.post("/api/configs", Some(centos_base())).await;

    let json = body_json(app.get("/api/configs").await).await;
    let ids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn get_unknown_template_is_404() {
    let app = common::spawn_app().await;
    let response = app.get("/api/configs/7").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "config template '7' not found"
    );
}

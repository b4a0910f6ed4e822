//! Handler for inventory reports posted by the installer agent.

use axum::extract::State;
use axum::Json;
use pxe_db::models::server::ServerReport;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{ApiJson, RequestMeta};
use crate::response::MessageResponse;
use crate::services::registry::{self, ReportOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReportDetails {
    pub serial: String,
    pub duplicate: bool,
}

/// POST /api/report
///
/// Idempotent by `(serial, requestId)`; a replay is acknowledged with
/// `duplicate: true` and changes nothing.
pub async fn submit_report(
    State(state): State<AppState>,
    meta: RequestMeta,
    ApiJson(report): ApiJson<ServerReport>,
) -> AppResult<Json<MessageResponse<ReportDetails>>> {
    let outcome = registry::report(&state, &meta, &report).await?;

    let message = match outcome {
        ReportOutcome::Registered => "Server registered",
        ReportOutcome::Refreshed => "Server inventory updated",
        ReportOutcome::Duplicate => "Report already processed",
    };
    Ok(Json(MessageResponse::success(
        message,
        ReportDetails {
            serial: report.serial,
            duplicate: outcome == ReportOutcome::Duplicate,
        },
    )))
}

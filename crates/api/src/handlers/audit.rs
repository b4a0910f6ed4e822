//! Handler for audit log queries.

use axum::extract::State;
use axum::http::HeaderName;
use axum::response::IntoResponse;
use axum::Json;
use pxe_core::audit::{AuditFilter, AuditWindow};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::services::audit;
use crate::state::AppState;

/// Response header carrying the total number of stored entries.
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Window and filter parameters for `GET /api/audit/logs`.
#[derive(Debug, Deserialize)]
pub struct AuditLogQueryParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub order: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub action: Option<String>,
    pub status: Option<String>,
}

/// GET /api/audit/logs?offset=&limit=&order=
///
/// The window is taken first; the method/path/action/status predicate is
/// applied to that window only.
pub async fn query_audit_logs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AuditLogQueryParams>,
) -> AppResult<impl IntoResponse> {
    let window = AuditWindow::new(params.offset, params.limit, params.order.as_deref())?;
    let filter = AuditFilter {
        method: params.method,
        path: params.path,
        action: params.action,
        status: params.status,
    };

    let page = audit::query(&state.pool, &window, &filter).await?;

    Ok(([(TOTAL_COUNT_HEADER, page.total.to_string())], Json(page.entries)))
}

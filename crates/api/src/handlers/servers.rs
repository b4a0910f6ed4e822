//! Handlers for the Server Registry.

use axum::extract::{Path, State};
use axum::Json;
use pxe_core::lifecycle::{LifecycleAction, ServerStatus, TransitionOutcome};
use pxe_db::models::config_application::ConfigApplication;
use pxe_db::models::server::Server;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::{ApiQuery, RequestMeta};
use crate::response::MessageResponse;
use crate::services::registry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListServersParams {
    pub status: Option<String>,
}

/// Details attached to a lifecycle acknowledgement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDetails {
    pub serial: String,
    pub server_status: ServerStatus,
    pub transitioned: bool,
}

/// GET /api/servers?status=
pub async fn list_servers(
    State(state): State<AppState>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ListServersParams>,
) -> AppResult<Json<Vec<Server>>> {
    let servers = registry::list(&state, &meta, params.status.as_deref()).await?;
    Ok(Json(servers))
}

/// GET /api/servers/{serial}
pub async fn get_server(
    State(state): State<AppState>,
    meta: RequestMeta,
    Path(serial): Path<String>,
) -> AppResult<Json<Server>> {
    Ok(Json(registry::get(&state, &meta, &serial).await?))
}

/// GET /api/servers/{serial}/applications
pub async fn list_applications(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> AppResult<Json<Vec<ConfigApplication>>> {
    Ok(Json(registry::applications(&state.pool, &serial).await?))
}

/// POST /api/servers/{serial}/confirm
pub async fn confirm_server(
    State(state): State<AppState>,
    meta: RequestMeta,
    Path(serial): Path<String>,
) -> AppResult<Json<MessageResponse<TransitionDetails>>> {
    run(&state, &meta, serial, LifecycleAction::Confirm).await
}

/// POST /api/servers/{serial}/install
pub async fn install_server(
    State(state): State<AppState>,
    meta: RequestMeta,
    Path(serial): Path<String>,
) -> AppResult<Json<MessageResponse<TransitionDetails>>> {
    run(&state, &meta, serial, LifecycleAction::Install).await
}

async fn run(
    state: &AppState,
    meta: &RequestMeta,
    serial: String,
    action: LifecycleAction,
) -> AppResult<Json<MessageResponse<TransitionDetails>>> {
    let outcome = registry::transition(state, meta, &serial, action).await?;

    let message = match outcome {
        TransitionOutcome::Advanced { to, .. } => format!("Server {serial} is now {to}"),
        TransitionOutcome::Unchanged { status } => format!("Server {serial} is already {status}"),
    };

    Ok(Json(MessageResponse::success(
        message,
        TransitionDetails {
            serial,
            server_status: outcome.status(),
            transitioned: outcome.transitioned(),
        },
    )))
}

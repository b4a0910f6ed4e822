//! Handlers for configuration templates and the apply operation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pxe_core::types::DbId;
use pxe_db::models::config_template::{ConfigTemplate, TemplateInput};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiQuery, RequestMeta};
use crate::response::MessageResponse;
use crate::services::{apply, templates};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CreatedTemplate {
    pub id: DbId,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyParams {
    pub serial: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDetails {
    pub application_id: DbId,
    pub template_id: DbId,
    pub serial: String,
    pub artifacts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// GET /api/configs
pub async fn list_configs(State(state): State<AppState>) -> AppResult<Json<Vec<ConfigTemplate>>> {
    Ok(Json(templates::list(&state.pool).await?))
}

/// GET /api/configs/{id}
pub async fn get_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ConfigTemplate>> {
    Ok(Json(templates::get(&state.pool, &id).await?))
}

/// POST /api/configs
///
/// Returns 201 with the new id and any soft-validation warnings.
pub async fn create_config(
    State(state): State<AppState>,
    meta: RequestMeta,
    ApiJson(input): ApiJson<TemplateInput>,
) -> AppResult<(StatusCode, Json<CreatedTemplate>)> {
    let (template, warnings) = templates::create(&state, &meta, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedTemplate {
            id: template.id,
            warnings,
        }),
    ))
}

/// PUT /api/configs/{id}
///
/// Full replace: omitted fields are stored as empty.
pub async fn update_config(
    State(state): State<AppState>,
    meta: RequestMeta,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<TemplateInput>,
) -> AppResult<Json<ConfigTemplate>> {
    Ok(Json(templates::update(&state, &meta, &id, &input).await?))
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// POST /api/configs/{id}/apply?serial=
pub async fn apply_config(
    State(state): State<AppState>,
    meta: RequestMeta,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<ApplyParams>,
) -> AppResult<Json<MessageResponse<ApplyDetails>>> {
    let applied = apply::apply(&state, &meta, &id, params.serial.as_deref()).await?;

    let message = format!(
        "Template '{}' applied to server {}",
        applied.template_name, applied.binding.serial
    );
    Ok(Json(MessageResponse::success(
        message,
        ApplyDetails {
            application_id: applied.binding.id,
            template_id: applied.binding.template_id,
            serial: applied.binding.serial,
            artifacts: applied
                .artifacts
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        },
    )))
}

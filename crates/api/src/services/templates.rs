//! ConfigTemplate Store.

use chrono::Utc;
use pxe_core::audit::{actions, outcomes};
use pxe_core::error::CoreError;
use pxe_core::template::{parse_template_id, validate_fields};
use pxe_db::models::config_template::{ConfigTemplate, TemplateInput};
use pxe_db::repositories::ConfigTemplateRepo;
use pxe_db::DbPool;
use serde_json::json;

use crate::error::AppResult;
use crate::extract::RequestMeta;
use crate::state::AppState;

pub async fn list(pool: &DbPool) -> AppResult<Vec<ConfigTemplate>> {
    Ok(ConfigTemplateRepo::list(pool).await?)
}

/// Look up a template by its raw path id.
pub async fn get(pool: &DbPool, raw_id: &str) -> AppResult<ConfigTemplate> {
    let id = parse_template_id(raw_id)?;
    let template = ConfigTemplateRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("config template", id))?;
    Ok(template)
}

/// Create a template. Returns the new row and any soft-validation warnings.
pub async fn create(
    state: &AppState,
    meta: &RequestMeta,
    input: &TemplateInput,
) -> AppResult<(ConfigTemplate, Vec<String>)> {
    let warnings = validate_fields(&input.fields())?;

    let mut tx = state.pool.begin().await?;
    let template = ConfigTemplateRepo::create(&mut *tx, input, Utc::now()).await?;

    let mut entry = meta.audit_entry(actions::CONFIG_CREATE, &template.id.to_string(), outcomes::SUCCESS);
    entry.metadata = Some(json!({
        "templateId": template.id,
        "name": template.name,
        "warnings": warnings,
    }));
    state.audit.record_in(&mut *tx, &entry).await;

    tx.commit().await?;

    tracing::info!(id = template.id, name = %template.name, "Config template created");
    Ok((template, warnings))
}

/// Replace every mutable field of a template.
pub async fn update(
    state: &AppState,
    meta: &RequestMeta,
    raw_id: &str,
    input: &TemplateInput,
) -> AppResult<ConfigTemplate> {
    let id = parse_template_id(raw_id)?;
    let warnings = validate_fields(&input.fields())?;

    let mut tx = state.pool.begin().await?;
    let template = ConfigTemplateRepo::replace(&mut *tx, id, input, Utc::now())
        .await?
        .ok_or_else(|| CoreError::not_found("config template", id))?;

    let mut entry = meta.audit_entry(actions::CONFIG_UPDATE, &id.to_string(), outcomes::SUCCESS);
    entry.metadata = Some(json!({
        "templateId": id,
        "warnings": warnings,
    }));
    state.audit.record_in(&mut *tx, &entry).await;

    tx.commit().await?;

    tracing::info!(id, "Config template updated");
    Ok(template)
}

//! Application Engine: bind a template to a server, optionally rendering
//! the PXE boot file into the TFTP root.
//!
//! Everything that can be rejected (lookups, policy, rendering) is checked
//! before the transaction opens. The boot file is written while the
//! transaction is still open, and a failed write rolls the binding back.

use std::path::{Path, PathBuf};

use chrono::Utc;
use pxe_core::audit::{actions, outcomes};
use pxe_core::error::CoreError;
use pxe_core::lifecycle::ServerStatus;
use pxe_core::pxe::{self, BootFile, BootTarget, InstallSource};
use pxe_core::template::parse_template_id;
use pxe_db::models::config_application::ConfigApplication;
use pxe_db::models::config_template::ConfigTemplate;
use pxe_db::models::server::Server;
use pxe_db::repositories::{ConfigApplicationRepo, ConfigTemplateRepo, ServerRepo};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extract::RequestMeta;
use crate::state::AppState;

/// A recorded binding plus what it was made of.
#[derive(Debug)]
pub struct Applied {
    pub binding: ConfigApplication,
    pub template_name: String,
    /// Files written under the TFTP root, empty when rendering is disabled.
    pub artifacts: Vec<PathBuf>,
}

/// Apply template `raw_id` to the server identified by `serial`.
pub async fn apply(
    state: &AppState,
    meta: &RequestMeta,
    raw_id: &str,
    serial: Option<&str>,
) -> AppResult<Applied> {
    let template_id = parse_template_id(raw_id)?;
    let serial = serial
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::Validation("serial query parameter is required".into()))?;

    let template = ConfigTemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or_else(|| CoreError::not_found("config template", template_id))?;
    let server = ServerRepo::find_by_serial(&state.pool, serial)
        .await?
        .ok_or_else(|| CoreError::not_found("server", serial))?;

    if state.config.apply_require_confirmed
        && server.lifecycle_status() == Some(ServerStatus::Pending)
    {
        return Err(CoreError::Conflict(format!(
            "Cannot apply a template to server {serial} while it is pending; confirm it first"
        ))
        .into());
    }

    let boot_file = match state.config.tftp_root {
        Some(_) => Some(render(&server, &template, state.config.enable_uefi)?),
        None => None,
    };
    let artifact_path = boot_file
        .as_ref()
        .and_then(|f| f.paths.first())
        .map(|p| p.display().to_string());

    let mut tx = state.pool.begin().await?;
    let binding = ConfigApplicationRepo::insert(
        &mut *tx,
        template.id,
        &server.serial,
        artifact_path.as_deref(),
        Utc::now(),
    )
    .await?;

    let mut entry = meta.audit_entry(actions::CONFIG_APPLY, &server.serial, outcomes::SUCCESS);
    entry.metadata = Some(json!({
        "templateId": template.id,
        "serial": server.serial,
        "applicationId": binding.id,
        "artifactPath": artifact_path,
    }));
    state.audit.record_in(&mut *tx, &entry).await;

    let mut artifacts = Vec::new();
    if let (Some(root), Some(file)) = (&state.config.tftp_root, &boot_file) {
        artifacts = write_boot_file(root, file).await.map_err(|e| {
            AppError::InternalError(format!(
                "Failed to write boot file for {}: {e}",
                server.serial
            ))
        })?;
    }

    tx.commit().await?;

    tracing::info!(
        template_id = template.id,
        serial = %server.serial,
        artifacts = artifacts.len(),
        "Config template applied"
    );
    Ok(Applied {
        binding,
        template_name: template.name,
        artifacts,
    })
}

fn render(server: &Server, template: &ConfigTemplate, uefi: bool) -> Result<BootFile, CoreError> {
    let target = BootTarget {
        serial: &server.serial,
        hostname: &server.hostname,
        ip_address: &server.ip_address,
        mac_address: &server.mac_address,
        gateway: &server.gateway,
        lan_nic: &server.lan_nic,
    };
    let source = InstallSource {
        system_type: &template.system_type,
        config_content: &template.config_content,
        kernel_params: &template.kernel_params,
        packages: &template.packages,
    };
    pxe::render(&target, &source, uefi)
}

/// Write `file` to each of its paths under `root`, creating directories.
async fn write_boot_file(root: &Path, file: &BootFile) -> std::io::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(file.paths.len());
    for relative in &file.paths {
        let full = root.join(relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &file.content).await?;
        written.push(full);
    }
    Ok(written)
}

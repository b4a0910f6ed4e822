//! Template-to-server binding records.

use pxe_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `config_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigApplication {
    pub id: DbId,
    pub template_id: DbId,
    pub serial: String,
    /// First boot file written for this binding, if PXE rendering is enabled.
    pub artifact_path: Option<String>,
    pub applied_at: Timestamp,
}

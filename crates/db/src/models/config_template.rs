//! Configuration template models and DTOs.

use pxe_core::template::TemplateFields;
use pxe_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `config_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTemplate {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub system_type: String,
    pub system_version: String,
    pub config_content: String,
    pub kernel_params: String,
    pub packages: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Full set of mutable template fields.
///
/// Used for both create and update. Update is a total overwrite: a field the
/// client leaves out is stored as empty, never carried over from the old row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateInput {
    pub name: String,
    pub description: String,
    pub system_type: String,
    pub system_version: String,
    pub config_content: String,
    pub kernel_params: String,
    pub packages: String,
}

impl TemplateInput {
    pub fn fields(&self) -> TemplateFields<'_> {
        TemplateFields {
            name: &self.name,
            description: &self.description,
            system_type: &self.system_type,
            system_version: &self.system_version,
            config_content: &self.config_content,
            kernel_params: &self.kernel_params,
            packages: &self.packages,
        }
    }
}

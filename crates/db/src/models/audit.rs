//! Audit log entity and insert DTO.
//!
//! Entries are immutable: the table has no `updated_at` and triggers reject
//! UPDATE and DELETE.

use pxe_core::audit::AuditFields;
use pxe_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: DbId,
    pub timestamp: Timestamp,
    pub client_ip: String,
    pub user_agent: String,
    pub method: String,
    pub path: String,
    pub action: String,
    pub target: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Json<serde_json::Value>>,
}

impl AuditFields for AuditLog {
    fn method(&self) -> &str {
        &self.method
    }
    fn path(&self) -> &str {
        &self.path
    }
    fn action(&self) -> &str {
        &self.action
    }
    fn status(&self) -> &str {
        &self.status
    }
}

/// DTO for inserting a new audit log entry.
#[derive(Debug, Clone, Default)]
pub struct CreateAuditLog {
    pub client_ip: String,
    pub user_agent: String,
    pub method: String,
    pub path: String,
    pub action: String,
    pub target: String,
    pub status: String,
    pub error: Option<String>,
    pub actor: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

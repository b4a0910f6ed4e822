//! Server registry models and the enrollment report DTO.

use pxe_core::lifecycle::ServerStatus;
use pxe_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `servers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: DbId,
    pub serial: String,
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
    pub gateway: String,
    pub install_time: String,
    pub sda_size: String,
    pub part: String,
    pub system_version: String,
    pub kernel_version: String,
    pub cpu_model: String,
    pub cpu_processor: i64,
    pub mem_total: i64,
    pub memory_num: i64,
    pub lan_nic: String,
    pub lan_nic_speed: String,
    pub wan_nic: String,
    pub wan_nic_speed: String,
    pub bond_nic: String,
    pub bond_nic_speed: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Server {
    /// Typed lifecycle status. The table's CHECK constraint keeps this `Some`.
    pub fn lifecycle_status(&self) -> Option<ServerStatus> {
        ServerStatus::from_str(&self.status)
    }
}

/// Inventory report posted by the installer agent when a machine PXE-boots.
///
/// `request_id`, `serial` and `mac_address` are required; everything else is
/// best-effort and defaults to empty/zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerReport {
    pub request_id: String,
    pub serial: String,
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
    pub gateway: String,
    pub install_time: String,
    pub sda_size: String,
    pub part: String,
    pub system_version: String,
    pub kernel_version: String,
    pub cpu_model: String,
    pub cpu_processor: i64,
    pub mem_total: i64,
    pub memory_num: i64,
    pub lan_nic: String,
    pub lan_nic_speed: String,
    pub wan_nic: String,
    pub wan_nic_speed: String,
    pub bond_nic: String,
    pub bond_nic_speed: String,
}

//! Repository for the `servers` and `processed_reports` tables.

use pxe_core::types::Timestamp;
use sqlx::SqliteExecutor;

use crate::models::server::{Server, ServerReport};
use crate::DbPool;

/// Column list for `servers` SELECT queries.
const COLUMNS: &str = "\
    id, serial, hostname, ip_address, mac_address, gateway, install_time, \
    sda_size, part, system_version, kernel_version, cpu_model, cpu_processor, \
    mem_total, memory_num, lan_nic, lan_nic_speed, wan_nic, wan_nic_speed, \
    bond_nic, bond_nic_speed, status, created_at, updated_at";

/// Provides registry queries and lifecycle updates for servers.
pub struct ServerRepo;

impl ServerRepo {
    /// List servers with the given status, oldest registration first.
    pub async fn list_by_status(pool: &DbPool, status: &str) -> Result<Vec<Server>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM servers WHERE status = ? ORDER BY id ASC");
        sqlx::query_as::<_, Server>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Find a server by its hardware serial.
    pub async fn find_by_serial<'e, E>(executor: E, serial: &str) -> Result<Option<Server>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM servers WHERE serial = ?");
        sqlx::query_as::<_, Server>(&query)
            .bind(serial)
            .fetch_optional(executor)
            .await
    }

    /// Current status of a server, or `None` if the serial is unknown.
    pub async fn find_status<'e, E>(executor: E, serial: &str) -> Result<Option<String>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, String>("SELECT status FROM servers WHERE serial = ?")
            .bind(serial)
            .fetch_optional(executor)
            .await
    }

    /// Move a server from `from` to `to` only if it is still in `from`.
    ///
    /// Returns `true` when the row changed. A concurrent writer that got there
    /// first leaves nothing to match, so at most one caller sees `true`.
    pub async fn advance_status<'e, E>(
        executor: E,
        serial: &str,
        from: &str,
        to: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE servers SET status = ?, updated_at = ? WHERE serial = ? AND status = ?",
        )
        .bind(to)
        .bind(now)
        .bind(serial)
        .bind(from)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remember that `(serial, request_id)` has been applied.
    ///
    /// Returns `false` if the pair was already recorded (a replay).
    pub async fn mark_report_processed<'e, E>(
        executor: E,
        serial: &str,
        request_id: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT INTO processed_reports (serial, request_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (serial, request_id) DO NOTHING",
        )
        .bind(serial)
        .bind(request_id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a newly discovered server as `pending`, or refresh the inventory
    /// of a known one. The status of an existing row is never touched.
    pub async fn upsert_inventory<'e, E>(
        executor: E,
        report: &ServerReport,
        now: Timestamp,
    ) -> Result<Server, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO servers ( \
                serial, hostname, ip_address, mac_address, gateway, install_time, \
                sda_size, part, system_version, kernel_version, cpu_model, cpu_processor, \
                mem_total, memory_num, lan_nic, lan_nic_speed, wan_nic, wan_nic_speed, \
                bond_nic, bond_nic_speed, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?) \
             ON CONFLICT (serial) DO UPDATE SET \
                hostname = excluded.hostname, \
                ip_address = excluded.ip_address, \
                mac_address = excluded.mac_address, \
                gateway = excluded.gateway, \
                install_time = excluded.install_time, \
                sda_size = excluded.sda_size, \
                part = excluded.part, \
                system_version = excluded.system_version, \
                kernel_version = excluded.kernel_version, \
                cpu_model = excluded.cpu_model, \
                cpu_processor = excluded.cpu_processor, \
                mem_total = excluded.mem_total, \
                memory_num = excluded.memory_num, \
                lan_nic = excluded.lan_nic, \
                lan_nic_speed = excluded.lan_nic_speed, \
                wan_nic = excluded.wan_nic, \
                wan_nic_speed = excluded.wan_nic_speed, \
                bond_nic = excluded.bond_nic, \
                bond_nic_speed = excluded.bond_nic_speed, \
                updated_at = excluded.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Server>(&query)
            .bind(&report.serial)
            .bind(&report.hostname)
            .bind(&report.ip_address)
            .bind(&report.mac_address)
            .bind(&report.gateway)
            .bind(&report.install_time)
            .bind(&report.sda_size)
            .bind(&report.part)
            .bind(&report.system_version)
            .bind(&report.kernel_version)
            .bind(&report.cpu_model)
            .bind(report.cpu_processor)
            .bind(report.mem_total)
            .bind(report.memory_num)
            .bind(&report.lan_nic)
            .bind(&report.lan_nic_speed)
            .bind(&report.wan_nic)
            .bind(&report.wan_nic_speed)
            .bind(&report.bond_nic)
            .bind(&report.bond_nic_speed)
            .bind(now)
            .bind(now)
            .fetch_one(executor)
            .await
    }
}

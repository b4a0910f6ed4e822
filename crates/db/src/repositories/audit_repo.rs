//! Repository for the append-only `audit_logs` table.

use pxe_core::audit::AuditWindow;
use sqlx::types::Json;
use sqlx::SqliteExecutor;

use crate::models::audit::{AuditLog, CreateAuditLog};
use crate::DbPool;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, timestamp, client_ip, user_agent, method, path, action, \
    target, status, error, actor, metadata";

/// Column list for INSERT (excludes the auto-assigned `id`).
const INSERT_COLUMNS: &str = "\
    timestamp, client_ip, user_agent, method, path, action, \
    target, status, error, actor, metadata";

/// RFC 3339 UTC with milliseconds, read from the database clock.
const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

// ---------------------------------------------------------------------------
// AuditLogRepo
// ---------------------------------------------------------------------------

/// Append and windowed-read operations for audit logs.
///
/// `id` is the sequence number: it is assigned in commit order and is the
/// only sort key, so windows in either direction agree on a single order.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one entry.
    ///
    /// The timestamp is taken by SQLite while the statement holds the write
    /// lock, so timestamps never decrease as `id` grows.
    pub async fn insert<'e, E>(executor: E, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO audit_logs ({INSERT_COLUMNS}) \
             VALUES ({NOW_SQL}, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&entry.client_ip)
            .bind(&entry.user_agent)
            .bind(&entry.method)
            .bind(&entry.path)
            .bind(&entry.action)
            .bind(&entry.target)
            .bind(&entry.status)
            .bind(&entry.error)
            .bind(&entry.actor)
            .bind(entry.metadata.as_ref().map(Json))
            .fetch_one(executor)
            .await
    }

    /// Fetch a contiguous window of the audit sequence.
    pub async fn query_window(
        pool: &DbPool,
        window: &AuditWindow,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs ORDER BY id {} LIMIT ? OFFSET ?",
            window.order.as_sql()
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of stored entries.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(pool)
            .await
    }
}

//! AuditLog: recording and windowed retrieval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pxe_core::audit::{AuditFilter, AuditWindow};
use pxe_db::models::audit::{AuditLog, CreateAuditLog};
use pxe_db::repositories::AuditLogRepo;
use pxe_db::DbPool;
use sqlx::{Connection, SqliteConnection};

use crate::error::AppResult;

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// Writes audit entries and counts the ones that could not be written.
///
/// A failed audit write never fails the operation it describes. It is logged
/// at ERROR and shows up in `/health` as `auditWriteFailures`.
#[derive(Debug, Clone, Default)]
pub struct AuditRecorder {
    failures: Arc<AtomicU64>,
}

impl AuditRecorder {
    /// Number of audit writes that failed since startup.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Append `entry` inside the caller's open transaction.
    ///
    /// The insert runs in a savepoint, so a failure unwinds only the audit
    /// row and the caller's transaction stays usable. Returns whether the
    /// entry was written.
    pub async fn record_in(&self, conn: &mut SqliteConnection, entry: &CreateAuditLog) -> bool {
        let result: Result<(), sqlx::Error> = async {
            let mut savepoint = conn.begin().await?;
            AuditLogRepo::insert(&mut *savepoint, entry).await?;
            savepoint.commit().await
        }
        .await;
        self.settle(entry, result)
    }

    /// Append `entry` on its own, outside any business transaction.
    pub async fn record(&self, pool: &DbPool, entry: &CreateAuditLog) -> bool {
        let result = AuditLogRepo::insert(pool, entry).await.map(|_| ());
        self.settle(entry, result)
    }

    fn settle(&self, entry: &CreateAuditLog, result: Result<(), sqlx::Error>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                let total = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::error!(
                    error = %e,
                    action = %entry.action,
                    target = %entry.target,
                    audit_write_failures = total,
                    "Audit write failed"
                );
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// One window of the audit sequence plus the total number of entries.
#[derive(Debug)]
pub struct AuditPage {
    pub entries: Vec<AuditLog>,
    pub total: i64,
}

/// Fetch `window`, then keep only the entries matching `filter`.
pub async fn query(pool: &DbPool, window: &AuditWindow, filter: &AuditFilter) -> AppResult<AuditPage> {
    let entries = AuditLogRepo::query_window(pool, window).await?;
    let total = AuditLogRepo::count(pool).await?;
    Ok(AuditPage {
        entries: filter.apply(entries),
        total,
    })
}

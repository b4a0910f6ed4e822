//! Repository for the `config_applications` table.

use pxe_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

use crate::models::config_application::ConfigApplication;
use crate::DbPool;

const COLUMNS: &str = "id, template_id, serial, artifact_path, applied_at";

pub struct ConfigApplicationRepo;

impl ConfigApplicationRepo {
    /// Record one application of a template to a server.
    ///
    /// Bindings are never deduplicated; every call appends a row.
    pub async fn insert<'e, E>(
        executor: E,
        template_id: DbId,
        serial: &str,
        artifact_path: Option<&str>,
        now: Timestamp,
    ) -> Result<ConfigApplication, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO config_applications (template_id, serial, artifact_path, applied_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConfigApplication>(&query)
            .bind(template_id)
            .bind(serial)
            .bind(artifact_path)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Bindings recorded for a server, newest first.
    pub async fn list_for_serial(
        pool: &DbPool,
        serial: &str,
    ) -> Result<Vec<ConfigApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM config_applications WHERE serial = ? ORDER BY id DESC"
        );
        sqlx::query_as::<_, ConfigApplication>(&query)
            .bind(serial)
            .fetch_all(pool)
            .await
    }
}

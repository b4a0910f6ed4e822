//! Repository for the `config_templates` table.

use pxe_core::template::STATUS_ACTIVE;
use pxe_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

use crate::models::config_template::{ConfigTemplate, TemplateInput};
use crate::DbPool;

/// Column list for `config_templates` SELECT queries.
const COLUMNS: &str = "\
    id, name, description, system_type, system_version, config_content, \
    kernel_params, packages, status, created_at, updated_at";

/// Provides CRUD operations for configuration templates. There is no delete.
pub struct ConfigTemplateRepo;

impl ConfigTemplateRepo {
    /// List every template by ascending id.
    pub async fn list(pool: &DbPool) -> Result<Vec<ConfigTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM config_templates ORDER BY id ASC");
        sqlx::query_as::<_, ConfigTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a template by its id.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<ConfigTemplate>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM config_templates WHERE id = ?");
        sqlx::query_as::<_, ConfigTemplate>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Insert a new active template, returning the created row.
    pub async fn create<'e, E>(
        executor: E,
        input: &TemplateInput,
        now: Timestamp,
    ) -> Result<ConfigTemplate, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO config_templates \
                (name, description, system_type, system_version, config_content, \
                 kernel_params, packages, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConfigTemplate>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.system_type)
            .bind(&input.system_version)
            .bind(&input.config_content)
            .bind(&input.kernel_params)
            .bind(&input.packages)
            .bind(STATUS_ACTIVE)
            .bind(now)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Overwrite every mutable field of a template.
    ///
    /// Returns `None` if no template with the given id exists.
    pub async fn replace<'e, E>(
        executor: E,
        id: DbId,
        input: &TemplateInput,
        now: Timestamp,
    ) -> Result<Option<ConfigTemplate>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "UPDATE config_templates SET \
                name = ?, description = ?, system_type = ?, system_version = ?, \
                config_content = ?, kernel_params = ?, packages = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConfigTemplate>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.system_type)
            .bind(&input.system_version)
            .bind(&input.config_content)
            .bind(&input.kernel_params)
            .bind(&input.packages)
            .bind(now)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

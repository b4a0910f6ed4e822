//! Configuration template validation (OS install templates).
//!
//! A template is a named bundle of installer inputs. `name` and
//! `system_type` are mandatory; an empty `system_version` is accepted but
//! flagged so operators notice it before the template reaches a server.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Status assigned to every template created through the API.
pub const STATUS_ACTIVE: &str = "active";

/// Maximum length for a template name, in bytes. All limits here are byte counts.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for a system type or version identifier.
pub const MAX_SYSTEM_FIELD_LEN: usize = 100;

/// Maximum length for a description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Maximum size of the opaque text blobs (config body, kernel params, packages).
pub const MAX_BLOB_LEN: usize = 1024 * 1024;

/// Soft-validation flag raised when `system_version` is empty.
pub const WARN_EMPTY_SYSTEM_VERSION: &str = "systemVersion is empty";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Borrowed view of the mutable template fields, shared by create and update.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFields<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub system_type: &'a str,
    pub system_version: &'a str,
    pub config_content: &'a str,
    pub kernel_params: &'a str,
    pub packages: &'a str,
}

fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_max_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.len() > max {
        return Err(CoreError::Validation(format!(
            "{field} too long: {} bytes (max {max})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate template fields, returning soft warnings on success.
///
/// Hard failures are [`CoreError::Validation`]. The returned warnings do not
/// block the write.
pub fn validate_fields(fields: &TemplateFields<'_>) -> Result<Vec<String>, CoreError> {
    require_non_empty("name", fields.name)?;
    require_max_len("name", fields.name, MAX_NAME_LEN)?;
    require_non_empty("systemType", fields.system_type)?;
    require_max_len("systemType", fields.system_type, MAX_SYSTEM_FIELD_LEN)?;
    require_max_len("systemVersion", fields.system_version, MAX_SYSTEM_FIELD_LEN)?;
    require_max_len("description", fields.description, MAX_DESCRIPTION_LEN)?;
    require_max_len("configContent", fields.config_content, MAX_BLOB_LEN)?;
    require_max_len("kernelParams", fields.kernel_params, MAX_BLOB_LEN)?;
    require_max_len("packages", fields.packages, MAX_BLOB_LEN)?;

    let mut warnings = Vec::new();
    if fields.system_version.trim().is_empty() {
        warnings.push(WARN_EMPTY_SYSTEM_VERSION.to_string());
    }
    Ok(warnings)
}

/// Parse a template id from a path segment.
///
/// Ids are opaque to clients, so anything that is not a positive integer is
/// reported as an unknown template rather than a malformed request.
pub fn parse_template_id(raw: &str) -> Result<i64, CoreError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CoreError::not_found("config template", raw))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

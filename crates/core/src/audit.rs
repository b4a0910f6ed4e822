//! Audit log constants, window validation and the entry filter predicate.
//!
//! This module lives in `core` so the repository layer, the HTTP layer and
//! tests agree on action names and paging bounds.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Action names
// ---------------------------------------------------------------------------

/// Semantic operation names recorded in the `action` column.
pub mod actions {
    pub const SERVER_REPORT: &str = "server.report";
    pub const SERVER_LIST: &str = "server.list";
    pub const SERVER_GET: &str = "server.get";
    pub const SERVER_CONFIRM: &str = "server.confirm";
    pub const SERVER_INSTALL: &str = "server.install";
    pub const CONFIG_CREATE: &str = "config.create";
    pub const CONFIG_UPDATE: &str = "config.update";
    pub const CONFIG_APPLY: &str = "config.apply";
    pub const AUTH_REJECT: &str = "auth.reject";
}

/// Outcome values recorded in the `status` column.
pub mod outcomes {
    pub const SUCCESS: &str = "success";
    pub const FAILURE: &str = "failure";
}

// ---------------------------------------------------------------------------
// Query window
// ---------------------------------------------------------------------------

/// Page size used when the caller does not pass `limit`.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page a single query may return.
pub const MAX_LIMIT: i64 = 1000;

/// Retrieval order over the audit sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuditOrder {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl AuditOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse `asc`/`desc` (case-insensitive). Absent means [`AuditOrder::Desc`].
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") => Ok(Self::default()),
            Some("asc") => Ok(Self::Asc),
            Some("desc") => Ok(Self::Desc),
            Some(other) => Err(CoreError::Validation(format!(
                "Invalid order '{other}'. Must be one of: asc, desc"
            ))),
        }
    }
}

/// A validated contiguous slice of the audit sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditWindow {
    pub offset: i64,
    pub limit: i64,
    pub order: AuditOrder,
}

impl AuditWindow {
    /// Validate raw paging parameters, filling in defaults.
    ///
    /// `offset < 0`, `limit <= 0` and `limit > MAX_LIMIT` are rejected rather
    /// than clamped so clients learn about their mistake.
    pub fn new(
        offset: Option<i64>,
        limit: Option<i64>,
        order: Option<&str>,
    ) -> Result<Self, CoreError> {
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(CoreError::Validation(format!(
                "offset must be >= 0, got {offset}"
            )));
        }

        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit <= 0 {
            return Err(CoreError::Validation(format!(
                "limit must be > 0, got {limit}"
            )));
        }
        if limit > MAX_LIMIT {
            return Err(CoreError::Validation(format!(
                "limit must be <= {MAX_LIMIT}, got {limit}"
            )));
        }

        Ok(Self {
            offset,
            limit,
            order: AuditOrder::parse(order)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Filter predicate
// ---------------------------------------------------------------------------

/// Read access to the filterable columns of an audit entry.
pub trait AuditFields {
    fn method(&self) -> &str;
    fn path(&self) -> &str;
    fn action(&self) -> &str;
    fn status(&self) -> &str;
}

/// Stateless predicate over audit entries.
///
/// - `method`: exact match, case-insensitive.
/// - `status`: exact match.
/// - `path`, `action`: substring match.
///
/// Empty criteria are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub method: Option<String>,
    pub path: Option<String>,
    pub action: Option<String>,
    pub status: Option<String>,
}

fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AuditFilter {
    pub fn is_empty(&self) -> bool {
        criterion(&self.method).is_none()
            && criterion(&self.path).is_none()
            && criterion(&self.action).is_none()
            && criterion(&self.status).is_none()
    }

    pub fn matches<E: AuditFields + ?Sized>(&self, entry: &E) -> bool {
        if let Some(m) = criterion(&self.method) {
            if !entry.method().eq_ignore_ascii_case(m) {
                return false;
            }
        }
        if let Some(s) = criterion(&self.status) {
            if entry.status() != s {
                return false;
            }
        }
        if let Some(p) = criterion(&self.path) {
            if !entry.path().contains(p) {
                return false;
            }
        }
        if let Some(a) = criterion(&self.action) {
            if !entry.action().contains(a) {
                return false;
            }
        }
        true
    }

    /// Keep only the entries of `window` that match, preserving order.
    pub fn apply<E: AuditFields>(&self, window: Vec<E>) -> Vec<E> {
        if self.is_empty() {
            return window;
        }
        window.into_iter().filter(|e| self.matches(e)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

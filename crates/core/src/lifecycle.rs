//! Server registration lifecycle.
//!
//! A discovered server moves strictly forward through
//! `pending -> confirmed -> installed`. Nothing in the public API moves a
//! server backwards, and `installed` is terminal. Whether `install` may skip
//! `confirmed` is a deployment policy ([`LifecyclePolicy`]).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Provisioning status of a server record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Pending,
    Confirmed,
    Installed,
}

impl ServerStatus {
    /// Status a freshly discovered server starts in.
    pub const INITIAL: Self = Self::Pending;

    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Installed => "installed",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "installed" => Some(Self::Installed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Actions and policy
// ---------------------------------------------------------------------------

/// Operator-initiated lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Confirm,
    Install,
}

impl LifecycleAction {
    /// Status the action moves a server into.
    pub fn target(&self) -> ServerStatus {
        match self {
            Self::Confirm => ServerStatus::Confirmed,
            Self::Install => ServerStatus::Installed,
        }
    }

    /// Verb used in operator-facing messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Install => "install",
        }
    }
}

/// Deployment-level lifecycle rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Permit `pending -> installed` without a prior confirm.
    pub allow_direct_install: bool,
}

/// Statuses from which `action` advances, most specific first.
///
/// The service layer tries these in order as conditional updates, so the
/// first one that matches the stored row wins.
pub fn advance_sources(action: LifecycleAction, policy: LifecyclePolicy) -> &'static [ServerStatus] {
    match action {
        LifecycleAction::Confirm => &[ServerStatus::Pending],
        LifecycleAction::Install if policy.allow_direct_install => {
            &[ServerStatus::Confirmed, ServerStatus::Pending]
        }
        LifecycleAction::Install => &[ServerStatus::Confirmed],
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Result of applying a lifecycle action to a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The server moved forward.
    Advanced { from: ServerStatus, to: ServerStatus },
    /// The server already was in the target status; nothing changed.
    Unchanged { status: ServerStatus },
}

impl TransitionOutcome {
    pub fn transitioned(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }

    /// Status of the server after the action.
    pub fn status(&self) -> ServerStatus {
        match self {
            Self::Advanced { to, .. } => *to,
            Self::Unchanged { status } => *status,
        }
    }
}

/// Decide what `action` does to a server currently in `current`.
///
/// Repeating an action whose target is already reached is an idempotent
/// success. Moving backwards, or skipping `confirmed` under the strict
/// policy, is a [`CoreError::Conflict`].
pub fn plan(
    action: LifecycleAction,
    current: ServerStatus,
    policy: LifecyclePolicy,
) -> Result<TransitionOutcome, CoreError> {
    let target = action.target();

    if current == target {
        return Ok(TransitionOutcome::Unchanged { status: current });
    }

    if advance_sources(action, policy).contains(&current) {
        return Ok(TransitionOutcome::Advanced {
            from: current,
            to: target,
        });
    }

    if current > target {
        Err(CoreError::Conflict(format!(
            "Cannot {} a server that is already {current}",
            action.verb()
        )))
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot {} a server that is {current}; it must be {} first",
            action.verb(),
            ServerStatus::Confirmed
        )))
    }
}

/// Parse a `?status=` list filter.
///
/// Absent means the default `pending`. Unknown values are not an error; they
/// simply match nothing, so `None` is returned.
pub fn parse_status_filter(raw: Option<&str>) -> Option<ServerStatus> {
    match raw.map(str::trim) {
        None | Some("") => Some(ServerStatus::INITIAL),
        Some(s) => ServerStatus::from_str(&s.to_ascii_lowercase()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

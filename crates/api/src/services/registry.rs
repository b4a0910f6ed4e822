//! Server Registry: enrollment reports, listing and lifecycle transitions.

use chrono::Utc;
use pxe_core::audit::{actions, outcomes};
use pxe_core::error::CoreError;
use pxe_core::lifecycle::{
    advance_sources, parse_status_filter, plan, LifecycleAction, ServerStatus, TransitionOutcome,
};
use pxe_db::models::config_application::ConfigApplication;
use pxe_db::models::server::{Server, ServerReport};
use pxe_db::repositories::{ConfigApplicationRepo, ServerRepo};
use pxe_db::DbPool;
use serde_json::json;

use crate::error::AppResult;
use crate::extract::RequestMeta;
use crate::state::AppState;

/// What an enrollment report did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// First report for this serial; the server is now `pending`.
    Registered,
    /// Known serial; inventory refreshed, status untouched.
    Refreshed,
    /// `(serial, requestId)` was seen before; nothing changed.
    Duplicate,
}

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Apply an inventory report from the installer agent.
pub async fn report(state: &AppState, meta: &RequestMeta, report: &ServerReport) -> AppResult<ReportOutcome> {
    require("requestId", &report.request_id)?;
    require("serial", &report.serial)?;
    require("macAddress", &report.mac_address)?;

    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    if !ServerRepo::mark_report_processed(&mut *tx, &report.serial, &report.request_id, now).await? {
        tracing::debug!(serial = %report.serial, request_id = %report.request_id, "Duplicate report ignored");
        return Ok(ReportOutcome::Duplicate);
    }

    let known = ServerRepo::find_status(&mut *tx, &report.serial).await?.is_some();
    let server = ServerRepo::upsert_inventory(&mut *tx, report, now).await?;

    let mut entry = meta.audit_entry(actions::SERVER_REPORT, &server.serial, outcomes::SUCCESS);
    entry.metadata = Some(json!({
        "requestId": report.request_id,
        "created": !known,
        "status": server.status,
    }));
    state.audit.record_in(&mut *tx, &entry).await;

    tx.commit().await?;

    let outcome = if known {
        ReportOutcome::Refreshed
    } else {
        ReportOutcome::Registered
    };
    tracing::info!(serial = %server.serial, ?outcome, "Server report applied");
    Ok(outcome)
}

/// List servers in the requested status (default `pending`).
///
/// An unknown status matches nothing rather than failing. Each call is
/// audited as `server.list` with the raw filter as target.
pub async fn list(state: &AppState, meta: &RequestMeta, status: Option<&str>) -> AppResult<Vec<Server>> {
    let servers = match parse_status_filter(status) {
        Some(status) => ServerRepo::list_by_status(&state.pool, status.as_str()).await?,
        None => Vec::new(),
    };

    let target = status.unwrap_or(ServerStatus::INITIAL.as_str());
    let mut entry = meta.audit_entry(actions::SERVER_LIST, target, outcomes::SUCCESS);
    entry.metadata = Some(json!({ "count": servers.len() }));
    state.audit.record(&state.pool, &entry).await;

    Ok(servers)
}

/// Fetch one server, auditing the read as `server.get`.
pub async fn get(state: &AppState, meta: &RequestMeta, serial: &str) -> AppResult<Server> {
    let server = find(&state.pool, serial).await?;
    state
        .audit
        .record(
            &state.pool,
            &meta.audit_entry(actions::SERVER_GET, serial, outcomes::SUCCESS),
        )
        .await;
    Ok(server)
}

async fn find(pool: &DbPool, serial: &str) -> AppResult<Server> {
    let server = ServerRepo::find_by_serial(pool, serial)
        .await?
        .ok_or_else(|| CoreError::not_found("server", serial))?;
    Ok(server)
}

/// Template bindings recorded for a server, newest first.
pub async fn applications(pool: &DbPool, serial: &str) -> AppResult<Vec<ConfigApplication>> {
    find(pool, serial).await?;
    Ok(ConfigApplicationRepo::list_for_serial(pool, serial).await?)
}

/// Run a confirm or install on `serial`.
///
/// Candidate source statuses are tried as conditional updates, so two
/// concurrent callers can never both advance the same server: the loser
/// finds nothing to update and falls through to [`plan`], which reports the
/// status the winner left behind.
pub async fn transition(
    state: &AppState,
    meta: &RequestMeta,
    serial: &str,
    action: LifecycleAction,
) -> AppResult<TransitionOutcome> {
    let policy = state.config.lifecycle_policy();
    let target = action.target();
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let mut advanced = None;
    for from in advance_sources(action, policy) {
        if ServerRepo::advance_status(&mut *tx, serial, from.as_str(), target.as_str(), now).await? {
            advanced = Some(TransitionOutcome::Advanced { from: *from, to: target });
            break;
        }
    }

    let outcome = match advanced {
        Some(outcome) => outcome,
        None => {
            let stored = ServerRepo::find_status(&mut *tx, serial)
                .await?
                .ok_or_else(|| CoreError::not_found("server", serial))?;
            let current = ServerStatus::from_str(&stored).ok_or_else(|| {
                CoreError::Internal(format!("Server {serial} has unknown status '{stored}'"))
            })?;
            plan(action, current, policy)?
        }
    };

    let from = match outcome {
        TransitionOutcome::Advanced { from, .. } => from,
        TransitionOutcome::Unchanged { status } => status,
    };
    let audit_action = match action {
        LifecycleAction::Confirm => actions::SERVER_CONFIRM,
        LifecycleAction::Install => actions::SERVER_INSTALL,
    };
    let mut entry = meta.audit_entry(audit_action, serial, outcomes::SUCCESS);
    entry.metadata = Some(json!({
        "from": from.as_str(),
        "to": outcome.status().as_str(),
        "transitioned": outcome.transitioned(),
    }));
    state.audit.record_in(&mut *tx, &entry).await;

    tx.commit().await?;

    tracing::info!(
        serial = %serial,
        action = action.verb(),
        status = %outcome.status(),
        transitioned = outcome.transitioned(),
        "Server lifecycle action applied"
    );
    Ok(outcome)
}

//! Access Gate: static bearer-token authentication for the `/api` routes.
//!
//! Tokens come from `PXE_AUTH_TOKEN` and are compared by SHA-256 digest. The
//! admitted caller is identified in audit entries only by a short
//! fingerprint of the token, never the token itself.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use pxe_core::audit::{actions, outcomes};
use pxe_core::error::CoreError;
use pxe_core::hashing::{digest_eq, token_fingerprint};

use crate::error::AppError;
use crate::extract::RequestMeta;
use crate::state::AppState;

/// Authenticated caller, inserted into request extensions by [`require_bearer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Audit identity, `token:<fingerprint>`.
    pub actor: String,
}

/// Validate the `Authorization: Bearer <token>` header against `accepted`.
pub fn authenticate(headers: &HeaderMap, accepted: &[String]) -> Result<Operator, CoreError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            )
        })?;

    if !accepted.iter().any(|candidate| digest_eq(token, candidate)) {
        return Err(CoreError::Unauthorized("Invalid bearer token".into()));
    }

    Ok(Operator {
        actor: format!("token:{}", token_fingerprint(token)),
    })
}

/// Middleware guarding every protected route.
///
/// A rejected request gets a 401 and one `auth.reject` audit entry.
pub async fn require_bearer(
    State(state): State<AppState>,
    meta: RequestMeta,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match authenticate(req.headers(), &state.config.auth_tokens) {
        Ok(operator) => {
            req.extensions_mut().insert(operator);
            Ok(next.run(req).await)
        }
        Err(err) => {
            tracing::warn!(
                path = %meta.path,
                client_ip = %meta.client_ip,
                error = %err,
                "Rejected unauthenticated request"
            );
            let mut entry = meta.audit_entry(actions::AUTH_REJECT, &meta.path, outcomes::FAILURE);
            if let CoreError::Unauthorized(msg) = &err {
                entry.error = Some(msg.clone());
            }
            state.audit.record(&state.pool, &entry).await;
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    fn accepted() -> Vec<String> {
        vec!["alpha".to_string(), "beta".to_string()]
    }

    #[test]
    fn any_configured_token_is_accepted() {
        let op = authenticate(&headers("Bearer beta"), &accepted()).unwrap();
        assert_eq!(op.actor, format!("token:{}", token_fingerprint("beta")));
    }

    #[test]
    fn missing_header_rejected() {
        let err = authenticate(&HeaderMap::new(), &accepted()).unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(msg) if msg.contains("Missing"));
    }

    #[test]
    fn wrong_scheme_rejected() {
        let err = authenticate(&headers("Basic YWxwaGE="), &accepted()).unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(msg) if msg.contains("format"));
    }

    #[test]
    fn unknown_token_rejected() {
        let err = authenticate(&headers("Bearer gamma"), &accepted()).unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(msg) if msg.contains("Invalid bearer"));
    }

    #[test]
    fn no_configured_tokens_rejects_everything() {
        assert!(authenticate(&headers("Bearer alpha"), &[]).is_err());
    }
}

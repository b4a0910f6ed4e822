//! Request extractors shared by handlers and middleware.
//!
//! [`ApiJson`] and [`ApiQuery`] replace axum's plain-text rejections with the
//! JSON `VALIDATION_ERROR` body. [`RequestMeta`] captures who called what, for
//! audit entries.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{
    ConnectInfo, FromRef, FromRequest, FromRequestParts, OriginalUri, Query, Request,
};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};
use axum::Json;
use ipnetwork::IpNetwork;
use pxe_core::error::CoreError;
use pxe_db::models::audit::CreateAuditLog;

use crate::error::AppError;
use crate::middleware::auth::Operator;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Body and query extractors
// ---------------------------------------------------------------------------

/// JSON body extractor whose rejection is a 422 `VALIDATION_ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Core(CoreError::Validation(
                rejection.body_text(),
            ))),
        }
    }
}

/// Query string extractor whose rejection is a 422 `VALIDATION_ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Core(CoreError::Validation(
                rejection.body_text(),
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request metadata
// ---------------------------------------------------------------------------

/// Caller and request details recorded with every audit entry.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: String,
    /// Full request path, including the `/api` prefix.
    pub path: String,
    pub client_ip: String,
    pub user_agent: String,
    /// `token:<fingerprint>` once the Access Gate has admitted the request.
    pub actor: Option<String>,
}

impl RequestMeta {
    /// Start an audit entry for this request.
    pub fn audit_entry(&self, action: &str, target: &str, status: &str) -> CreateAuditLog {
        CreateAuditLog {
            client_ip: self.client_ip.clone(),
            user_agent: self.user_agent.clone(),
            method: self.method.clone(),
            path: self.path.clone(),
            action: action.to_string(),
            target: target.to_string(),
            status: status.to_string(),
            error: None,
            actor: self.actor.clone(),
            metadata: None,
        }
    }
}

impl<S> FromRequestParts<S> for RequestMeta
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            method: parts.method.to_string(),
            path,
            client_ip: client_ip(&parts.headers, &parts.extensions, &app.config.trusted_proxies),
            user_agent,
            actor: parts
                .extensions
                .get::<Operator>()
                .map(|op| op.actor.clone()),
        })
    }
}

/// Client address used for rate limiting and audit entries.
///
/// The socket peer, unless the peer is one of `trusted` proxies, in which
/// case the first `X-Forwarded-For` hop. `unknown` when there is no peer.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trusted: &[IpNetwork]) -> String {
    let Some(peer) = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
    else {
        return "unknown".to_string();
    };

    if is_trusted(peer, trusted) {
        if let Some(forwarded) = first_forwarded_hop(headers) {
            return forwarded;
        }
    }
    peer.to_string()
}

fn is_trusted(peer: IpAddr, trusted: &[IpNetwork]) -> bool {
    let peer = match peer {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(peer),
        v4 => v4,
    };
    trusted.iter().any(|net| net.contains(peer))
}

fn first_forwarded_hop(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    fn from_peer(ip: [u8; 4]) -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from((ip, 4000))));
        extensions
    }

    fn proxies() -> Vec<IpNetwork> {
        vec!["10.0.0.0/8".parse().unwrap()]
    }

    #[test]
    fn trusted_proxy_forwards_first_hop() {
        let ip = client_ip(
            &forwarded("203.0.113.7, 10.0.0.2"),
            &from_peer([10, 0, 0, 2]),
            &proxies(),
        );
        assert_eq!(ip, "203.0.113.7");
    }

    #[test]
    fn untrusted_peer_cannot_claim_another_address() {
        let ip = client_ip(&forwarded("203.0.113.7"), &from_peer([192, 168, 1, 5]), &proxies());
        assert_eq!(ip, "192.168.1.5");

        let ip = client_ip(&forwarded("203.0.113.7"), &from_peer([192, 168, 1, 5]), &[]);
        assert_eq!(ip, "192.168.1.5");
    }

    #[test]
    fn trusted_proxy_without_header_is_the_client() {
        assert_eq!(
            client_ip(&HeaderMap::new(), &from_peer([10, 1, 1, 1]), &proxies()),
            "10.1.1.1"
        );
    }

    #[test]
    fn no_peer_is_unknown_even_with_header() {
        assert_eq!(
            client_ip(&forwarded("203.0.113.7"), &Extensions::new(), &proxies()),
            "unknown"
        );
    }
}

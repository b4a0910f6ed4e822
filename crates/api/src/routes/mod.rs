pub mod audit;
pub mod configs;
pub mod health;
pub mod servers;

use axum::routing::post;
use axum::{middleware, Router};

use crate::handlers;
use crate::middleware::{auth, rate_limit};
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                   liveness (public)
///
/// /report                                   installer inventory report (POST)
///
/// /servers                                  list by ?status= (default pending)
/// /servers/{serial}                         get
/// /servers/{serial}/confirm                 confirm (POST)
/// /servers/{serial}/install                 mark installed (POST)
/// /servers/{serial}/applications            binding history
///
/// /configs                                  list, create
/// /configs/{id}                             get, replace (PUT)
/// /configs/{id}/apply?serial=               apply to server (POST)
///
/// /audit/logs?offset=&limit=&order=         windowed audit query
/// ```
///
/// Everything except `/health` passes the rate limiter and then the Access
/// Gate. Both are route layers, so unknown paths still 404.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/report", post(handlers::report::submit_report))
        .nest("/servers", servers::router())
        .nest("/configs", configs::router())
        .nest("/audit", audit::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::enforce))
        .merge(health::router())
}

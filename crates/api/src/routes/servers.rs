//! Route definitions for the Server Registry.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::servers;
use crate::state::AppState;

/// Routes mounted at `/servers`.
///
/// ```text
/// GET  /                          -> list_servers
/// GET  /{serial}                  -> get_server
/// POST /{serial}/confirm          -> confirm_server
/// POST /{serial}/install          -> install_server
/// GET  /{serial}/applications     -> list_applications
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(servers::list_servers))
        .route("/{serial}", get(servers::get_server))
        .route("/{serial}/confirm", post(servers::confirm_server))
        .route("/{serial}/install", post(servers::install_server))
        .route("/{serial}/applications", get(servers::list_applications))
}

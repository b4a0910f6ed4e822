//! Route definitions for configuration templates.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::configs;
use crate::state::AppState;

/// Routes mounted at `/configs`.
///
/// ```text
/// GET  /               -> list_configs
/// POST /               -> create_config
/// GET  /{id}           -> get_config
/// PUT  /{id}           -> update_config
/// POST /{id}/apply     -> apply_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(configs::list_configs).post(configs::create_config))
        .route("/{id}", get(configs::get_config).put(configs::update_config))
        .route("/{id}/apply", post(configs::apply_config))
}

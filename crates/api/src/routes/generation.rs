//! Route definitions for generation jobs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Read-only generation routes, mounted at `/api/v1`.
///
/// ```text
/// GET    /generation/defaults       -> defaults
/// GET    /generation/status         -> status
/// GET    /generation/artifact       -> artifact
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generation/defaults", get(generation::defaults))
        .route("/generation/status", get(generation::status))
        .route("/generation/artifact", get(generation::artifact))
}

/// Job launch route, mounted at `/api/v1`.
///
/// A job can run for many minutes, so this route is kept out of the
/// request timeout layer.
///
/// ```text
/// POST   /generation                -> launch
/// ```
pub fn launch_router() -> Router<AppState> {
    Router::new().route("/generation", post(generation::launch))
}

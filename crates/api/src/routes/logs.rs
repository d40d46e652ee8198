//! Route definitions for log viewing.

use axum::routing::get;
use axum::Router;

use crate::handlers::logs;
use crate::state::AppState;

/// Routes mounted at `/api/v1/logs`.
///
/// ```text
/// GET    /generation?lines=N        -> generation_log
/// GET    /telemetry                 -> telemetry_log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generation", get(logs::generation_log))
        .route("/telemetry", get(logs::telemetry_log))
}

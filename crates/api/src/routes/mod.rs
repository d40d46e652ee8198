pub mod generation;
pub mod health;
pub mod logs;
pub mod selection;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree served under the request timeout.
///
/// Route hierarchy:
///
/// ```text
/// /catalog                                         catalog with selection flags
/// /selection                                       current selection
/// /selection/toggle                                toggle by reference (POST)
/// /selection/remove                                remove by position (POST)
/// /selection/uploads                               upload references (multipart POST)
///
/// /generation/defaults                             default form values
/// /generation/status                               running flag and last result
/// /generation/artifact                             last generated video
///
/// /logs/generation                                 generation log tail (?lines=N)
/// /logs/telemetry                                  latest GPU telemetry
/// ```
///
/// `POST /generation` is built separately by [`generation::launch_router`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(selection::router())
        .merge(generation::router())
        .nest("/logs", logs::router())
}

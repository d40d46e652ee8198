//! Route definitions for the catalog and reference selection.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::selection;
use crate::state::AppState;

/// Largest accepted upload request body.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Routes mounted at the `/api/v1` root.
///
/// ```text
/// GET    /catalog                   -> list_catalog
/// GET    /selection                 -> get_selection
/// POST   /selection/toggle          -> toggle
/// POST   /selection/remove          -> remove
/// POST   /selection/uploads         -> upload (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(selection::list_catalog))
        .route("/selection", get(selection::get_selection))
        .route("/selection/toggle", post(selection::toggle))
        .route("/selection/remove", post(selection::remove))
        .route(
            "/selection/uploads",
            post(selection::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

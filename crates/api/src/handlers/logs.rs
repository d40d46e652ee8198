//! Read-only views over the generation and telemetry logs.

use std::path::Path;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use phantom_core::logs::{self, DEFAULT_TAIL_LINES};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on `?lines=` to keep responses small.
const MAX_TAIL_LINES: usize = 5_000;

#[derive(Debug, Deserialize)]
pub struct TailParams {
    pub lines: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogContent {
    pub path: String,
    pub content: String,
}

async fn read_log(path: &Path, max_lines: usize) -> AppResult<LogContent> {
    let content = logs::read_tail(path, max_lines)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read {}: {e}", path.display())))?;
    Ok(LogContent {
        path: path.display().to_string(),
        content,
    })
}

/// GET /api/v1/logs/generation?lines=N
pub async fn generation_log(
    State(state): State<AppState>,
    Query(params): Query<TailParams>,
) -> AppResult<Json<DataResponse<LogContent>>> {
    let lines = params
        .lines
        .unwrap_or(DEFAULT_TAIL_LINES)
        .min(MAX_TAIL_LINES);
    let log = read_log(state.session.runner.log_path(), lines).await?;
    Ok(Json(DataResponse { data: log }))
}

/// GET /api/v1/logs/telemetry
///
/// The telemetry log holds only the latest snapshot plus any timeout
/// notices, so it is returned in full.
pub async fn telemetry_log(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<LogContent>>> {
    let log = read_log(&state.session.telemetry_log, usize::MAX).await?;
    Ok(Json(DataResponse { data: log }))
}

//! Handlers for launching generation jobs and inspecting their outcome.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use phantom_core::error::CoreError;
use phantom_core::generation::{GenerationSettings, JobParameters, JobResult};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Whether a job is in flight, and how the last one ended.
#[derive(Debug, Serialize)]
pub struct GenerationStatus {
    pub running: bool,
    pub last_result: Option<JobResult>,
}

/// GET /api/v1/generation/defaults
pub async fn defaults() -> Json<DataResponse<GenerationSettings>> {
    Json(DataResponse {
        data: GenerationSettings::default(),
    })
}

/// POST /api/v1/generation
///
/// Validates the form against the current selection, then runs the job to
/// completion and returns its result. The job runs in its own task so a
/// dropped connection does not abort the child or free the slot early.
pub async fn launch(
    State(state): State<AppState>,
    Json(settings): Json<GenerationSettings>,
) -> AppResult<Json<DataResponse<JobResult>>> {
    let session = state.session.clone();

    let references = session.selection.lock().await.snapshot();
    let params = JobParameters::new(settings, references);
    let cmd = session.builder.build(&params)?;

    let permit = session.slot.try_acquire()?;
    tracing::info!(references = params.references.len(), "Generation job accepted");

    let job = tokio::spawn(async move {
        let result = session.runner.run(&cmd).await;
        *session.last_result.lock().await = Some(result.clone());
        drop(permit);
        result
    });

    let result = job
        .await
        .map_err(|e| AppError::InternalError(format!("Generation task failed: {e}")))?;

    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/generation/status
pub async fn status(State(state): State<AppState>) -> Json<DataResponse<GenerationStatus>> {
    let session = &state.session;
    let last_result = session.last_result.lock().await.clone();
    Json(DataResponse {
        data: GenerationStatus {
            running: session.slot.is_busy(),
            last_result,
        },
    })
}

/// GET /api/v1/generation/artifact
///
/// Streams the video produced by the last successful job.
pub async fn artifact(State(state): State<AppState>, request: Request) -> AppResult<Response> {
    let path = state
        .session
        .last_result
        .lock()
        .await
        .as_ref()
        .and_then(|r| r.artifact_path.clone())
        .ok_or_else(|| CoreError::NotFound("No generated video available".to_string()))?;

    let response = ServeFile::new(&path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    Ok(response.map(Body::new))
}

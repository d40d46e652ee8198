//! Handlers for the catalog and the reference-image selection.
//!
//! Every mutation answers with a [`SelectionView`] so the client can
//! re-render the selection list and the catalog highlights from one
//! consistent snapshot.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use phantom_core::catalog::Catalog;
use phantom_core::error::CoreError;
use phantom_core::selection::SelectionStore;
use phantom_core::types::ImageReference;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// One catalog image and whether it is currently selected.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub reference: ImageReference,
    pub selected: bool,
}

/// Selection list plus the catalog with selection flags.
#[derive(Debug, Serialize)]
pub struct SelectionView {
    pub selected: Vec<ImageReference>,
    pub catalog: Vec<CatalogEntry>,
}

impl SelectionView {
    fn render(catalog: &Catalog, store: &SelectionStore) -> Self {
        Self {
            selected: store.snapshot(),
            catalog: catalog_entries(catalog, store),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub reference: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub position: usize,
}

fn catalog_entries(catalog: &Catalog, store: &SelectionStore) -> Vec<CatalogEntry> {
    catalog
        .images()
        .iter()
        .map(|reference| CatalogEntry {
            reference: reference.clone(),
            selected: store.contains(reference),
        })
        .collect()
}

/// GET /api/v1/catalog
pub async fn list_catalog(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CatalogEntry>>>> {
    let store = state.session.selection.lock().await;
    let entries = catalog_entries(&state.session.catalog, &store);
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/selection
pub async fn get_selection(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SelectionView>>> {
    let store = state.session.selection.lock().await;
    let view = SelectionView::render(&state.session.catalog, &store);
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/selection/toggle
///
/// Accepts references from the catalog or ones already selected (e.g. an
/// upload being deselected). Anything else is unknown.
pub async fn toggle(
    State(state): State<AppState>,
    Json(input): Json<ToggleRequest>,
) -> AppResult<Json<DataResponse<SelectionView>>> {
    let reference = ImageReference::new(input.reference)?;
    let session = &state.session;

    let mut store = session.selection.lock().await;
    if !session.catalog.contains(&reference) && !store.contains(&reference) {
        return Err(AppError::Core(CoreError::NotFound(format!(
            "Unknown reference image: {reference}"
        ))));
    }

    store.toggle(reference);
    tracing::debug!(selected = store.len(), "Selection toggled");
    Ok(Json(DataResponse {
        data: SelectionView::render(&session.catalog, &store),
    }))
}

/// POST /api/v1/selection/remove
///
/// A stale position is ignored and the unchanged view is returned.
pub async fn remove(
    State(state): State<AppState>,
    Json(input): Json<RemoveRequest>,
) -> AppResult<Json<DataResponse<SelectionView>>> {
    let mut store = state.session.selection.lock().await;
    store.remove_at(input.position);
    Ok(Json(DataResponse {
        data: SelectionView::render(&state.session.catalog, &store),
    }))
}

/// POST /api/v1/selection/uploads
///
/// Saves each uploaded file under the upload directory with a unique name
/// and appends the saved paths to the selection, skipping duplicates.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<SelectionView>>> {
    let session = &state.session;
    tokio::fs::create_dir_all(&session.upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

    let mut saved = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        // Non-file form fields are ignored.
        let Some(filename) = field.file_name().map(upload_basename) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let dest = session
            .upload_dir
            .join(format!("{}_{filename}", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&dest, &data)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        tracing::info!(path = %dest.display(), bytes = data.len(), "Reference image uploaded");
        saved.push(ImageReference::from_path(&dest)?);
    }

    if saved.is_empty() {
        return Err(AppError::BadRequest(
            "No files received in multipart upload".to_string(),
        ));
    }

    let mut store = session.selection.lock().await;
    store.add_unique(saved);
    Ok(Json(DataResponse {
        data: SelectionView::render(&session.catalog, &store),
    }))
}

/// Final path component of a client-supplied file name.
///
/// Clients may send relative paths; only the base name is kept so uploads
/// never escape the upload directory.
fn upload_basename(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    match name {
        "" | "." | ".." => "upload".to_string(),
        other => Path::new(other)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_basename_strips_directories() {
        assert_eq!(upload_basename("face.png"), "face.png");
        assert_eq!(upload_basename("a/b/face.png"), "face.png");
        assert_eq!(upload_basename("..\\..\\evil.png"), "evil.png");
        assert_eq!(upload_basename("../"), "upload");
        assert_eq!(upload_basename(".."), "upload");
    }
}

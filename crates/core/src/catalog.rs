//! Catalog of selectable reference images.
//!
//! The catalog is the full list of images the operator can pick from. It is
//! discovered once at startup by listing the PNG files in a directory.

use std::path::{Path, PathBuf};

use crate::types::ImageReference;

/// File extension of catalog images.
pub const CATALOG_EXTENSION: &str = "png";

/// Images selected when a session starts, relative to the catalog directory.
pub const DEFAULT_PRESELECTED: &[&str] = &["ref14.png", "ref15.png", "ref16.png"];

/// Sorted list of reference images available for selection.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    dir: PathBuf,
    images: Vec<ImageReference>,
}

impl Catalog {
    /// List `*.png` files directly inside `dir`, sorted by path.
    ///
    /// A missing or unreadable directory produces an empty catalog. A
    /// relative `dir` is made absolute against the current directory, so
    /// references stay valid for a child running elsewhere.
    pub fn scan(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let dir = std::path::absolute(&dir).unwrap_or(dir);
        let mut images: Vec<ImageReference> = match std::fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && has_catalog_extension(path))
                .filter_map(|path| ImageReference::from_path(&path).ok())
                .collect(),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Catalog directory unavailable");
                Vec::new()
            }
        };
        images.sort();

        tracing::info!(dir = %dir.display(), count = images.len(), "Catalog scanned");
        Self { dir, images }
    }

    pub fn images(&self) -> &[ImageReference] {
        &self.images
    }

    pub fn contains(&self, reference: &ImageReference) -> bool {
        self.images.contains(reference)
    }

    /// Resolve pre-selected file names against the catalog directory.
    ///
    /// Names are joined onto the directory verbatim; they need not exist.
    pub fn preselection<S: AsRef<str>>(&self, names: &[S]) -> Vec<ImageReference> {
        names
            .iter()
            .filter_map(|name| ImageReference::from_path(&self.dir.join(name.as_ref())).ok())
            .collect()
    }
}

fn has_catalog_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CATALOG_EXTENSION))
}

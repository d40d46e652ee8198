//! Output artifact discovery.
//!
//! The external generator does not report where it wrote its video, so
//! after a successful run the candidate output directories are searched
//! and the most recently modified video file is taken as the artifact.
//! The policy is approximate; it sits behind [`ArtifactResolver`] so a
//! stricter contract can replace it without touching the job runner.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Directories searched for output, relative to the job working directory.
pub const DEFAULT_CANDIDATE_DIRS: &[&str] = &[".", "outputs", "results", "generated"];

/// Recognised video file extensions (matched case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

/// Locates the artifact produced by a finished job.
pub trait ArtifactResolver: Send + Sync {
    /// Return the artifact path, or `None` when no output can be found.
    fn resolve(&self) -> Option<PathBuf>;
}

/// Picks the newest video file across a fixed list of directories.
#[derive(Debug, Clone)]
pub struct RecentVideoResolver {
    root: PathBuf,
    candidate_dirs: Vec<PathBuf>,
}

impl RecentVideoResolver {
    /// Search the default candidate directories under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_dirs(root, DEFAULT_CANDIDATE_DIRS.iter().map(PathBuf::from))
    }

    /// Search `dirs` (relative paths are resolved against `root`).
    pub fn with_dirs(root: impl Into<PathBuf>, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            root: root.into(),
            candidate_dirs: dirs.into_iter().collect(),
        }
    }

    /// All video files in the candidate directories, keyed by canonical
    /// path so a file reachable through two entries is counted once.
    fn collect_candidates(&self) -> HashMap<PathBuf, SystemTime> {
        let mut found = HashMap::new();

        for dir in &self.candidate_dirs {
            let dir = self.root.join(dir);
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };

            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if !is_video_file(&path) {
                    continue;
                }
                // Follows symlinks, so a linked output counts as its target.
                let Ok(metadata) = std::fs::metadata(&path) else {
                    continue;
                };
                if !metadata.is_file() {
                    continue;
                }
                let Ok(modified) = metadata.modified() else {
                    continue;
                };
                let key = path.canonicalize().unwrap_or(path);
                found.entry(key).or_insert(modified);
            }
        }

        found
    }
}

impl ArtifactResolver for RecentVideoResolver {
    fn resolve(&self) -> Option<PathBuf> {
        let candidates = self.collect_candidates();
        tracing::debug!(count = candidates.len(), "Artifact candidates collected");

        candidates
            .into_iter()
            .max_by_key(|(_, modified)| *modified)
            .map(|(path, _)| path)
    }
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::Duration;

    use super::*;

    fn touch(path: &Path, age_secs: u64) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        let file = File::create(path).expect("create");
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .expect("set mtime");
    }

    #[test]
    fn empty_directories_resolve_to_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("notes.txt"), b"x").expect("write");
        assert!(RecentVideoResolver::new(dir.path()).resolve().is_none());
    }

    #[test]
    fn picks_globally_newest_across_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        touch(&dir.path().join("old.mp4"), 300);
        touch(&dir.path().join("outputs/mid.mkv"), 200);
        touch(&dir.path().join("generated/newest.webm"), 10);
        touch(&dir.path().join("results/older.avi"), 100);

        let found = RecentVideoResolver::new(dir.path()).resolve().expect("artifact");
        assert_eq!(found.file_name().unwrap(), "newest.webm");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().expect("temp dir");
        touch(&dir.path().join("CLIP.MOV"), 5);
        let found = RecentVideoResolver::new(dir.path()).resolve().expect("artifact");
        assert_eq!(found.file_name().unwrap(), "CLIP.MOV");
    }

    #[test]
    fn file_reachable_twice_is_deduplicated() {
        let dir = tempfile::tempdir().expect("temp dir");
        touch(&dir.path().join("out.mp4"), 5);

        let resolver = RecentVideoResolver::with_dirs(
            dir.path(),
            [PathBuf::from("."), PathBuf::from(""), dir.path().to_path_buf()],
        );
        assert_eq!(resolver.collect_candidates().len(), 1);
        let found = resolver.resolve().expect("artifact");
        assert_eq!(found.file_name().unwrap(), "out.mp4");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_video_is_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("store/render.bin");
        touch(&target, 5);
        std::os::unix::fs::symlink(&target, dir.path().join("out.mp4")).expect("symlink");

        let found = RecentVideoResolver::new(dir.path()).resolve().expect("artifact");
        assert_eq!(found, target.canonicalize().expect("canonical"));
    }

    #[test]
    fn directories_named_like_videos_are_ignored() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir(dir.path().join("folder.mp4")).expect("mkdir");
        assert!(RecentVideoResolver::new(dir.path()).resolve().is_none());
    }
}

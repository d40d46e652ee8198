//! Plain-text log file helpers.
//!
//! Both session logs (generation and telemetry) are written by a single
//! writer and tailed by the presentation layer. Readers may observe a
//! partial write, so reads are lossy and never fail on a missing file.

use std::io;
use std::path::Path;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Default number of trailing lines returned by [`read_tail`].
pub const DEFAULT_TAIL_LINES: usize = 200;

/// Create `path` if missing and truncate it to zero length.
pub async fn truncate(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await?;
    Ok(())
}

/// Append `text` to `path`, creating the file if needed, and flush.
pub async fn append(path: &Path, text: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}

/// Return the last `max_lines` lines of `path`.
///
/// A missing file reads as empty. Invalid UTF-8 (e.g. a torn multi-byte
/// sequence at the end of a partial write) is replaced, not rejected.
pub async fn read_tail(path: &Path, max_lines: usize) -> io::Result<String> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(e),
    };
    let text = String::from_utf8_lossy(&bytes);
    Ok(tail_lines(&text, max_lines).to_string())
}

/// Slice of `text` holding its last `max_lines` lines.
fn tail_lines(text: &str, max_lines: usize) -> &str {
    if max_lines == 0 {
        return "";
    }
    let trimmed = text.strip_suffix('\n').unwrap_or(text);
    match trimmed.match_indices('\n').rev().nth(max_lines - 1) {
        Some((idx, _)) => &text[idx + 1..],
        None => text,
    }
}

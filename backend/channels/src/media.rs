//! Optional on-disk copy of inbound photos and documents.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct MediaArchive {
    dir: PathBuf,
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}

impl MediaArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{user}_{file_id}` with the original file name appended when known.
    pub fn file_name(user: &str, file_id: &str, original: Option<&str>) -> String {
        match original {
            Some(name) if !name.trim().is_empty() => {
                format!("{}_{}_{}", sanitize(user), sanitize(file_id), sanitize(name))
            }
            _ => format!("{}_{}", sanitize(user), sanitize(file_id)),
        }
    }

    /// Write a copy of the media. Failures are logged and otherwise ignored;
    /// archiving never blocks the user's request.
    pub async fn store(&self, name: &str, bytes: &[u8]) -> Option<PathBuf> {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Cannot create media directory");
            return None;
        }
        let path = self.dir.join(name);
        match tokio::fs::write(&path, bytes).await {
            Ok(()) => {
                debug!(path = %path.display(), bytes = bytes.len(), "Archived media");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to archive media");
                None
            }
        }
    }
}

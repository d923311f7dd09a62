//! Atomic file write operations.
//!
//! Provides safe atomic file writing using the `tempfile` crate.
//! Temp files are automatically cleaned up on failure.

use std::io;
use std::path::Path;
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Write content to a file atomically using a temporary file.
///
/// The temp file is created in the same directory as the target (required for
/// atomic rename) and renamed over the target once fully written, so readers
/// see either the old or the new content, never a partial write.
pub async fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    atomic_write_stamped(path, content, None).await
}

/// Write content atomically and, when `modified` is given, set the file's
/// modification time to it before the rename.
///
/// The note store uses the stamp to make a freshly written note carry the
/// remote item's `updatedAt` as its mtime.
pub async fn atomic_write_stamped(
    path: &Path,
    content: &str,
    modified: Option<SystemTime>,
) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory"))?
        .to_path_buf();
    let target_path = path.to_path_buf();
    let content_owned = content.to_string();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;

        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(content_owned.as_bytes())?;
        temp_file.flush()?;

        if let Some(modified) = modified {
            temp_file.as_file().set_modified(modified)?;
        }

        // Consumes the NamedTempFile, preventing auto-deletion
        temp_file.persist(&target_path)?;

        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[tokio::test]
    async fn test_atomic_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");

        atomic_write(&path, "hello").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");

        atomic_write(&path, "first").await.unwrap();
        atomic_write(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[tokio::test]
    async fn test_atomic_write_stamped_sets_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        let stamp = UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        atomic_write_stamped(&path, "body", Some(stamp)).await.unwrap();

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(modified, stamp);
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");

        atomic_write(&path, "content").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}

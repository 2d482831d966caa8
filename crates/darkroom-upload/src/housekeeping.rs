//! Storage-root housekeeping: size accounting and age-based deletion.
//!
//! Both operations enumerate only already-finalized files directly under the
//! storage root and are safe to run concurrently with uploads; in-flight
//! temp artifacts live outside the root (or are atomically renamed in). No
//! locking: a read racing a deletion of a stale file is a caller-side 404,
//! not an error.

use std::time::{Duration, SystemTime};

use darkroom_core::UploadError;

use crate::pipeline::UploadPipeline;

const SECONDS_PER_DAY: u64 = 86_400;

impl UploadPipeline {
    /// Sum the sizes of all regular files directly under the storage root.
    pub async fn directory_size(&self) -> Result<u64, UploadError> {
        let mut total = 0u64;
        let mut entries = tokio::fs::read_dir(&self.config().storage_root).await?;
        while let Some(entry) = entries.next_entry().await? {
            match entry.metadata().await {
                Ok(meta) if meta.is_file() => total += meta.len(),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Skipping unreadable entry during size accounting"
                    );
                }
            }
        }
        Ok(total)
    }

    /// Delete regular files whose modification time is strictly older than
    /// `max_age_days`. Returns the number of files deleted.
    ///
    /// Per-file failures are logged and skipped, never fatal to the batch.
    pub async fn clean_old_uploads(&self, max_age_days: u32) -> Result<usize, UploadError> {
        let threshold = SystemTime::now() - Duration::from_secs(u64::from(max_age_days) * SECONDS_PER_DAY);
        let mut deleted = 0usize;

        let mut entries = tokio::fs::read_dir(&self.config().storage_root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            let modified = match meta.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping entry without mtime");
                    continue;
                }
            };
            if modified >= threshold {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete stale upload");
                }
            }
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkroom_core::UploadConfig;
    use std::fs;
    use std::path::Path;

    async fn pipeline(root: &Path) -> UploadPipeline {
        UploadPipeline::new(UploadConfig::new(root)).await.unwrap()
    }

    fn age_file(path: &Path, days: u64) {
        let mtime = SystemTime::now() - Duration::from_secs(days * SECONDS_PER_DAY);
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(mtime).unwrap();
    }

    #[tokio::test]
    async fn test_directory_size_sums_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("b.jpg"), vec![0u8; 250]).unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("subdir/ignored.png"), vec![0u8; 999]).unwrap();

        let pipeline = pipeline(dir.path()).await;
        assert_eq!(pipeline.directory_size().await.unwrap(), 350);
    }

    #[tokio::test]
    async fn test_directory_size_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path()).await;
        assert_eq!(pipeline.directory_size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clean_old_uploads_deletes_only_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.png");
        let fresh = dir.path().join("fresh.png");
        fs::write(&old, b"old").unwrap();
        fs::write(&fresh, b"fresh").unwrap();
        age_file(&old, 31);
        age_file(&fresh, 5);

        let pipeline = pipeline(dir.path()).await;
        assert_eq!(pipeline.clean_old_uploads(30).await.unwrap(), 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_clean_old_uploads_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.png");
        fs::write(&old, b"old").unwrap();
        age_file(&old, 45);

        let pipeline = pipeline(dir.path()).await;
        assert_eq!(pipeline.clean_old_uploads(30).await.unwrap(), 1);
        assert_eq!(pipeline.clean_old_uploads(30).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clean_old_uploads_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let subdir = dir.path().join("nested");
        fs::create_dir(&subdir).unwrap();

        let pipeline = pipeline(dir.path()).await;
        assert_eq!(pipeline.clean_old_uploads(0).await.unwrap(), 0);
        assert!(subdir.exists());
    }
}

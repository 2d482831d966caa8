//! Upload pipeline: transport → size → type → scan → name → sanitize →
//! finalize.
//!
//! Control flow is strictly sequential and fails fast: any stage failure
//! aborts the attempt and nothing lands in the storage root. Sanitized
//! output is written to a temp file inside the storage root and atomically
//! renamed into place, so a concurrent reader of the directory never
//! observes a partially-written artifact. The pipeline itself does not log;
//! errors are returned structured for the caller's observability layer.

use std::path::{Path, PathBuf};

use tokio::task;

use darkroom_core::{StoredArtifact, UploadConfig, UploadDescriptor, UploadError};

use crate::validator::UploadValidator;
use crate::{filename, sanitizer, scanner};

/// One upload pipeline instance bound to a single storage root.
///
/// Holds no mutable state; concurrent `upload` calls are independent.
pub struct UploadPipeline {
    config: UploadConfig,
    validator: UploadValidator,
}

impl UploadPipeline {
    /// Create a pipeline, ensuring the storage root exists.
    pub async fn new(config: UploadConfig) -> Result<Self, UploadError> {
        tokio::fs::create_dir_all(&config.storage_root).await?;
        let validator = UploadValidator::new(
            config.max_file_size,
            config.allowed_extensions.clone(),
        );
        Ok(Self { config, validator })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Run the full pipeline over one untrusted upload.
    ///
    /// Consumes the descriptor; the temp file is read (and, when
    /// reprocessing is disabled, moved) but cleanup of a leftover temp file
    /// on failure remains the caller's responsibility.
    pub async fn upload(&self, upload: UploadDescriptor) -> Result<StoredArtifact, UploadError> {
        self.validator.check_transport(&upload)?;
        self.validator.check_size(&upload).await?;

        let data = tokio::fs::read(&upload.temp_path).await?;
        let validated = self.validator.check_type(&data, &upload.declared_name)?;

        // The type validator only admits images, so the header-window policy
        // applies.
        scanner::scan(&data, true)?;

        let stored_name = filename::generate(&validated.extension, self.config.randomize_filename);
        let destination = self.config.storage_root.join(&stored_name);

        if self.config.reprocess_images {
            let mime = validated.mime;
            let root = self.config.storage_root.clone();
            let dest = destination.clone();
            task::spawn_blocking(move || write_sanitized(&data, mime, &root, &dest))
                .await
                .map_err(|e| UploadError::Internal(format!("sanitizer task failed: {}", e)))??;
        } else {
            move_verbatim(&upload.temp_path, &destination).await?;
        }

        self.finalize(&destination, &stored_name, validated.mime.mime_type())
            .await
    }

    /// Set safe permissions and verify the artifact actually landed.
    async fn finalize(
        &self,
        destination: &Path,
        stored_name: &str,
        mime_type: &str,
    ) -> Result<StoredArtifact, UploadError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(destination, std::fs::Permissions::from_mode(0o644))
                .await?;
        }

        let meta = tokio::fs::metadata(destination)
            .await
            .map_err(|_| UploadError::UploadVerificationFailed)?;
        if !meta.is_file() || meta.len() == 0 {
            // Never leave a zero-length artifact behind
            let _ = tokio::fs::remove_file(destination).await;
            return Err(UploadError::UploadVerificationFailed);
        }

        Ok(StoredArtifact {
            filename: stored_name.to_string(),
            size_bytes: meta.len(),
            mime_type: mime_type.to_string(),
        })
    }

    /// Delete a stored artifact by its opaque filename.
    ///
    /// Returns whether a file was removed. The name is guarded the same way
    /// storage keys are: no separators, no parent references.
    pub async fn delete(&self, stored_name: &str) -> Result<bool, UploadError> {
        let path = self.artifact_path(stored_name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                tokio::fs::remove_file(&path).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub(crate) fn artifact_path(&self, stored_name: &str) -> Result<PathBuf, UploadError> {
        if stored_name.is_empty()
            || stored_name.contains(['/', '\\'])
            || stored_name.contains("..")
        {
            return Err(UploadError::InvalidFilename(stored_name.to_string()));
        }
        Ok(self.config.storage_root.join(stored_name))
    }
}

/// Re-encode and land atomically: encode into a temp file within the
/// destination directory, then rename over the final path. The temp file is
/// removed automatically if any step fails before the rename.
fn write_sanitized(
    data: &[u8],
    mime: darkroom_core::ImageMime,
    storage_root: &Path,
    destination: &Path,
) -> Result<(), UploadError> {
    use std::io::Write;

    let sanitized = sanitizer::reencode(data, mime)?;

    let mut tmp = tempfile::NamedTempFile::new_in(storage_root)?;
    tmp.write_all(&sanitized)?;
    tmp.flush()?;
    tmp.persist(destination)
        .map_err(|e| UploadError::Io(e.error))?;
    Ok(())
}

/// Move the original bytes into place without reprocessing. Rename is
/// atomic; the copy fallback covers temp dirs on another filesystem.
async fn move_verbatim(source: &Path, destination: &Path) -> Result<(), UploadError> {
    if tokio::fs::rename(source, destination).await.is_ok() {
        return Ok(());
    }
    if let Err(e) = tokio::fs::copy(source, destination).await {
        let _ = tokio::fs::remove_file(destination).await;
        return Err(UploadError::Io(e));
    }
    let _ = tokio::fs::remove_file(source).await;
    Ok(())
}

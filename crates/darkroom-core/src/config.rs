//! Configuration module
//!
//! Pipeline configuration is an explicit immutable value passed to the
//! pipeline constructor. Each pipeline instance owns one storage root (e.g.
//! one for content images, one for the site logo), so tests and concurrent
//! callers can run with distinct configs without shared state.

use std::path::PathBuf;

/// Maximum upload size (25 MB)
pub const MAX_FILE_SIZE: u64 = 26_214_400;

/// Default extension allow-list
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Upload pipeline configuration
///
/// Immutable for the lifetime of a pipeline instance.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Flat directory that receives finalized artifacts
    pub storage_root: PathBuf,
    /// Ceiling for both the declared and the actual byte size
    pub max_file_size: u64,
    /// Lower-cased extensions accepted from the declared filename
    pub allowed_extensions: Vec<String>,
    /// Re-encode images through a fresh pixel buffer before storing.
    /// Disabling this stores the original bytes verbatim; the operator
    /// accepts the residual risk.
    pub reprocess_images: bool,
    /// Use a fully random storage name instead of a random prefix plus
    /// timestamp
    pub randomize_filename: bool,
}

impl UploadConfig {
    /// Create a configuration with the default limits and allow-list.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            max_file_size: MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            reprocess_images: true,
            randomize_filename: true,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn with_reprocess_images(mut self, reprocess: bool) -> Self {
        self.reprocess_images = reprocess;
        self
    }

    pub fn with_randomize_filename(mut self, randomize: bool) -> Self {
        self.randomize_filename = randomize;
        self
    }
}

//! Darkroom Core Library
//!
//! This crate provides the domain types shared by the Darkroom upload
//! pipeline: the error taxonomy, the immutable pipeline configuration, and
//! the data model for upload descriptors and stored artifacts.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::UploadConfig;
pub use error::{LogLevel, PatternClass, UploadError};
pub use models::{ImageMime, StoredArtifact, TransportStatus, UploadDescriptor, ValidatedType};

//! Darkroom Upload Pipeline
//!
//! Untrusted file upload sanitization for the Darkroom CMS: validates
//! attacker-controlled bytes claimed to be images without trusting client
//! metadata, scans for embedded script payloads, re-encodes the image
//! through a fresh pixel buffer so only genuine pixel data survives, and
//! lands the artifact atomically in a flat storage directory.
//!
//! The pipeline is invoked in-process by request handlers. It returns typed
//! errors and never logs; presentation and observability belong to the
//! caller (admin callers may show [`UploadError::admin_message`], anonymous
//! surfaces must use [`UploadError::public_message`]).

pub mod filename;
pub mod housekeeping;
pub mod pipeline;
pub mod sanitizer;
pub mod scanner;
pub mod validator;

pub use pipeline::UploadPipeline;
pub use validator::UploadValidator;

// Re-export the domain types callers need alongside the pipeline
pub use darkroom_core::{
    ImageMime, LogLevel, PatternClass, StoredArtifact, TransportStatus, UploadConfig,
    UploadDescriptor, UploadError, ValidatedType,
};

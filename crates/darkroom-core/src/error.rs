//! Error types module
//!
//! Every pipeline stage fails with a distinct [`UploadError`] variant so
//! operators can diagnose rejections precisely. Errors are returned as
//! structured results; the pipeline never logs and never panics. Callers
//! serving anonymous visitors must use [`UploadError::public_message`] so
//! validation internals are not leaked as an oracle; admin-facing callers
//! may surface [`UploadError::admin_message`].

use std::io;

/// Log level a caller should use when reporting an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected rejections of client input
    Debug,
    /// Resource limits and suspicious content
    Warn,
    /// Unexpected failures (storage, encoding)
    Error,
}

/// Class of pattern that triggered a malicious-content rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternClass {
    /// Script-opening marker (`<?php`, `<?=`, `<script`)
    ScriptMarker,
    /// Shell/eval/file-access call pattern
    DangerousCall,
    /// Embedded NUL byte (extension-truncation trick)
    NullByte,
}

impl std::fmt::Display for PatternClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternClass::ScriptMarker => write!(f, "script marker"),
            PatternClass::DangerousCall => write!(f, "dangerous call"),
            PatternClass::NullByte => write!(f, "null byte"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file was uploaded")]
    NoFileSent,

    #[error("File was only partially uploaded")]
    PartialTransfer,

    #[error("File size exceeds the transport layer limit")]
    TransportSizeExceeded,

    #[error("Missing temporary upload directory on the server")]
    ServerStorageMisconfigured,

    #[error("Transport layer failed to write the file to disk")]
    TransportWriteFailed,

    #[error("Unknown transport upload error")]
    UnknownTransportError,

    #[error("Temp file was not produced by the receiving layer")]
    UnverifiedOrigin,

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("File size exceeds maximum allowed size of {limit_bytes} bytes")]
    SizeExceeded { limit_bytes: u64 },

    #[error("File type not allowed: {detected}. Only images are permitted")]
    TypeNotAllowed { detected: String },

    #[error("File type mismatch detected")]
    TypeMismatch,

    #[error("Malicious content detected ({pattern})")]
    MaliciousContentDetected { pattern: PatternClass },

    #[error("Failed to decode image: {0}")]
    ImageDecodeFailed(String),

    #[error("Failed to encode sanitized image: {0}")]
    ImageEncodeFailed(String),

    #[error("Upload verification failed")]
    UploadVerificationFailed,

    #[error("Invalid stored filename: {0}")]
    InvalidFilename(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UploadError {
    /// Machine-readable error code for structured caller-side logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::NoFileSent => "NO_FILE_SENT",
            UploadError::PartialTransfer => "PARTIAL_TRANSFER",
            UploadError::TransportSizeExceeded => "TRANSPORT_SIZE_EXCEEDED",
            UploadError::ServerStorageMisconfigured => "SERVER_STORAGE_MISCONFIGURED",
            UploadError::TransportWriteFailed => "TRANSPORT_WRITE_FAILED",
            UploadError::UnknownTransportError => "UNKNOWN_TRANSPORT_ERROR",
            UploadError::UnverifiedOrigin => "UNVERIFIED_ORIGIN",
            UploadError::EmptyFile => "EMPTY_FILE",
            UploadError::SizeExceeded { .. } => "SIZE_EXCEEDED",
            UploadError::TypeNotAllowed { .. } => "TYPE_NOT_ALLOWED",
            UploadError::TypeMismatch => "TYPE_MISMATCH",
            UploadError::MaliciousContentDetected { .. } => "MALICIOUS_CONTENT_DETECTED",
            UploadError::ImageDecodeFailed(_) => "IMAGE_DECODE_FAILED",
            UploadError::ImageEncodeFailed(_) => "IMAGE_ENCODE_FAILED",
            UploadError::UploadVerificationFailed => "UPLOAD_VERIFICATION_FAILED",
            UploadError::InvalidFilename(_) => "INVALID_FILENAME",
            UploadError::Io(_) => "IO_ERROR",
            UploadError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to an authenticated admin user.
    pub fn admin_message(&self) -> String {
        self.to_string()
    }

    /// Message for anonymous visitors. All failures collapse to one generic
    /// string so the validation rules cannot be probed from the outside.
    pub fn public_message(&self) -> &'static str {
        "Upload failed. Please try again."
    }

    /// Log level a caller should use when reporting this error.
    pub fn log_level(&self) -> LogLevel {
        match self {
            UploadError::NoFileSent
            | UploadError::PartialTransfer
            | UploadError::TransportSizeExceeded
            | UploadError::EmptyFile
            | UploadError::SizeExceeded { .. }
            | UploadError::TypeNotAllowed { .. }
            | UploadError::TypeMismatch
            | UploadError::InvalidFilename(_)
            | UploadError::ImageDecodeFailed(_) => LogLevel::Debug,
            UploadError::UnverifiedOrigin
            | UploadError::MaliciousContentDetected { .. } => LogLevel::Warn,
            UploadError::ServerStorageMisconfigured
            | UploadError::TransportWriteFailed
            | UploadError::UnknownTransportError
            | UploadError::ImageEncodeFailed(_)
            | UploadError::UploadVerificationFailed
            | UploadError::Io(_)
            | UploadError::Internal(_) => LogLevel::Error,
        }
    }
}

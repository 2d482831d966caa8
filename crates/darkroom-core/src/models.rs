//! Data model for the upload pipeline
//!
//! [`UploadDescriptor`] is the untrusted input handed over by the HTTP
//! layer. [`ValidatedType`] is a derived fact established by content
//! inspection, never by client claims. [`StoredArtifact`] is the success
//! output owned by the storage area after finalization.

use std::path::PathBuf;

use serde::Serialize;

/// Transport-level outcome reported by the receiving layer for one upload.
///
/// Mirrors the error codes multipart/form receivers conventionally expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// Clean transfer, temp file written in full
    Received,
    /// The transport layer's own size limit cut the transfer off
    TooLarge,
    /// Connection dropped mid-transfer
    Partial,
    /// The request carried no file field
    NoFile,
    /// The server has no usable temp directory
    MissingTempDir,
    /// The temp file could not be written
    WriteFailed,
    /// A server-side filter aborted the upload
    BlockedByFilter,
    /// Anything the receiving layer could not classify
    Unknown,
}

/// The untrusted input to the pipeline, created by the HTTP layer per
/// request and consumed exactly once.
///
/// Every field except `temp_path` and `transport` is client-controlled and
/// must not be trusted; `declared_name` is only ever used to derive a
/// candidate extension and `declared_size` is cross-checked against the real
/// on-disk size.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    /// Location of the received bytes, owned by the caller's runtime until
    /// consumed
    pub temp_path: PathBuf,
    /// Client-supplied original filename
    pub declared_name: String,
    /// Client-declared byte size
    pub declared_size: u64,
    /// Transport-level error indicator
    pub transport: TransportStatus,
    /// Whether the receiving layer itself produced `temp_path` (as opposed
    /// to a path supplied by the caller)
    pub origin_verified: bool,
}

/// Image MIME types the pipeline will ever accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMime {
    /// Map a sniffed MIME string to a supported image type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            "image/gif" => Some(ImageMime::Gif),
            "image/webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Gif => "image/gif",
            ImageMime::Webp => "image/webp",
        }
    }

    /// Extensions conventionally associated with this MIME type.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageMime::Jpeg => &["jpg", "jpeg"],
            ImageMime::Png => &["png"],
            ImageMime::Gif => &["gif"],
            ImageMime::Webp => &["webp"],
        }
    }
}

/// Type facts established by content inspection.
///
/// Computed once by the type validator; every later stage uses this instead
/// of client-declared values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedType {
    pub mime: ImageMime,
    /// Declared extension, lower-cased, confirmed to match `mime`
    pub extension: String,
}

/// The pipeline's success output.
///
/// Exists in the storage root if and only if every validation and
/// sanitization stage completed. Deletion is explicit, via `delete` or
/// housekeeping.
#[derive(Debug, Clone, Serialize)]
pub struct StoredArtifact {
    /// Generated, opaque filename within the storage root
    pub filename: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_round_trip() {
        for mime in ["image/jpeg", "image/png", "image/gif", "image/webp"] {
            let parsed = ImageMime::from_mime(mime).unwrap();
            assert_eq!(parsed.mime_type(), mime);
        }
    }

    #[test]
    fn test_image_mime_rejects_non_images() {
        assert!(ImageMime::from_mime("application/pdf").is_none());
        assert!(ImageMime::from_mime("text/html").is_none());
        assert!(ImageMime::from_mime("image/svg+xml").is_none());
    }

    #[test]
    fn test_jpeg_has_two_extensions() {
        assert_eq!(ImageMime::Jpeg.extensions(), &["jpg", "jpeg"]);
        assert_eq!(ImageMime::Png.extensions(), &["png"]);
    }
}

//! Upload validators: transport provenance, size, and content-derived type.
//!
//! Type validation never trusts the declared filename or a client-sent
//! content type. The MIME type is sniffed from magic bytes, cross-checked
//! against an independent decode of the image header, and only then compared
//! with the declared extension. All three must agree.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};

use darkroom_core::{ImageMime, TransportStatus, UploadDescriptor, UploadError, ValidatedType};

/// Stateless validator configured with the pipeline's size and extension
/// policy.
pub struct UploadValidator {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
        }
    }

    /// Validate the transport-level outcome and the provenance of the temp
    /// artifact.
    ///
    /// Succeeds only for a clean transfer whose temp file was produced by
    /// the receiving layer itself. Each transport failure maps to a distinct
    /// error kind for operator diagnostics.
    pub fn check_transport(&self, upload: &UploadDescriptor) -> Result<(), UploadError> {
        match upload.transport {
            TransportStatus::Received => {}
            TransportStatus::TooLarge => return Err(UploadError::TransportSizeExceeded),
            TransportStatus::Partial => return Err(UploadError::PartialTransfer),
            TransportStatus::NoFile => return Err(UploadError::NoFileSent),
            TransportStatus::MissingTempDir => {
                return Err(UploadError::ServerStorageMisconfigured)
            }
            TransportStatus::WriteFailed => return Err(UploadError::TransportWriteFailed),
            TransportStatus::BlockedByFilter | TransportStatus::Unknown => {
                return Err(UploadError::UnknownTransportError)
            }
        }

        if !upload.origin_verified {
            return Err(UploadError::UnverifiedOrigin);
        }

        Ok(())
    }

    /// Validate declared and actual byte sizes against the configured
    /// ceiling.
    ///
    /// The actual on-disk size is authoritative; a declared size that merely
    /// disagrees is not an error. Returns the actual size.
    pub async fn check_size(&self, upload: &UploadDescriptor) -> Result<u64, UploadError> {
        if upload.declared_size > self.max_file_size {
            return Err(UploadError::SizeExceeded {
                limit_bytes: self.max_file_size,
            });
        }

        let actual = tokio::fs::metadata(&upload.temp_path).await?.len();
        if actual == 0 {
            return Err(UploadError::EmptyFile);
        }
        if actual > self.max_file_size {
            return Err(UploadError::SizeExceeded {
                limit_bytes: self.max_file_size,
            });
        }

        Ok(actual)
    }

    /// Derive the validated type from file contents and the declared
    /// filename.
    pub fn check_type(
        &self,
        data: &[u8],
        declared_name: &str,
    ) -> Result<ValidatedType, UploadError> {
        // Sniff from magic bytes. A recognized non-image type is rejected
        // outright; an unrecognized stream is indeterminate and left for the
        // decode probe to reject.
        let sniffed = match infer::get(data) {
            Some(kind) => match ImageMime::from_mime(kind.mime_type()) {
                Some(mime) => Some(mime),
                None => {
                    return Err(UploadError::TypeNotAllowed {
                        detected: kind.mime_type().to_string(),
                    })
                }
            },
            None => None,
        };

        // Independent decode probe: read the embedded format and the image
        // header. Failure means the bytes are not a real image, whatever the
        // magic number claimed.
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(UploadError::Io)?;
        let decoded_format = reader.format();
        reader
            .into_dimensions()
            .map_err(|_| UploadError::TypeMismatch)?;

        let mime = match (sniffed, decoded_format) {
            (Some(mime), Some(format)) if expected_format(mime) == format => mime,
            _ => return Err(UploadError::TypeMismatch),
        };

        // Declared extension must be allow-listed and belong to the sniffed
        // MIME type.
        let extension = Path::new(declared_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !self.allowed_extensions.contains(&extension) {
            return Err(UploadError::TypeNotAllowed {
                detected: format!("extension '{}'", extension),
            });
        }
        if !mime.extensions().contains(&extension.as_str()) {
            return Err(UploadError::TypeMismatch);
        }

        Ok(ValidatedType { mime, extension })
    }
}

fn expected_format(mime: ImageMime) -> ImageFormat {
    match mime {
        ImageMime::Jpeg => ImageFormat::Jpeg,
        ImageMime::Png => ImageFormat::Png,
        ImageMime::Gif => ImageFormat::Gif,
        ImageMime::Webp => ImageFormat::WebP,
    }
}

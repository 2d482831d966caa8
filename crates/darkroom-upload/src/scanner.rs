//! Static content scanner for embedded script payloads.
//!
//! Image payloads get a header-window scan: only the first 1 KB is checked
//! for script-opening markers, because binary pixel data further in produces
//! false positives while the common payload-prepended-to-a-valid-image
//! attack puts the marker right at the front. Non-image payloads (reachable
//! only when an operator widens the allow-list beyond images) get a full
//! scan: script markers, a fixed set of shell/eval/file-access call
//! patterns, and embedded NUL bytes.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use darkroom_core::{PatternClass, UploadError};

/// Window scanned at the start of image payloads
const IMAGE_SCAN_WINDOW: usize = 1024;

static SCRIPT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\?php|<\?=|<script").expect("valid script marker pattern"));

static DANGEROUS_CALLS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)eval\s*\(",
        r"(?i)base64_decode\s*\(",
        r"(?i)shell_exec\s*\(",
        r"(?i)system\s*\(",
        r"(?i)passthru\s*\(",
        r"(?i)exec\s*\(",
        r"(?i)popen\s*\(",
        r"(?i)proc_open\s*\(",
        r"(?i)include\s*\(",
        r"(?i)require\s*\(",
        r"(?i)file_get_contents\s*\(",
        r"(?i)file_put_contents\s*\(",
        r"(?i)fopen\s*\(",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid call pattern"))
    .collect()
});

/// Scan an image payload's header window for script-opening markers.
pub fn scan_image(data: &[u8]) -> Result<(), UploadError> {
    let window = &data[..data.len().min(IMAGE_SCAN_WINDOW)];
    if SCRIPT_MARKER.is_match(window) {
        return Err(UploadError::MaliciousContentDetected {
            pattern: PatternClass::ScriptMarker,
        });
    }
    Ok(())
}

/// Full-content scan for non-image payloads.
pub fn scan_full(data: &[u8]) -> Result<(), UploadError> {
    if SCRIPT_MARKER.is_match(data) {
        return Err(UploadError::MaliciousContentDetected {
            pattern: PatternClass::ScriptMarker,
        });
    }
    for pattern in DANGEROUS_CALLS.iter() {
        if pattern.is_match(data) {
            return Err(UploadError::MaliciousContentDetected {
                pattern: PatternClass::DangerousCall,
            });
        }
    }
    if data.contains(&0) {
        return Err(UploadError::MaliciousContentDetected {
            pattern: PatternClass::NullByte,
        });
    }
    Ok(())
}

/// Dispatch on payload category. The pipeline always passes `is_image =
/// true` because the type validator only admits images; the full-scan branch
/// exists for allow-lists that someday include non-image types.
pub fn scan(data: &[u8], is_image: bool) -> Result<(), UploadError> {
    if is_image {
        scan_image(data)
    } else {
        scan_full(data)
    }
}

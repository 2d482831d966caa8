//! Image sanitization by transcode.
//!
//! The source bytes are decoded with the format-specific decoder into a
//! fresh pixel buffer and re-encoded from that buffer alone. Anything not
//! representable as pixels — trailing payloads after the image-end marker,
//! EXIF and comment metadata, malformed chunks — never survives the round
//! trip. Formats with alpha (PNG, WebP) go through an RGBA buffer so
//! transparency is preserved.

use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, Frame, ImageEncoder, ImageFormat};

use darkroom_core::{ImageMime, UploadError};

/// Quality for lossy re-encodes (JPEG, WebP)
const LOSSY_QUALITY: u8 = 85;

/// Decode `data` as `mime` and re-encode it from a fresh pixel buffer.
///
/// CPU-bound; the pipeline runs this on a blocking task.
pub fn reencode(data: &[u8], mime: ImageMime) -> Result<Vec<u8>, UploadError> {
    let img = image::load_from_memory_with_format(data, source_format(mime))
        .map_err(|e| UploadError::ImageDecodeFailed(e.to_string()))?;

    let mut out = Vec::new();
    match mime {
        ImageMime::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut Cursor::new(&mut out), LOSSY_QUALITY)
                .encode_image(&rgb)
                .map_err(|e| UploadError::ImageEncodeFailed(e.to_string()))?;
        }
        ImageMime::Png => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            PngEncoder::new_with_quality(
                Cursor::new(&mut out),
                CompressionType::Best,
                FilterType::Adaptive,
            )
            .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| UploadError::ImageEncodeFailed(e.to_string()))?;
        }
        ImageMime::Gif => {
            let rgba = img.to_rgba8();
            let mut encoder = GifEncoder::new(&mut out);
            encoder
                .encode_frame(Frame::new(rgba))
                .map_err(|e| UploadError::ImageEncodeFailed(e.to_string()))?;
        }
        ImageMime::Webp => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
                .encode(LOSSY_QUALITY as f32);
            out = encoded.to_vec();
        }
    }

    if out.is_empty() {
        return Err(UploadError::ImageEncodeFailed(
            "encoder produced no output".to_string(),
        ));
    }

    Ok(out)
}

fn source_format(mime: ImageMime) -> ImageFormat {
    match mime {
        ImageMime::Jpeg => ImageFormat::Jpeg,
        ImageMime::Png => ImageFormat::Png,
        ImageMime::Gif => ImageFormat::Gif,
        ImageMime::Webp => ImageFormat::WebP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};
    use std::io::Cursor;

    fn gradient_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 99, 255])
        })
    }

    fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        if format == ImageFormat::Jpeg {
            // The JPEG encoder has no alpha support
            image::DynamicImage::ImageRgba8(img.clone())
                .to_rgb8()
                .write_to(&mut Cursor::new(&mut buffer), format)
                .unwrap();
        } else {
            img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        }
        buffer
    }

    #[test]
    fn test_reencode_preserves_dimensions() {
        let img = gradient_image(23, 17);
        for (format, mime) in [
            (ImageFormat::Png, ImageMime::Png),
            (ImageFormat::Jpeg, ImageMime::Jpeg),
            (ImageFormat::Gif, ImageMime::Gif),
        ] {
            let source = encode(&img, format);
            let sanitized = reencode(&source, mime).unwrap();
            let decoded = image::load_from_memory(&sanitized).unwrap();
            assert_eq!(decoded.dimensions(), (23, 17), "{:?}", format);
        }
    }

    #[test]
    fn test_reencode_webp_round_trip() {
        let img = gradient_image(16, 16);
        let source = webp::Encoder::from_rgba(img.as_raw(), 16, 16)
            .encode(90.0)
            .to_vec();
        let sanitized = reencode(&source, ImageMime::Webp).unwrap();
        let decoded = image::load_from_memory(&sanitized).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
    }

    #[test]
    fn test_reencode_strips_trailing_payload() {
        let mut source = encode(&gradient_image(8, 8), ImageFormat::Png);
        source.extend_from_slice(b"<?php system($_GET['c']); ?>");

        let sanitized = reencode(&source, ImageMime::Png).unwrap();
        assert!(!sanitized
            .windows(5)
            .any(|w| w.eq_ignore_ascii_case(b"<?php")));
        // Still a valid image of the same size
        let decoded = image::load_from_memory(&sanitized).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
    }

    #[test]
    fn test_reencode_preserves_transparency() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let source = encode(&img, ImageFormat::Png);

        let sanitized = reencode(&source, ImageMime::Png).unwrap();
        let decoded = image::load_from_memory(&sanitized).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
        assert_eq!(decoded.get_pixel(1, 1)[3], 255);
    }

    #[test]
    fn test_reencode_rejects_garbage() {
        let err = reencode(b"definitely not an image", ImageMime::Jpeg).unwrap_err();
        assert!(matches!(err, UploadError::ImageDecodeFailed(_)));
    }

    #[test]
    fn test_reencode_rejects_format_confusion() {
        // PNG bytes forced through the JPEG decoder must fail, not fall back
        let source = encode(&gradient_image(8, 8), ImageFormat::Png);
        let err = reencode(&source, ImageMime::Jpeg).unwrap_err();
        assert!(matches!(err, UploadError::ImageDecodeFailed(_)));
    }
}

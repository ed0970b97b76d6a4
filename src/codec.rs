//! Image decoding and normalization — pure Rust, zero external dependencies.
//!
//! Every accepted upload is re-encoded to a single storage format: JPEG at
//! quality 90. Serving one format keeps the uploads directory uniform and
//! strips whatever container oddities the client sent.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (auto-detect) | `image::load_from_memory` |
//! | Decode (extension fallback) | `image::load_from_memory_with_format` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! ## Two-stage decode
//!
//! Auto-detection by magic bytes can fail on inputs whose container differs
//! slightly from what the generic reader expects. When it does, we retry with
//! the decoder named by the file extension. The fallback trades robustness for
//! a small risk of a lying extension — a mismatch surfaces as a decode error,
//! never a panic.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use thiserror::Error;

/// Extension of every normalized file written to the uploads directory.
pub const NORMALIZED_EXTENSION: &str = "jpg";

/// Extensions whose decoders are compiled in and usable as a fallback when
/// generic format detection fails.
const FALLBACK_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unsupported image format: {0:?}")]
    UnsupportedFormat(String),
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Decode an uploaded byte stream into a pixel buffer.
///
/// `name_hint` is the client-supplied filename; only its extension is
/// consulted, and only after generic auto-detection has failed.
pub fn decode(bytes: &[u8], name_hint: &str) -> Result<DynamicImage, CodecError> {
    match image::load_from_memory(bytes) {
        Ok(img) => Ok(img),
        Err(_) => {
            let ext = extension_of(name_hint);
            let Some(format) = fallback_format(&ext) else {
                return Err(CodecError::UnsupportedFormat(ext));
            };
            image::load_from_memory_with_format(bytes, format).map_err(CodecError::Decode)
        }
    }
}

/// Encode a pixel buffer as JPEG at the given quality.
///
/// JPEG carries no alpha channel, so the buffer is flattened to RGB first.
pub fn encode(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.value() as u8)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(CodecError::Encode)?;
    Ok(out)
}

/// Lowercased extension of a filename, empty if it has none.
fn extension_of(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn fallback_format(ext: &str) -> Option<ImageFormat> {
    FALLBACK_FORMATS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, fmt)| *fmt)
}

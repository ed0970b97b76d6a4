//! Shared test utilities.
//!
//! Synthetic images are generated in-memory with the `image` crate so tests
//! never depend on fixture files.

use crate::repo::NewPhoto;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// A small gradient image — enough structure that every encoder accepts it.
pub(crate) fn synthetic_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

/// A synthetic image encoded to the given format.
pub(crate) fn synthetic_image_bytes(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = synthetic_image(width, height);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// A plausible record for repository tests.
pub(crate) fn new_photo(title: &str) -> NewPhoto {
    NewPhoto {
        title: title.to_string(),
        filename: "cafebabe0000.jpg".to_string(),
        file_path: "uploads/cafebabe0000.jpg".to_string(),
        file_size: 2048,
        created_at: "2026-08-07 12:00:00".to_string(),
    }
}

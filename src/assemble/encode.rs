//! Image encoding: `DynamicImage` → base64 JPEG data URL.
//!
//! Vision APIs accept images as base64 data-URIs embedded in the JSON
//! request body. Fallback page renders use JPEG rather than PNG: a scanned
//! answer sheet is photographic content where JPEG compresses 5–10× better,
//! and up to 8 rendered pages ride in a single request body, so size
//! matters more than the last bit of edge crispness here.

use crate::payload::ImageBlob;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page as a JPEG data URL ready for the model.
pub fn encode_page(img: &DynamicImage) -> Result<ImageBlob, image::ImageError> {
    let mut buf = Vec::new();
    // JPEG encoding rejects alpha channels; rendered pages are opaque anyway.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)?;

    let blob = ImageBlob::from_bytes("image/jpeg", &buf);
    debug!("Encoded page render → {} bytes base64", blob.data_url.len());
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let blob = encode_page(&img).expect("encode should succeed");
        assert_eq!(blob.mime, "image/jpeg");
        assert!(blob.data_url.starts_with("data:image/jpeg;base64,"));
        // Verify it decodes back to a JPEG payload.
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        let bytes = STANDARD.decode(blob.base64_payload()).expect("valid base64");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");
    }
}

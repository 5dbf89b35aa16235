//! Image re-encoding for thumbnails and reduced-quality previews

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::Result;

/// Mimetype of every re-encoded image
pub const REENCODED_MIMETYPE: &str = "image/jpeg";

/// JPEG quality used when none is requested
pub const DEFAULT_QUALITY: u8 = 75;

/// Whether a request with these parameters needs re-encoding at all
pub fn wants_reencode(size: u32, quality: u8) -> bool {
    size > 0 || quality > 0
}

/// Decode `data`, shrink it to fit a `size`x`size` box (0 keeps the
/// original dimensions) and encode it as JPEG at `quality` (0 = default).
pub fn reencode(data: &[u8], size: u32, quality: u8) -> Result<Vec<u8>> {
    let mut img = image::load_from_memory(data)?;

    let (width, height) = img.dimensions();
    if size > 0 && (width > size || height > size) {
        img = img.thumbnail(size, size);
    }

    let quality = match quality {
        0 => DEFAULT_QUALITY,
        q => q.min(100),
    };

    // JPEG carries no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
    debug!(
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", rgb.width(), rgb.height()),
        quality,
        bytes = out.len(),
        "Re-encoded image"
    );
    Ok(out)
}

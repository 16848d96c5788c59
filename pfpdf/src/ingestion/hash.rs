//! Content hashing for image deduplication.

use image::DynamicImage;
use sha2::{Digest, Sha256};

/// SHA-256 of an image's decoded pixel buffer, as a hex string.
///
/// Dimensions and colour type are folded in so that buffers with identical
/// bytes but different shapes do not collide.
pub fn compute_pixel_hash(pixels: &DynamicImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pixels.width().to_le_bytes());
    hasher.update(pixels.height().to_le_bytes());
    hasher.update(format!("{:?}", pixels.color()).as_bytes());
    hasher.update(pixels.as_bytes());
    format!("{:x}", hasher.finalize())
}

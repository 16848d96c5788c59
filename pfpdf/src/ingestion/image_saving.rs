//! Image saving utilities for extraction.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::error::{ImportResult, ProcessingError};

const JPEG_QUALITY: u8 = 90;

/// On-disk format of an extracted image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFileFormat {
    Png,
    Jpeg,
}

impl ImageFileFormat {
    /// PNG keeps transparency; everything else is stored as JPEG.
    pub fn for_alpha(has_alpha: bool) -> Self {
        if has_alpha {
            ImageFileFormat::Png
        } else {
            ImageFileFormat::Jpeg
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFileFormat::Png => "png",
            ImageFileFormat::Jpeg => "jpg",
        }
    }
}

/// Encode `pixels` to `path` in the given format.
pub fn save_image(pixels: &DynamicImage, path: &Path, format: ImageFileFormat) -> ImportResult<()> {
    let file = File::create(path).map_err(|e| ProcessingError::io(path, e))?;
    let writer = BufWriter::new(file);
    let (width, height) = (pixels.width(), pixels.height());

    let encoded = match format {
        ImageFileFormat::Png => {
            let rgba = pixels.to_rgba8();
            PngEncoder::new(writer).write_image(
                rgba.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
        ImageFileFormat::Jpeg => {
            let rgb = pixels.to_rgb8();
            JpegEncoder::new_with_quality(writer, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };

    encoded.map_err(|e| {
        ProcessingError::io(
            path,
            std::io::Error::other(format!(
                "Failed to encode {}: {}",
                format.extension(),
                e
            )),
        )
    })?;

    debug!(
        path = %path.display(),
        width = width,
        height = height,
        format = ?format,
        "Saved image"
    );

    Ok(())
}

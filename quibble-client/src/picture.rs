//! Client-side downscaling of oversized image attachments.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat};

#[derive(Debug, thiserror::Error)]
pub enum PictureError {
    #[error("unsupported image media type {0:?}")]
    UnsupportedMediaType(String),
    #[error("failed decoding image: {0}")]
    Decode(String),
    #[error("failed encoding image: {0}")]
    Encode(String),
}

/// Aspect-preserving downscale into a fixed bounding box, re-encoding in
/// the declared media type. Built once per submission.
pub struct ImageNormalizer {
    max_width: u32,
    max_height: u32,
}

impl ImageNormalizer {
    pub fn new(max_width: u32, max_height: u32) -> ImageNormalizer {
        ImageNormalizer {
            max_width,
            max_height,
        }
    }

    /// Landscape-or-square images are bounded by width, portrait ones by
    /// height; the other side scales proportionally, rounded to nearest.
    /// An image already inside the box keeps its dimensions but is still
    /// decoded and re-encoded, so the output always matches `media_type`.
    pub fn resize(&self, bytes: &[u8], media_type: &str) -> Result<Vec<u8>, PictureError> {
        let format = match media_type {
            "image/png" => ImageFormat::Png,
            "image/jpeg" => ImageFormat::Jpeg,
            "image/gif" => ImageFormat::Gif,
            other => return Err(PictureError::UnsupportedMediaType(other.to_string())),
        };
        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| PictureError::Decode(e.to_string()))?;

        let (width, height) = (img.width(), img.height());
        let (new_width, new_height) = if width >= height {
            if width > self.max_width {
                let scale = self.max_width as f64 / width as f64;
                (self.max_width, (height as f64 * scale).round() as u32)
            } else {
                (width, height)
            }
        } else if height > self.max_height {
            let scale = self.max_height as f64 / height as f64;
            ((width as f64 * scale).round() as u32, self.max_height)
        } else {
            (width, height)
        };

        let resized = if (new_width, new_height) == (width, height) {
            img
        } else {
            img.resize_exact(new_width, new_height, FilterType::Triangle)
        };
        // jpeg carries no alpha channel
        let resized = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            _ => resized,
        };

        let mut out = Cursor::new(Vec::new());
        resized
            .write_to(&mut out, format)
            .map_err(|e| PictureError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }
}

//! Image processing port.

use async_trait::async_trait;

/// Bounding box an image must fit within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub max_width: u32,
    pub max_height: u32,
}

/// Featured images are shrunk to fit 800x600.
pub const FEATURED_IMAGE_BOUNDS: ImageBounds = ImageBounds {
    max_width: 800,
    max_height: 600,
};

impl ImageBounds {
    /// Target size for a `width` x `height` image, or `None` when it already fits.
    ///
    /// The aspect ratio is kept and images are never enlarged.
    pub fn fit(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width == 0 || height == 0 {
            return None;
        }
        if width <= self.max_width && height <= self.max_height {
            return None;
        }

        let ratio = f64::min(
            self.max_width as f64 / width as f64,
            self.max_height as f64 / height as f64,
        );
        let new_width = ((width as f64 * ratio) as u32).max(1);
        let new_height = ((height as f64 * ratio) as u32).max(1);
        Some((new_width, new_height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Unchanged,
    Resized { width: u32, height: u32 },
}

/// Resizes stored images in place.
#[async_trait]
pub trait ImageResizer: Send + Sync {
    /// Shrink the image at `path` (relative to the media root) to fit `bounds`,
    /// overwriting the original.
    async fn fit_within(&self, path: &str, bounds: ImageBounds)
    -> Result<ResizeOutcome, ImageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image decoding failed: {0}")]
    Decode(String),

    #[error("Image write failed: {0}")]
    Write(String),
}

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use image::imageops::FilterType;

use digihub_core::ports::{ImageBounds, ImageError, ImageResizer, ResizeOutcome};

/// Resizes images stored on the local filesystem, relative to `root`.
///
/// Decoding and encoding run on the blocking pool.
pub struct FsImageResizer {
    root: PathBuf,
}

impl FsImageResizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `relative` under the media root, refusing anything that could
    /// escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf, ImageError> {
        let path = Path::new(relative);
        let inside = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.is_empty() || !inside {
            return Err(ImageError::NotFound(format!(
                "{} is not a path under the media root",
                relative
            )));
        }
        Ok(self.root.join(path))
    }
}

fn shrink(path: &Path, bounds: ImageBounds) -> Result<ResizeOutcome, ImageError> {
    let img = image::open(path).map_err(|e| ImageError::Decode(e.to_string()))?;

    let Some((width, height)) = bounds.fit(img.width(), img.height()) else {
        return Ok(ResizeOutcome::Unchanged);
    };

    img.resize_exact(width, height, FilterType::Lanczos3)
        .save(path)
        .map_err(|e| ImageError::Write(e.to_string()))?;

    Ok(ResizeOutcome::Resized { width, height })
}

#[async_trait]
impl ImageResizer for FsImageResizer {
    async fn fit_within(
        &self,
        path: &str,
        bounds: ImageBounds,
    ) -> Result<ResizeOutcome, ImageError> {
        let full = self.resolve(path)?;
        if !tokio::fs::try_exists(&full).await.unwrap_or(false) {
            return Err(ImageError::NotFound(path.to_string()));
        }

        let outcome = tokio::task::spawn_blocking(move || shrink(&full, bounds))
            .await
            .map_err(|e| ImageError::Write(e.to_string()))??;

        if let ResizeOutcome::Resized { width, height } = outcome {
            tracing::info!(path = %path, width, height, "Image resized");
        }
        Ok(outcome)
    }
}

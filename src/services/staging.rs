use image::{ColorType, DynamicImage, ImageFormat};
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Process-scoped scratch directory for staged uploads.
///
/// Every process gets its own `worker-<uuid>` subdirectory under the
/// configured root, so several workers can share one root without ever
/// touching each other's files.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create the root (if absent) and a fresh subdirectory for this process.
    pub fn create(root: impl AsRef<Path>) -> io::Result<Self> {
        let path = root.as_ref().join(format!("worker-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode an upload, normalize it to RGB and write it as a JPEG.
    ///
    /// Blocking: call from `spawn_blocking`.
    pub fn stage(&self, bytes: &[u8]) -> Result<StagedImage, StageError> {
        let decoded = image::load_from_memory(bytes).map_err(StageError::Decode)?;
        let rgb = if decoded.color() == ColorType::Rgb8 {
            decoded
        } else {
            DynamicImage::ImageRgb8(decoded.to_rgb8())
        };

        // The directory may have been removed underneath us.
        std::fs::create_dir_all(&self.path)?;

        // Guard first, so a partial write is removed on the error path.
        let staged = StagedImage {
            path: self.path.join(format!("temp_{}.jpg", Uuid::new_v4())),
        };
        rgb.save_with_format(&staged.path, ImageFormat::Jpeg)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => StageError::Io(io),
                other => StageError::Encode(other),
            })?;

        metrics::counter!("staged_images_total").increment(1);
        Ok(staged)
    }

    /// Write and remove a probe file (for health checks).
    pub fn probe(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.path)?;
        let probe = self.path.join(format!("probe_{}", Uuid::new_v4()));
        std::fs::write(&probe, b"ok")?;
        std::fs::remove_file(&probe)
    }

    /// Remove this process's subdirectory. Errors are ignored.
    pub fn remove(&self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// A temporary JPEG owned by a single request; deleted on drop.
#[derive(Debug)]
pub struct StagedImage {
    path: PathBuf,
}

impl StagedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        // Never allowed to mask the request's own outcome.
        let _ = std::fs::remove_file(&self.path);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("{0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode staged image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to write staged image: {0}")]
    Io(#[from] io::Error),
}

//! Destinations for completed images.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image decode failed: {0}")]
    DecodeFailure(#[source] image::ImageError),
    #[error("Failed to save image to {path}: {source}")]
    SaveFailure {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Summary of an accepted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

/// Receives the bytes of each completed image.
pub trait ImageSink: Send {
    fn accept(&mut self, bytes: &[u8]) -> Result<ImageInfo, ImageError>;
}

fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    let format = image::guess_format(bytes).ok();
    let img = image::load_from_memory(bytes).map_err(ImageError::DecodeFailure)?;
    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
    };
    Ok((img, info))
}

/// Decodes each image and saves it to a fixed path, replacing the last one.
///
/// The output format follows the path's extension.
#[derive(Debug, Clone)]
pub struct FileImageSink {
    path: PathBuf,
}

impl FileImageSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ImageSink for FileImageSink {
    fn accept(&mut self, bytes: &[u8]) -> Result<ImageInfo, ImageError> {
        let (img, info) = decode(bytes)?;
        img.save(&self.path).map_err(|source| ImageError::SaveFailure {
            path: self.path.display().to_string(),
            source,
        })?;
        info!(path = %self.path.display(), width = info.width, height = info.height, "Image saved");
        Ok(info)
    }
}

/// Keeps decoded images in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSink {
    images: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemoryImageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes of every image that decoded successfully.
    pub fn images(&self) -> Vec<Vec<u8>> {
        self.images.lock().unwrap().clone()
    }
}

impl ImageSink for MemoryImageSink {
    fn accept(&mut self, bytes: &[u8]) -> Result<ImageInfo, ImageError> {
        let (_, info) = decode(bytes)?;
        self.images.lock().unwrap().push(bytes.to_vec());
        Ok(info)
    }
}

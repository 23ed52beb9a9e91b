use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open image {path}: {source}")]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("rgba buffer length mismatch for {width}x{height} sheet: expected {expected}, got {actual}")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Decoded tile sheet image in row-major RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSheet {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TileSheet {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::BufferLength {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let reader = ImageReader::open(path).map_err(|source| AssetError::ImageOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| AssetError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decoded.to_rgba8();
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "tile_sheet_decoded"
        );
        Self::from_rgba(image.width(), image.height(), image.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA of the texel at `(x, y)`, or `None` outside the image.
    pub fn texel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

pub fn load_text_asset(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Tracks which required assets have finished loading.
///
/// Assets outside the required set are ignored. Readiness is reported once,
/// by the `mark_loaded` call that completes the set.
#[derive(Debug, Clone, Default)]
pub struct AssetTracker {
    required: BTreeSet<String>,
    loaded: BTreeSet<String>,
    ready_signaled: bool,
}

impl AssetTracker {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            loaded: BTreeSet::new(),
            ready_signaled: false,
        }
    }

    /// Records `asset` as loaded. Returns `true` exactly once, when the last
    /// required asset arrives.
    pub fn mark_loaded(&mut self, asset: &str) -> bool {
        if self.required.contains(asset) {
            self.loaded.insert(asset.to_string());
        }
        if self.ready_signaled || !self.is_ready() {
            return false;
        }
        self.ready_signaled = true;
        info!(
            loaded = self.loaded.len(),
            required = self.required.len(),
            "assets_ready"
        );
        true
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.len() == self.required.len()
    }

    pub fn required_assets(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    pub fn loaded_assets(&self) -> impl Iterator<Item = &str> {
        self.loaded.iter().map(String::as_str)
    }
}

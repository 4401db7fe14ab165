//! I/O helpers for masks, overlays and JSON.
//!
//! - `load_mask_image`: read a PNG/JPEG/etc. into an owned binary mask.
//! - `load_grayscale_image`: read any image into an owned 8-bit gray buffer.
//! - `save_rgb8`: write an `ImageRgb8` overlay to disk.
//! - `read_json_file` / `write_json_file`: serde round trips through disk.
use super::{ImageRgb8, ImageU8, MaskU8};
use crate::error::{Error, Result};
use image::{ImageBuffer, Rgb};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned 8-bit grayscale buffer with borrowed view conversion.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8::packed(self.width, self.height, &self.data)
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8> {
    let img = image::open(path)
        .map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?
        .into_luma8();
    Ok(GrayImageU8 {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.into_raw(),
    })
}

/// Load a mask image; any non-zero gray level becomes foreground.
pub fn load_mask_image(path: &Path) -> Result<MaskU8> {
    let gray = load_grayscale_image(path)?;
    Ok(MaskU8::from_view(&gray.as_view()))
}

/// Save an RGB overlay image. The format follows the file extension.
pub fn save_rgb8(image: &ImageRgb8, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(image.w as u32, image.h as u32, image.to_raw()).ok_or_else(
            || Error::Config(format!("failed to create image buffer for {}", path.display())),
        )?;
    buffer.save(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize a JSON document from `path`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

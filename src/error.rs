//! Error type shared by the library and the `mask_rank` tool.
//!
//! Only contract violations and I/O failures are errors. Empty regions,
//! unmatched masks and empty inputs are ordinary data states and are
//! reported through the returned values instead.

use crate::detections::MaskId;
use crate::image::ImageSize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("segment index {index} is outside a {grid_dim}x{grid_dim} grid")]
    InvalidGeometry { index: usize, grid_dim: usize },

    #[error("mask {id} is {got}, expected image size {expected}")]
    MaskSizeMismatch {
        id: MaskId,
        expected: ImageSize,
        got: ImageSize,
    },

    #[error("invalid saliency ranking: {0}")]
    InvalidRanking(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize JSON {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to process image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

//! Collaborators that produce the ranker's inputs.
//!
//! Instance segmentation and saliency ranking run outside this crate. They
//! are reached through [`InstanceDetector`] and [`SaliencySource`] handles
//! that the caller passes in explicitly; nothing here keeps a loaded model
//! or a "current image" in global state.
//!
//! [`DetectionFile`] and [`SaliencyFile`] replay results that an external
//! service already wrote to disk.

use crate::detections::{DetectionSet, MaskId};
use crate::error::{Error, Result};
use crate::image::io::{load_mask_image, read_json_file};
use crate::image::{ImageSize, ImageU8, ImageView};
use crate::saliency::SaliencyRanking;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub trait InstanceDetector {
    fn detect(&self, image: &ImageU8<'_>) -> Result<DetectionSet>;
}

pub trait SaliencySource {
    fn rank_segments(&self, image: &ImageU8<'_>, grid_dim: usize) -> Result<SaliencyRanking>;
}

/// On-disk detection manifest. Mask paths are relative to the manifest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionManifest {
    pub image_size: ImageSize,
    pub detections: Vec<DetectionEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEntry {
    pub id: MaskId,
    pub class_id: u32,
    pub score: f32,
    pub mask: PathBuf,
}

/// Detections replayed from a [`DetectionManifest`].
#[derive(Clone, Debug)]
pub struct DetectionFile {
    path: PathBuf,
}

impl DetectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest and every referenced mask.
    pub fn load(&self) -> Result<DetectionSet> {
        let manifest: DetectionManifest = read_json_file(&self.path)?;
        let base = self.path.parent().unwrap_or_else(|| Path::new(""));

        let mut set = DetectionSet::new(manifest.image_size);
        for entry in manifest.detections {
            let mask_path = base.join(&entry.mask);
            let mask = load_mask_image(&mask_path)?;
            debug!(
                "loaded mask {} class={} score={:.3} from {}",
                entry.id,
                entry.class_id,
                entry.score,
                mask_path.display()
            );
            set.detections.push(crate::detections::Detection {
                id: entry.id,
                class_id: entry.class_id,
                score: entry.score,
                mask,
            });
        }
        set.validate()?;
        info!(
            "loaded {} detections ({}) from {}",
            set.len(),
            set.image_size,
            self.path.display()
        );
        Ok(set)
    }
}

impl InstanceDetector for DetectionFile {
    fn detect(&self, image: &ImageU8<'_>) -> Result<DetectionSet> {
        let set = self.load()?;
        if set.image_size != image.size() {
            return Err(Error::Config(format!(
                "detections in {} are for a {} image, got {}",
                self.path.display(),
                set.image_size,
                image.size()
            )));
        }
        Ok(set)
    }
}

/// Saliency ranking replayed from JSON.
#[derive(Clone, Debug)]
pub struct SaliencyFile {
    path: PathBuf,
}

impl SaliencyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<SaliencyRanking> {
        let ranking: SaliencyRanking = read_json_file(&self.path)?;
        ranking.validate()?;
        info!(
            "loaded {} saliency segments (grid {}x{}) from {}",
            ranking.len(),
            ranking.grid_dim,
            ranking.grid_dim,
            self.path.display()
        );
        Ok(ranking)
    }
}

impl SaliencySource for SaliencyFile {
    fn rank_segments(&self, _image: &ImageU8<'_>, grid_dim: usize) -> Result<SaliencyRanking> {
        let ranking = self.load()?;
        if ranking.grid_dim != grid_dim {
            return Err(Error::Config(format!(
                "saliency ranking in {} uses a {}x{} grid, expected {}x{}",
                self.path.display(),
                ranking.grid_dim,
                ranking.grid_dim,
                grid_dim,
                grid_dim
            )));
        }
        Ok(ranking)
    }
}

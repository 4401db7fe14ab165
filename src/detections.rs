//! Instance detections consumed by the ranker.
//!
//! A detection carries a binary mask plus the class id and confidence the
//! detector reported. Class ids and scores are passed through to reports
//! untouched; only the masks take part in attribution.

use crate::error::{Error, Result};
use crate::image::{ImageSize, ImageU8, MaskU8};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of one mask within a detection result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskId(pub u32);

impl fmt::Display for MaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("#{}", self.0))
    }
}

#[derive(Clone, Debug)]
pub struct Detection {
    pub id: MaskId,
    pub class_id: u32,
    pub score: f32,
    pub mask: MaskU8,
}

/// All detections for one image.
#[derive(Clone, Debug, Default)]
pub struct DetectionSet {
    pub image_size: ImageSize,
    pub detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new(image_size: ImageSize) -> Self {
        Self {
            image_size,
            detections: Vec::new(),
        }
    }

    /// Append a detection with the next free id (`0..N-1` in insertion order).
    pub fn push(&mut self, class_id: u32, score: f32, mask: MaskU8) -> MaskId {
        let id = MaskId(self.detections.len() as u32);
        self.detections.push(Detection {
            id,
            class_id,
            score,
            mask,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn get(&self, id: MaskId) -> Option<&Detection> {
        self.detections.iter().find(|d| d.id == id)
    }

    /// Check ids are unique and every mask matches `image_size`.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for det in &self.detections {
            if !seen.insert(det.id) {
                return Err(Error::Config(format!("duplicate mask id {}", det.id)));
            }
            if det.mask.size() != self.image_size {
                return Err(Error::MaskSizeMismatch {
                    id: det.id,
                    expected: self.image_size,
                    got: det.mask.size(),
                });
            }
        }
        Ok(())
    }

    /// Borrowed mask views keyed by id.
    pub fn masks(&self) -> BTreeMap<MaskId, ImageU8<'_>> {
        self.detections
            .iter()
            .map(|d| (d.id, d.mask.as_view()))
            .collect()
    }

    /// Mask views of the detections whose score is at least `min_score`.
    pub fn masks_scoring_at_least(&self, min_score: f32) -> BTreeMap<MaskId, ImageU8<'_>> {
        self.detections
            .iter()
            .filter(|d| d.score >= min_score)
            .map(|d| (d.id, d.mask.as_view()))
            .collect()
    }

    /// Union of every mask sized to the image. Masks of a different size
    /// are skipped.
    pub fn combined_mask(&self) -> MaskU8 {
        let mut all = MaskU8::with_size(self.image_size);
        for det in &self.detections {
            if !all.union_with(&det.mask) {
                log::warn!(
                    "combined_mask: skipping mask {} of size {} (image {})",
                    det.id,
                    det.mask.size(),
                    self.image_size
                );
            }
        }
        all
    }
}

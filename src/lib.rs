#![doc = include_str!("../README.md")]

// Core attribution
pub mod attribution;
pub mod coverage;
pub mod grid;

// Inputs, outputs and collaborators
pub mod coco;
pub mod config;
pub mod detections;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod palette;
pub mod ranker;
pub mod saliency;
pub mod sources;

// --- High-level re-exports -------------------------------------------------

pub use crate::attribution::{attribute, Attribution, AttributionParams, Match};
pub use crate::coverage::coverage;
pub use crate::detections::{Detection, DetectionSet, MaskId};
pub use crate::diagnostics::RankingReport;
pub use crate::error::{Error, Result};
pub use crate::grid::{segment_to_bbox, CellBounds};
pub use crate::image::ImageSize;
pub use crate::ranker::{MaskRanker, RankerParams};
pub use crate::saliency::{SaliencyRanking, SaliencySegment};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use mask_saliency::prelude::*;
///
/// let size = ImageSize::new(4, 4);
/// let mut detections = DetectionSet::new(size);
/// detections.push(1, 0.9, MaskU8::from_fn(4, 4, |x, y| x >= 2 && y >= 2));
///
/// let saliency = SaliencyRanking::new(
///     2,
///     vec![SaliencySegment::new(3, 1, 2.0), SaliencySegment::new(0, 2, 1.0)],
/// );
/// let ranker = MaskRanker::new(RankerParams {
///     attribution: AttributionParams::new(2, 0.6),
///     ..Default::default()
/// });
/// let report = ranker.rank(&detections, &saliency).unwrap();
/// assert_eq!(report.masks[0].rank, Some(1));
/// ```
pub mod prelude {
    pub use crate::image::{ImageU8, MaskU8};
    pub use crate::{
        AttributionParams, DetectionSet, ImageSize, MaskId, MaskRanker, RankerParams,
        SaliencyRanking, SaliencySegment,
    };
}

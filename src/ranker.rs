//! End-to-end ranking of one image's detections.
//!
//! Typical usage:
//! ```no_run
//! use mask_saliency::{MaskRanker, RankerParams};
//! use mask_saliency::sources::{DetectionFile, SaliencyFile};
//!
//! # fn main() -> mask_saliency::Result<()> {
//! let detections = DetectionFile::new("out/detections.json").load()?;
//! let saliency = SaliencyFile::new("out/saliency.json").load()?;
//! let report = MaskRanker::new(RankerParams::default()).rank(&detections, &saliency)?;
//! for mask in report.ranked() {
//!     println!("{} -> rank {:?}", mask.id, mask.rank);
//! }
//! # Ok(())
//! # }
//! ```

use crate::attribution::{attribute, AttributionParams};
use crate::detections::DetectionSet;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{InputDescriptor, RankingReport, StageTiming, TimingBreakdown};
use crate::error::{Error, Result};
use crate::image::{ImageRgb8, ImageU8};
use crate::palette::{compose_overlay, RankPalette};
use crate::saliency::SaliencyRanking;
use crate::sources::{InstanceDetector, SaliencySource};
use log::{debug, info};
use serde::Deserialize;
use std::time::Instant;

/// Parameters of the ranking pipeline.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankerParams {
    #[serde(flatten)]
    pub attribution: AttributionParams,
    /// Detections scoring below this confidence are left out of the ranking.
    pub min_score: f32,
}

pub struct MaskRanker {
    params: RankerParams,
}

impl MaskRanker {
    pub fn new(params: RankerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RankerParams {
        &self.params
    }

    /// Update the saliency grid size.
    pub fn set_grid_dim(&mut self, grid_dim: usize) {
        self.params.attribution.grid_dim = grid_dim;
    }

    /// Update the coverage threshold.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.params.attribution.threshold = threshold;
    }

    /// Attribute saliency ranks to `detections` and assemble the report.
    pub fn rank(
        &self,
        detections: &DetectionSet,
        saliency: &SaliencyRanking,
    ) -> Result<RankingReport> {
        let total_start = Instant::now();
        let params = self.params.attribution;
        params.validate()?;

        if saliency.grid_dim != params.grid_dim {
            return Err(Error::InvalidRanking(format!(
                "ranking uses a {}x{} grid, ranker is configured for {}x{}",
                saliency.grid_dim, saliency.grid_dim, params.grid_dim, params.grid_dim
            )));
        }

        let mut timings = TimingBreakdown::default();
        timings.time("validate", || -> Result<()> {
            saliency.validate()?;
            detections.validate()
        })?;

        let min_score = self.params.min_score;
        let masks = detections.masks_scoring_at_least(min_score);
        let skipped = detections.len() - masks.len();
        if skipped > 0 {
            debug!("MaskRanker::rank skipped {skipped} detections below score {min_score:.3}");
        }
        let attribution = timings.time("attribution", || {
            attribute(&saliency.segments, &masks, detections.image_size, &params)
        })?;

        let palette = timings.time("palette", || RankPalette::for_attribution(&attribution));
        let ranked_masks =
            RankingReport::summarize_masks(detections, &masks, &attribution, &palette);

        let unranked = attribution.unranked(masks.keys().copied());
        if !unranked.is_empty() {
            debug!("MaskRanker::rank unranked masks: {:?}", unranked);
        }
        info!(
            "ranked {}/{} masks against {} segments",
            attribution.best.len(),
            masks.len(),
            saliency.len()
        );

        timings.finish(total_start);
        Ok(RankingReport {
            input: InputDescriptor {
                width: detections.image_size.width,
                height: detections.image_size.height,
                detections: detections.len(),
                skipped,
                segments: saliency.len(),
                grid_dim: params.grid_dim,
            },
            params,
            masks: ranked_masks,
            legend: palette.legend(),
            attribution,
            timings,
        })
    }

    /// Run the injected detector and saliency source on `image`, then rank.
    pub fn rank_image(
        &self,
        detector: &dyn InstanceDetector,
        saliency_source: &dyn SaliencySource,
        image: &ImageU8<'_>,
    ) -> Result<RankingReport> {
        let detect_start = Instant::now();
        let detections = detector.detect(image)?;
        let detect_ms = elapsed_ms(detect_start);

        let saliency_start = Instant::now();
        let saliency =
            saliency_source.rank_segments(image, self.params.attribution.grid_dim)?;
        let saliency_ms = elapsed_ms(saliency_start);

        let mut report = self.rank(&detections, &saliency)?;
        let stages = &mut report.timings.stages;
        stages.insert(0, StageTiming::new("saliency", saliency_ms));
        stages.insert(0, StageTiming::new("detect", detect_ms));
        report.timings.total_ms += detect_ms + saliency_ms;
        Ok(report)
    }

    /// Colour overlay of the ranked masks of `report`.
    pub fn overlay(&self, detections: &DetectionSet, report: &RankingReport) -> ImageRgb8 {
        let palette = RankPalette::for_attribution(&report.attribution);
        compose_overlay(detections.image_size, detections, &report.attribution, &palette)
    }
}

//! Mask-to-segment saliency attribution.
//!
//! For every saliency segment and every mask the segment's grid cell is
//! located ([`segment_to_bbox`]) and the mask's coverage of that cell is
//! measured ([`coverage`]). A coverage strictly above the threshold records a
//! [`Match`]. Each mask is then reduced to its best match, the one with the
//! numerically lowest (most salient) rank.
//!
//! Masks without a single match are absent from the result. Callers must
//! treat absence as "unranked" rather than fall back to a default rank.
//!
//! The work per mask is independent, so with the `parallel` feature masks
//! are evaluated on the rayon pool. Segments are always visited in input
//! order within a mask, which keeps the per-mask match lists identical to
//! the sequential evaluation.

use crate::coverage::coverage;
use crate::detections::MaskId;
use crate::error::{Error, Result};
use crate::grid::{grid_cell_count, segment_to_bbox, CellBounds};
use crate::image::{ImageSize, ImageView};
use crate::saliency::{SaliencySegment, DEFAULT_GRID_DIM};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Knobs of the attribution stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttributionParams {
    /// Cells per side of the saliency grid.
    pub grid_dim: usize,
    /// Minimum coverage (exclusive) for a mask to claim a cell.
    pub threshold: f64,
}

impl Default for AttributionParams {
    fn default() -> Self {
        Self {
            grid_dim: DEFAULT_GRID_DIM,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AttributionParams {
    pub fn new(grid_dim: usize, threshold: f64) -> Self {
        Self {
            grid_dim,
            threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if grid_cell_count(self.grid_dim).is_err() {
            return Err(Error::Config(format!(
                "gridDim must be at least 1 and its square must fit in usize, got {}",
                self.grid_dim
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::Config(format!(
                "threshold must lie in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// One mask claiming one saliency segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub mask_id: MaskId,
    pub segment_index: usize,
    pub rank: u32,
    pub coverage: f64,
    pub information: f64,
}

/// Per-mask matches and the best (lowest-rank) match of each ranked mask.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Matches in segment evaluation order; only masks with at least one.
    pub matches: BTreeMap<MaskId, Vec<Match>>,
    pub best: BTreeMap<MaskId, Match>,
}

impl Attribution {
    pub fn rank_of(&self, id: MaskId) -> Option<u32> {
        self.best.get(&id).map(|m| m.rank)
    }

    pub fn is_ranked(&self, id: MaskId) -> bool {
        self.best.contains_key(&id)
    }

    /// Ranked mask ids, most salient first (ties by id).
    pub fn ranked_ids(&self) -> Vec<MaskId> {
        let mut ids: Vec<(u32, MaskId)> = self.best.iter().map(|(id, m)| (m.rank, *id)).collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Ids from `all` that received no match.
    pub fn unranked<I>(&self, all: I) -> Vec<MaskId>
    where
        I: IntoIterator<Item = MaskId>,
    {
        all.into_iter().filter(|id| !self.is_ranked(*id)).collect()
    }

    pub fn match_count(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }
}

/// Attribute saliency ranks to masks.
///
/// Fails only on contract violations: a segment index outside the grid, a
/// zero `grid_dim`, or a mask whose size differs from `image_size`. Empty
/// `segments` or `masks` produce an empty [`Attribution`].
///
/// With unique ranks the `best` map does not depend on segment order. If
/// two matches of one mask share a rank, the one evaluated first wins.
pub fn attribute<M>(
    segments: &[SaliencySegment],
    masks: &BTreeMap<MaskId, M>,
    image_size: ImageSize,
    params: &AttributionParams,
) -> Result<Attribution>
where
    M: ImageView<Pixel = u8> + Sync,
{
    if segments.is_empty() || masks.is_empty() {
        debug!(
            "attribute: nothing to do (segments={} masks={})",
            segments.len(),
            masks.len()
        );
        return Ok(Attribution::default());
    }

    for (id, mask) in masks {
        if mask.size() != image_size {
            return Err(Error::MaskSizeMismatch {
                id: *id,
                expected: image_size,
                got: mask.size(),
            });
        }
    }

    let cells = segments
        .iter()
        .map(|seg| segment_to_bbox(seg.index, params.grid_dim, image_size).map(|b| (*seg, b)))
        .collect::<Result<Vec<(SaliencySegment, CellBounds)>>>()?;

    let per_mask = match_all_masks(&cells, masks, params.threshold);

    let mut attribution = Attribution::default();
    for (id, list) in per_mask {
        let Some(best) = list.iter().min_by_key(|m| m.rank).copied() else {
            continue;
        };
        attribution.best.insert(id, best);
        attribution.matches.insert(id, list);
    }

    debug!(
        "attribute: grid={} threshold={:.3} segments={} masks={} matches={} ranked={}",
        params.grid_dim,
        params.threshold,
        segments.len(),
        masks.len(),
        attribution.match_count(),
        attribution.best.len()
    );
    Ok(attribution)
}

fn match_mask<M>(
    id: MaskId,
    mask: &M,
    cells: &[(SaliencySegment, CellBounds)],
    threshold: f64,
) -> Vec<Match>
where
    M: ImageView<Pixel = u8>,
{
    cells
        .iter()
        .filter_map(|(seg, bounds)| {
            let ratio = coverage(mask, *bounds);
            (ratio > threshold).then_some(Match {
                mask_id: id,
                segment_index: seg.index,
                rank: seg.rank,
                coverage: ratio,
                information: seg.information,
            })
        })
        .collect()
}

fn match_all_masks<M>(
    cells: &[(SaliencySegment, CellBounds)],
    masks: &BTreeMap<MaskId, M>,
    threshold: f64,
) -> Vec<(MaskId, Vec<Match>)>
where
    M: ImageView<Pixel = u8> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        masks
            .par_iter()
            .map(|(id, mask)| (*id, match_mask(*id, mask, cells, threshold)))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        match_all_masks_sequential(cells, masks, threshold)
    }
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn match_all_masks_sequential<M>(
    cells: &[(SaliencySegment, CellBounds)],
    masks: &BTreeMap<MaskId, M>,
    threshold: f64,
) -> Vec<(MaskId, Vec<Match>)>
where
    M: ImageView<Pixel = u8>,
{
    masks
        .iter()
        .map(|(id, mask)| (*id, match_mask(*id, mask, cells, threshold)))
        .collect()
}

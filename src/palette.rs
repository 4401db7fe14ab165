//! Rank colour assignment and the composite rank overlay.
//!
//! Every distinct rank receives its own display colour. Hues are spread by
//! the golden angle, and saturation and value step to the next tier after
//! every [`HUES_PER_TIER`] colours. A colour that still rounds onto one
//! already handed out moves to the next unused RGB triple, so colours stay
//! unique for any rank count below 2^24.

use crate::attribution::Attribution;
use crate::detections::DetectionSet;
use crate::image::{ImageRgb8, ImageSize, ImageViewMut};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const GOLDEN_ANGLE_DEG: f64 = 137.507_764_050_037_85;
/// Golden-angle hues emitted before moving to the next saturation/value tier.
pub const HUES_PER_TIER: usize = 128;
/// `(saturation, value)` tiers, cycled.
const TIERS: [(f64, f64); 4] = [(0.85, 0.95), (0.55, 0.95), (0.85, 0.70), (0.55, 0.70)];
const RGB_SPACE: u32 = 1 << 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub rank: u32,
    pub color: [u8; 3],
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RankPalette {
    colors: BTreeMap<u32, [u8; 3]>,
}

impl RankPalette {
    /// One colour per distinct rank, assigned in ascending rank order.
    pub fn for_ranks<I>(ranks: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut distinct: Vec<u32> = ranks.into_iter().collect();
        distinct.sort_unstable();
        distinct.dedup();

        let mut used = BTreeSet::new();
        let colors = distinct
            .into_iter()
            .enumerate()
            .map(|(slot, rank)| (rank, unused_color(golden_angle_color(slot), &mut used)))
            .collect();
        Self { colors }
    }

    pub fn for_attribution(attribution: &Attribution) -> Self {
        Self::for_ranks(attribution.best.values().map(|m| m.rank))
    }

    pub fn color(&self, rank: u32) -> Option<[u8; 3]> {
        self.colors.get(&rank).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.colors
            .iter()
            .map(|(&rank, &color)| LegendEntry { rank, color })
            .collect()
    }
}

fn golden_angle_color(slot: usize) -> [u8; 3] {
    let hue = (slot as f64 * GOLDEN_ANGLE_DEG) % 360.0;
    let (saturation, value) = TIERS[(slot / HUES_PER_TIER) % TIERS.len()];
    hsv_to_rgb(hue, saturation, value)
}

/// Return `candidate`, or the next free triple after it in packed 24-bit
/// order, and mark the result as used.
fn unused_color(candidate: [u8; 3], used: &mut BTreeSet<[u8; 3]>) -> [u8; 3] {
    let packed = u32::from_be_bytes([0, candidate[0], candidate[1], candidate[2]]);
    let color = (0..RGB_SPACE)
        .map(|step| {
            let [_, r, g, b] = ((packed + step) % RGB_SPACE).to_be_bytes();
            [r, g, b]
        })
        .find(|c| !used.contains(c))
        .unwrap_or(candidate);
    used.insert(color);
    color
}

fn hsv_to_rgb(hue_deg: f64, s: f64, v: f64) -> [u8; 3] {
    let c = v * s;
    let h = hue_deg / 60.0;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to_u8 = |ch: f64| ((ch + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// Paint the foreground of every ranked mask with its rank colour.
///
/// Overlapping masks are OR-combined channel-wise, and unranked masks are
/// left black.
pub fn compose_overlay(
    image_size: ImageSize,
    detections: &DetectionSet,
    attribution: &Attribution,
    palette: &RankPalette,
) -> ImageRgb8 {
    let mut overlay = ImageRgb8::new(image_size);
    for det in &detections.detections {
        let Some(color) = attribution.rank_of(det.id).and_then(|r| palette.color(r)) else {
            continue;
        };
        if det.mask.size() != image_size {
            log::warn!(
                "compose_overlay: mask {} is {}, overlay is {}",
                det.id,
                det.mask.size(),
                image_size
            );
            continue;
        }
        for y in 0..image_size.height {
            let mask_row = &det.mask.data[y * det.mask.w..(y + 1) * det.mask.w];
            for (px, &m) in overlay.row_mut(y).iter_mut().zip(mask_row) {
                if m != 0 {
                    px[0] |= color[0];
                    px[1] |= color[1];
                    px[2] |= color[2];
                }
            }
        }
    }
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::Match;
    use crate::detections::MaskId;
    use crate::image::MaskU8;

    #[test]
    fn colors_are_unique_per_rank() {
        let palette = RankPalette::for_ranks((1..=64).chain([3, 3, 7]));
        assert_eq!(palette.len(), 64);
        let unique: BTreeSet<[u8; 3]> = palette.legend().iter().map(|e| e.color).collect();
        assert_eq!(unique.len(), 64);
    }

    #[test]
    fn colors_stay_unique_across_many_ranks() {
        let n = 3000u32;
        let palette = RankPalette::for_ranks(1..=n);
        let unique: BTreeSet<[u8; 3]> = palette.legend().iter().map(|e| e.color).collect();
        assert_eq!(unique.len(), n as usize);
        // The first tier is untouched by the collision walk.
        assert_eq!(palette.color(1), Some(golden_angle_color(0)));
    }

    #[test]
    fn collision_walks_to_next_free_triple() {
        let mut used = BTreeSet::from([[10, 20, 255], [10, 21, 0]]);
        assert_eq!(unused_color([10, 20, 255], &mut used), [10, 21, 1]);
        assert_eq!(unused_color([1, 2, 3], &mut used), [1, 2, 3]);
        assert_eq!(used.len(), 4);
    }

    #[test]
    fn legend_is_ordered_by_rank() {
        let palette = RankPalette::for_ranks([9, 2, 5]);
        let ranks: Vec<u32> = palette.legend().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![2, 5, 9]);
        assert!(palette.color(4).is_none());
    }

    #[test]
    fn overlay_paints_only_ranked_masks() {
        let size = ImageSize::new(2, 2);
        let mut dets = DetectionSet::new(size);
        let ranked = dets.push(1, 0.9, MaskU8::from_fn(2, 2, |x, _| x == 0));
        dets.push(2, 0.9, MaskU8::from_fn(2, 2, |x, _| x == 1));

        let mut at = Attribution::default();
        let m = Match {
            mask_id: ranked,
            segment_index: 0,
            rank: 1,
            coverage: 1.0,
            information: 0.0,
        };
        at.matches.insert(MaskId(0), vec![m]);
        at.best.insert(MaskId(0), m);

        let palette = RankPalette::for_attribution(&at);
        let overlay = compose_overlay(size, &dets, &at, &palette);
        let color = palette.color(1).unwrap();
        assert_eq!(overlay.get(0, 0), color);
        assert_eq!(overlay.get(0, 1), color);
        assert_eq!(overlay.get(1, 0), [0, 0, 0]);
    }
}

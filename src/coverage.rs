//! Coverage of a rectangular grid cell by a binary mask.
//!
//! The ratio is `foreground pixels inside the cell / cell area`. The cell is
//! its own reference footprint, so this is the fraction of the cell covered
//! by the mask rather than a symmetric IoU between mask and cell.

use crate::grid::CellBounds;
use crate::image::ImageView;

/// Number of non-zero pixels of `mask` inside `region` (clipped to the mask).
pub fn foreground_count<I>(mask: &I, region: CellBounds) -> usize
where
    I: ImageView<Pixel = u8>,
{
    let region = region.clamp_to(mask.size());
    if region.is_empty() {
        return 0;
    }
    (region.y1..region.y2)
        .map(|y| {
            mask.row(y)[region.x1..region.x2]
                .iter()
                .filter(|&&v| v != 0)
                .count()
        })
        .sum()
}

/// Fraction of `region` covered by foreground pixels of `mask`, in `[0, 1]`.
///
/// A region with zero area after clipping contains no foreground and yields
/// `0.0`.
pub fn coverage<I>(mask: &I, region: CellBounds) -> f64
where
    I: ImageView<Pixel = u8>,
{
    let clipped = region.clamp_to(mask.size());
    let area = clipped.area();
    if area == 0 {
        return 0.0;
    }
    foreground_count(mask, clipped) as f64 / area as f64
}

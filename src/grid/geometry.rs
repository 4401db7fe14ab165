use crate::error::{Error, Result};
use crate::image::ImageSize;
use serde::{Deserialize, Serialize};

/// Half-open pixel rectangle `[x1, x2) × [y1, y2)` covered by one grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBounds {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl CellBounds {
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.x2.saturating_sub(self.x1)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.y2.saturating_sub(self.y1)
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Intersect with the image rectangle, mirroring array slicing where
    /// out-of-range bounds are silently clipped.
    pub fn clamp_to(&self, size: ImageSize) -> Self {
        let x2 = self.x2.min(size.width);
        let y2 = self.y2.min(size.height);
        Self {
            x1: self.x1.min(x2),
            y1: self.y1.min(y2),
            x2,
            y2,
        }
    }
}

/// Number of cells of a `grid_dim × grid_dim` grid.
///
/// Fails for a zero grid and for grids whose cell count does not fit in
/// `usize`.
pub fn grid_cell_count(grid_dim: usize) -> Result<usize> {
    match grid_dim.checked_mul(grid_dim) {
        Some(count) if count > 0 => Ok(count),
        _ => Err(Error::InvalidGeometry { index: 0, grid_dim }),
    }
}

/// Map a flat row-major cell index of a `grid_dim × grid_dim` grid to the
/// pixel bounds of that cell.
///
/// Cell sizes are computed in floating point and every bound is truncated
/// toward zero, with `x2`/`y2` derived from the already truncated `x1`/`y1`.
/// When `grid_dim` divides the image size the cells tile it exactly.
/// Otherwise a cell may end one pixel before its right (or lower) neighbour
/// starts, and the trailing cells end short of the border. Pixels in those
/// gaps belong to no cell.
pub fn segment_to_bbox(index: usize, grid_dim: usize, image_size: ImageSize) -> Result<CellBounds> {
    if index >= grid_cell_count(grid_dim)? {
        return Err(Error::InvalidGeometry { index, grid_dim });
    }

    let cell_w = image_size.width as f64 / grid_dim as f64;
    let cell_h = image_size.height as f64 / grid_dim as f64;
    let col = (index % grid_dim) as f64;
    let row = (index / grid_dim) as f64;

    let x1 = (col * cell_w) as usize;
    let y1 = (row * cell_h) as usize;
    let x2 = (x1 as f64 + cell_w) as usize;
    let y2 = (y1 as f64 + cell_h) as usize;

    Ok(CellBounds { x1, y1, x2, y2 })
}

/// Uniform `grid_dim × grid_dim` partition of one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub grid_dim: usize,
    pub image_size: ImageSize,
}

impl GridLayout {
    pub fn new(grid_dim: usize, image_size: ImageSize) -> Result<Self> {
        grid_cell_count(grid_dim)?;
        Ok(Self {
            grid_dim,
            image_size,
        })
    }

    pub fn cell_count(&self) -> Result<usize> {
        grid_cell_count(self.grid_dim)
    }

    pub fn bbox(&self, index: usize) -> Result<CellBounds> {
        segment_to_bbox(index, self.grid_dim, self.image_size)
    }

    /// All cells in flat index order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, CellBounds)> + '_ {
        (0..self.cell_count().unwrap_or(0))
            .filter_map(move |idx| self.bbox(idx).ok().map(|b| (idx, b)))
    }
}

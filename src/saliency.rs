//! Ranked saliency segments produced by an external saliency generator.
//!
//! Each segment names a grid cell by its flat row-major index, its
//! saliency rank (1 = most salient) and an information value such as the
//! entropy of the cell. The sequence is usually ordered by rank, but the
//! cell geometry is always derived from `index`, never from the position of
//! a segment within the sequence.

use crate::error::{Error, Result};
use crate::grid::grid_cell_count;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_GRID_DIM: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaliencySegment {
    /// Flat row-major cell index: `row * grid_dim + col`.
    pub index: usize,
    /// 1-based saliency rank.
    pub rank: u32,
    /// Non-negative information content of the cell (e.g. entropy).
    pub information: f64,
}

impl SaliencySegment {
    pub fn new(index: usize, rank: u32, information: f64) -> Self {
        Self {
            index,
            rank,
            information,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaliencyRanking {
    pub grid_dim: usize,
    pub segments: Vec<SaliencySegment>,
}

impl SaliencyRanking {
    pub fn new(grid_dim: usize, segments: Vec<SaliencySegment>) -> Self {
        Self { grid_dim, segments }
    }

    /// Check the ranking is usable for attribution: a non-zero grid, cell
    /// indices inside the grid, unique positive ranks and finite
    /// non-negative information values.
    pub fn validate(&self) -> Result<()> {
        let cells = grid_cell_count(self.grid_dim)?;
        let mut ranks = BTreeSet::new();
        for seg in &self.segments {
            if seg.index >= cells {
                return Err(Error::InvalidGeometry {
                    index: seg.index,
                    grid_dim: self.grid_dim,
                });
            }
            if seg.rank == 0 {
                return Err(Error::InvalidRanking(format!(
                    "segment {} has rank 0; ranks are 1-based",
                    seg.index
                )));
            }
            if !ranks.insert(seg.rank) {
                return Err(Error::InvalidRanking(format!(
                    "rank {} assigned more than once",
                    seg.rank
                )));
            }
            if !seg.information.is_finite() || seg.information < 0.0 {
                return Err(Error::InvalidRanking(format!(
                    "segment {} has invalid information value {}",
                    seg.index, seg.information
                )));
            }
        }
        Ok(())
    }

    /// Segments sorted by ascending rank.
    pub fn by_rank(&self) -> Vec<SaliencySegment> {
        let mut sorted = self.segments.clone();
        sorted.sort_by_key(|s| s.rank);
        sorted
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

//! Uniform grid partition used by saliency segments.
//!
//! A saliency generator splits the image into `grid_dim × grid_dim` cells
//! addressed by a flat row-major index (`index = row * grid_dim + col`).
//! [`segment_to_bbox`] turns that index into pixel bounds; the ranking
//! assigned to a cell never participates in the geometry.

pub mod geometry;

pub use geometry::{grid_cell_count, segment_to_bbox, CellBounds, GridLayout};

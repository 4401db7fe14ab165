//! Reports produced by the ranker.
//!
//! [`RankingReport`] is the main entry point: the per-mask ranking, the raw
//! attribution, the colour legend and a [`TimingBreakdown`] of the stages
//! that ran.

pub mod report;
pub mod timing;

pub use report::{InputDescriptor, RankedMask, RankingReport};
pub use timing::{StageTiming, TimingBreakdown};

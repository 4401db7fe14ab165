use super::TimingBreakdown;
use crate::attribution::{Attribution, AttributionParams};
use crate::coco::class_name;
use crate::detections::{DetectionSet, MaskId};
use crate::palette::{LegendEntry, RankPalette};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub detections: usize,
    /// Detections left out by the score filter.
    pub skipped: usize,
    pub segments: usize,
    pub grid_dim: usize,
}

/// Ranking outcome for one detection. `rank` and the evidence fields are
/// `None` for masks that matched no segment.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMask {
    pub id: MaskId,
    pub class_id: u32,
    pub class_name: Option<&'static str>,
    pub score: f32,
    pub rank: Option<u32>,
    pub segment_index: Option<usize>,
    pub coverage: Option<f64>,
    pub information: Option<f64>,
    pub matched_segments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
}

/// Result of [`MaskRanker::rank`](crate::MaskRanker::rank).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingReport {
    pub input: InputDescriptor,
    pub params: AttributionParams,
    /// Ranked masks by ascending rank, then unranked masks by id.
    pub masks: Vec<RankedMask>,
    pub attribution: Attribution,
    pub legend: Vec<LegendEntry>,
    pub timings: TimingBreakdown,
}

impl RankingReport {
    pub(crate) fn summarize_masks<M>(
        detections: &DetectionSet,
        kept: &BTreeMap<MaskId, M>,
        attribution: &Attribution,
        palette: &RankPalette,
    ) -> Vec<RankedMask> {
        let mut masks: Vec<RankedMask> = detections
            .detections
            .iter()
            .filter(|det| kept.contains_key(&det.id))
            .map(|det| {
                let best = attribution.best.get(&det.id);
                RankedMask {
                    id: det.id,
                    class_id: det.class_id,
                    class_name: class_name(det.class_id),
                    score: det.score,
                    rank: best.map(|m| m.rank),
                    segment_index: best.map(|m| m.segment_index),
                    coverage: best.map(|m| m.coverage),
                    information: best.map(|m| m.information),
                    matched_segments: attribution.matches.get(&det.id).map_or(0, Vec::len),
                    color: best.and_then(|m| palette.color(m.rank)),
                }
            })
            .collect();
        // `None` sorts before `Some`, so key unranked masks past every rank.
        masks.sort_by_key(|m| (m.rank.is_none(), m.rank, m.id));
        masks
    }

    pub fn ranked(&self) -> impl Iterator<Item = &RankedMask> {
        self.masks.iter().filter(|m| m.rank.is_some())
    }

    pub fn unranked(&self) -> impl Iterator<Item = &RankedMask> {
        self.masks.iter().filter(|m| m.rank.is_none())
    }

    pub fn print_text_summary(&self) {
        println!("Mask saliency ranking");
        println!(
            "  image: {}x{} detections={} skipped={} segments={} grid={}x{} threshold={:.2}",
            self.input.width,
            self.input.height,
            self.input.detections,
            self.input.skipped,
            self.input.segments,
            self.input.grid_dim,
            self.input.grid_dim,
            self.params.threshold
        );
        for m in &self.masks {
            let name = m.class_name.unwrap_or("?");
            match m.rank {
                Some(rank) => println!(
                    "  rank {:>3}  mask {:<5} {:<16} score={:.3} cell={} coverage={} info={} matches={}",
                    rank,
                    m.id,
                    name,
                    m.score,
                    format_opt(m.segment_index.map(|i| i as f64), 0),
                    format_opt(m.coverage, 3),
                    format_opt(m.information, 3),
                    m.matched_segments
                ),
                None => println!(
                    "  unranked  mask {:<5} {:<16} score={:.3}",
                    m.id, name, m.score
                ),
            }
        }
        let stages: Vec<String> = self
            .timings
            .stages
            .iter()
            .map(|s| format!("{}={:.3}", s.label, s.elapsed_ms))
            .collect();
        println!(
            "\nTimings (ms): {} total={:.3}",
            stages.join(" "),
            self.timings.total_ms
        );
    }
}

fn format_opt(val: Option<f64>, precision: usize) -> String {
    val.map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

mod common;

use common::synthetic::{mask_over_cells, ranking_from_ranks};
use mask_saliency::config::rank::load_config;
use mask_saliency::image::io::{read_json_file, save_rgb8, write_json_file};
use mask_saliency::image::{ImageRgb8, ImageU8, ImageView, MaskU8};
use mask_saliency::sources::{
    DetectionEntry, DetectionFile, DetectionManifest, InstanceDetector, SaliencyFile,
    SaliencySource,
};
use mask_saliency::{
    AttributionParams, DetectionSet, Error, ImageSize, MaskId, MaskRanker, RankerParams,
    SaliencyRanking,
};
use std::cell::Cell;
use std::path::PathBuf;

const SIZE: ImageSize = ImageSize {
    height: 16,
    width: 16,
};

/// 4x4 grid of 4x4-pixel cells; rank of cell `i` is `16 - i`, so the
/// bottom-right cell is the most salient.
fn reverse_ranking() -> SaliencyRanking {
    let ranks: Vec<u32> = (0..16).map(|i| 16 - i as u32).collect();
    ranking_from_ranks(4, &ranks)
}

fn sample_detections() -> DetectionSet {
    let mut set = DetectionSet::new(SIZE);
    set.push(1, 0.99, mask_over_cells(4, SIZE, &[0, 1])); // ranks 16, 15
    set.push(17, 0.80, mask_over_cells(4, SIZE, &[14, 15])); // ranks 2, 1
    set.push(3, 0.40, mask_over_cells(4, SIZE, &[5])); // rank 11
    set.push(62, 0.95, MaskU8::with_size(SIZE)); // nothing
    set
}

fn ranker(threshold: f64) -> MaskRanker {
    MaskRanker::new(RankerParams {
        attribution: AttributionParams::new(4, threshold),
        ..Default::default()
    })
}

#[test]
fn report_orders_masks_by_rank_with_unranked_last() {
    let _ = env_logger::builder().is_test(true).try_init();
    let report = ranker(0.6)
        .rank(&sample_detections(), &reverse_ranking())
        .unwrap();

    let order: Vec<(MaskId, Option<u32>)> = report.masks.iter().map(|m| (m.id, m.rank)).collect();
    assert_eq!(
        order,
        vec![
            (MaskId(1), Some(1)),
            (MaskId(2), Some(11)),
            (MaskId(0), Some(15)),
            (MaskId(3), None),
        ]
    );

    let dog = &report.masks[0];
    assert_eq!(dog.class_name, Some("dog"));
    assert_eq!(dog.segment_index, Some(15));
    assert_eq!(dog.matched_segments, 2);
    assert_eq!(dog.coverage, Some(1.0));
    assert!(dog.color.is_some());

    assert_eq!(report.ranked().count(), 3);
    assert_eq!(report.unranked().count(), 1);
    assert_eq!(report.legend.len(), 3);
    assert_eq!(report.input.skipped, 0);
    assert!(report.timings.stage_ms("attribution").is_some());
}

#[test]
fn min_score_leaves_weak_detections_out() {
    let params = RankerParams {
        attribution: AttributionParams::new(4, 0.6),
        min_score: 0.5,
    };
    let report = MaskRanker::new(params)
        .rank(&sample_detections(), &reverse_ranking())
        .unwrap();
    assert_eq!(report.input.skipped, 1);
    assert!(report.masks.iter().all(|m| m.id != MaskId(2)));
    assert!(!report.attribution.is_ranked(MaskId(2)));
}

#[test]
fn grid_mismatch_and_bad_ranking_are_rejected() {
    let mut r = ranker(0.6);
    r.set_grid_dim(8);
    assert!(matches!(
        r.rank(&sample_detections(), &reverse_ranking()),
        Err(Error::InvalidRanking(_))
    ));

    let mut dup = reverse_ranking();
    dup.segments[1].rank = dup.segments[0].rank;
    assert!(matches!(
        ranker(0.6).rank(&sample_detections(), &dup),
        Err(Error::InvalidRanking(_))
    ));

    let mut r = ranker(0.6);
    r.set_threshold(-0.1);
    assert!(matches!(
        r.rank(&sample_detections(), &reverse_ranking()),
        Err(Error::Config(_))
    ));
}

#[test]
fn empty_detections_give_an_empty_report() {
    let report = ranker(0.6)
        .rank(&DetectionSet::new(SIZE), &reverse_ranking())
        .unwrap();
    assert!(report.masks.is_empty());
    assert!(report.attribution.best.is_empty());
    assert!(report.legend.is_empty());
}

struct FixedDetector {
    calls: Cell<usize>,
}

impl InstanceDetector for FixedDetector {
    fn detect(&self, image: &ImageU8<'_>) -> mask_saliency::Result<DetectionSet> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(image.size(), SIZE);
        Ok(sample_detections())
    }
}

struct FixedSaliency;

impl SaliencySource for FixedSaliency {
    fn rank_segments(
        &self,
        _image: &ImageU8<'_>,
        grid_dim: usize,
    ) -> mask_saliency::Result<SaliencyRanking> {
        assert_eq!(grid_dim, 4);
        Ok(reverse_ranking())
    }
}

struct FailingSaliency;

impl SaliencySource for FailingSaliency {
    fn rank_segments(
        &self,
        _image: &ImageU8<'_>,
        _grid_dim: usize,
    ) -> mask_saliency::Result<SaliencyRanking> {
        Err(Error::Config("saliency service unavailable".to_string()))
    }
}

#[test]
fn rank_image_drives_injected_collaborators() {
    let frame = vec![0u8; SIZE.area()];
    let image = ImageU8::packed(SIZE.width, SIZE.height, &frame);
    let detector = FixedDetector {
        calls: Cell::new(0),
    };

    let report = ranker(0.6)
        .rank_image(&detector, &FixedSaliency, &image)
        .unwrap();
    assert_eq!(detector.calls.get(), 1);
    assert_eq!(report.masks[0].rank, Some(1));
    let labels: Vec<&str> = report
        .timings
        .stages
        .iter()
        .map(|s| s.label.as_str())
        .collect();
    assert_eq!(&labels[..2], &["detect", "saliency"]);

    let err = ranker(0.6)
        .rank_image(&detector, &FailingSaliency, &image)
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn file_backed_run_produces_report_and_overlay() {
    let dir = tempfile::tempdir().expect("tempdir");
    let detections = sample_detections();

    let mut entries = Vec::new();
    for det in &detections.detections {
        let rel = PathBuf::from(format!("masks/{}.png", det.id.0));
        let mut rgb = ImageRgb8::new(SIZE);
        for (px, &m) in rgb.data.iter_mut().zip(&det.mask.data) {
            if m != 0 {
                *px = [255, 255, 255];
            }
        }
        save_rgb8(&rgb, &dir.path().join(&rel)).unwrap();
        entries.push(DetectionEntry {
            id: det.id,
            class_id: det.class_id,
            score: det.score,
            mask: rel,
        });
    }
    let manifest = DetectionManifest {
        image_size: SIZE,
        detections: entries,
    };
    write_json_file(&dir.path().join("detections.json"), &manifest).unwrap();
    write_json_file(&dir.path().join("saliency.json"), &reverse_ranking()).unwrap();
    std::fs::write(
        dir.path().join("rank.json"),
        r#"{"detections": "detections.json", "saliency": "saliency.json",
            "params": {"gridDim": 4, "threshold": 0.6}}"#,
    )
    .unwrap();

    let config = load_config(&dir.path().join("rank.json")).unwrap();
    let loaded = DetectionFile::new(&config.detections).load().unwrap();
    let saliency = SaliencyFile::new(&config.saliency).load().unwrap();
    assert_eq!(loaded.len(), 4);

    let ranker = MaskRanker::new(config.params.clone());
    let report = ranker.rank(&loaded, &saliency).unwrap();
    let expected = ranker.rank(&detections, &reverse_ranking()).unwrap();
    assert_eq!(report.masks, expected.masks);

    let json_path = dir.path().join("out/report.json");
    write_json_file(&json_path, &report).unwrap();
    let json: serde_json::Value = read_json_file(&json_path).unwrap();
    assert_eq!(json["masks"][0]["rank"], 1);
    assert_eq!(json["masks"][0]["classId"], 17);
    assert_eq!(json["params"]["gridDim"], 4);
    assert!(json["masks"][3]["rank"].is_null());

    let overlay = ranker.overlay(&loaded, &report);
    let top_color = report.masks[0].color.unwrap();
    assert_eq!(overlay.get(15, 15), top_color);
    assert_eq!(overlay.get(0, 15), [0, 0, 0]);
    save_rgb8(&overlay, &dir.path().join("out/overlay.png")).unwrap();
}

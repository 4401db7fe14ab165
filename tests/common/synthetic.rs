use mask_saliency::grid::GridLayout;
use mask_saliency::image::MaskU8;
use mask_saliency::{ImageSize, SaliencyRanking, SaliencySegment};

/// Ranking where cell `index` gets `rank = ranks[index]` and an information
/// value that decreases with rank.
pub fn ranking_from_ranks(grid_dim: usize, ranks: &[u32]) -> SaliencyRanking {
    assert_eq!(ranks.len(), grid_dim * grid_dim, "one rank per cell");
    let mut segments: Vec<SaliencySegment> = ranks
        .iter()
        .enumerate()
        .map(|(index, &rank)| SaliencySegment::new(index, rank, 8.0 / rank as f64))
        .collect();
    segments.sort_by_key(|s| s.rank);
    SaliencyRanking::new(grid_dim, segments)
}

/// Ranking with a fixed pseudo-random permutation of `1..=grid_dim²`.
pub fn scrambled_ranking(grid_dim: usize) -> SaliencyRanking {
    let n = grid_dim * grid_dim;
    // 7 is coprime with every square grid size used in the tests.
    let ranks: Vec<u32> = (0..n).map(|i| ((i * 7 + 3) % n) as u32 + 1).collect();
    ranking_from_ranks(grid_dim, &ranks)
}

/// Mask covering exactly the listed grid cells.
pub fn mask_over_cells(grid_dim: usize, size: ImageSize, cells: &[usize]) -> MaskU8 {
    let layout = GridLayout::new(grid_dim, size).expect("valid grid");
    let mut mask = MaskU8::with_size(size);
    for &cell in cells {
        let b = layout.bbox(cell).expect("cell inside grid");
        mask.fill_rect(b.x1, b.y1, b.x2, b.y2);
    }
    mask
}

/// Filled disc, a rough stand-in for a blob-shaped instance mask.
pub fn disc_mask(size: ImageSize, cx: f64, cy: f64, radius: f64) -> MaskU8 {
    MaskU8::from_fn(size.width, size.height, |x, y| {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        dx * dx + dy * dy <= radius * radius
    })
}

use backdrop::chain::{self, KEY_QUANTUM, MIN_CHAIN_POINTS, point_key};
use backdrop::contour::{
    self, EDGE_TABLE, Edge, MASK_BOTTOM_LEFT, MASK_BOTTOM_RIGHT, MASK_TOP_LEFT, MASK_TOP_RIGHT,
    Segment,
};
use backdrop::field::{GridCell, ScalarField};
use backdrop::noise::Noise3;

fn cell(tl: f32, tr: f32, br: f32, bl: f32) -> GridCell {
    GridCell {
        x: 0.0,
        y: 0.0,
        top_left: tl,
        top_right: tr,
        bottom_right: br,
        bottom_left: bl,
    }
}

fn field(cols: usize, rows: usize, cell_size: f32, values: Vec<f32>) -> ScalarField {
    assert_eq!(values.len(), cols * rows);
    ScalarField {
        cols,
        rows,
        cell_size,
        values,
    }
}

/// Edges whose two corners disagree for a given mask.
fn crossed_edges(mask: u8) -> Vec<Edge> {
    let tl = mask & MASK_TOP_LEFT != 0;
    let tr = mask & MASK_TOP_RIGHT != 0;
    let br = mask & MASK_BOTTOM_RIGHT != 0;
    let bl = mask & MASK_BOTTOM_LEFT != 0;
    let mut out = Vec::new();
    if tl != tr {
        out.push(Edge::Top);
    }
    if tr != br {
        out.push(Edge::Right);
    }
    if br != bl {
        out.push(Edge::Bottom);
    }
    if bl != tl {
        out.push(Edge::Left);
    }
    out
}

fn noise_field(seed: u64, w: f32, h: f32, t: f32) -> ScalarField {
    ScalarField::sample(&Noise3::from_seed(seed), w, h, 6.0, 0.0036, t)
}

#[test]
fn edge_table_covers_exactly_the_crossed_edges() {
    for mask in 0u8..16 {
        let pairs = EDGE_TABLE[mask as usize];
        let expected_segments = match mask {
            0 | 15 => 0,
            5 | 10 => 2,
            _ => 1,
        };
        assert_eq!(pairs.len(), expected_segments, "mask {mask}");

        let mut used: Vec<Edge> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        for &(a, b) in pairs {
            assert_ne!(a, b, "mask {mask} joins an edge to itself");
        }
        let mut crossed = crossed_edges(mask);
        used.sort_by_key(|e| *e as u8);
        crossed.sort_by_key(|e| *e as u8);
        assert_eq!(used, crossed, "mask {mask}");
    }
}

#[test]
fn mask_uses_strictly_greater_than() {
    let c = cell(0.5, 0.6, 0.4, 0.5);
    assert_eq!(contour::cell_mask(&c, 0.5), MASK_TOP_RIGHT);
    assert_eq!(contour::cell_mask(&cell(1.0, 1.0, 1.0, 1.0), 0.5), 15);
    assert_eq!(contour::cell_mask(&cell(0.0, 0.0, 0.0, 0.0), 0.5), 0);
}

#[test]
fn saddles_emit_two_disjoint_segments() {
    for (c, mask) in [
        (cell(0.0, 1.0, 0.0, 1.0), 5u8),
        (cell(1.0, 0.0, 1.0, 0.0), 10u8),
    ] {
        assert_eq!(contour::cell_mask(&c, 0.5), mask);
        let mut out = Vec::new();
        contour::cell_segments(&c, 10.0, 0.5, &mut out);
        assert_eq!(out.len(), 2, "mask {mask}");
        let keys_a = [point_key(out[0].start()), point_key(out[0].end())];
        let keys_b = [point_key(out[1].start()), point_key(out[1].end())];
        assert!(keys_a.iter().all(|k| !keys_b.contains(k)), "mask {mask} segments touch");
    }
}

#[test]
fn crossing_is_linearly_interpolated() {
    let c = GridCell {
        x: 12.0,
        y: 18.0,
        top_left: 0.0,
        top_right: 1.0,
        bottom_right: 1.0,
        bottom_left: 0.0,
    };
    // Mask 6: top-right and bottom-right in, a vertical crossing at 25%.
    let mut out = Vec::new();
    contour::cell_segments(&c, 6.0, 0.25, &mut out);
    assert_eq!(out.len(), 1);
    let s = out[0];
    assert!((s.x1 - 13.5).abs() < 1e-5 && (s.y1 - 18.0).abs() < 1e-5);
    assert!((s.x2 - 13.5).abs() < 1e-5 && (s.y2 - 24.0).abs() < 1e-5);
}

#[test]
fn shared_edges_produce_identical_points() {
    // Two horizontally adjacent cells share the vertical edge at x = 10.
    let left = GridCell {
        x: 0.0,
        y: 0.0,
        top_left: 0.1,
        top_right: 0.9,
        bottom_right: 0.2,
        bottom_left: 0.3,
    };
    let right = GridCell {
        x: 10.0,
        y: 0.0,
        top_left: 0.9,
        top_right: 0.4,
        bottom_right: 0.1,
        bottom_left: 0.2,
    };
    let a = contour::edge_point(&left, Edge::Right, 10.0, 0.5);
    let b = contour::edge_point(&right, Edge::Left, 10.0, 0.5);
    assert_eq!(a.0.to_bits(), b.0.to_bits());
    assert_eq!(a.1.to_bits(), b.1.to_bits());
}

#[test]
fn non_finite_crossings_are_skipped() {
    let c = cell(f32::NAN, 1.0, 1.0, 0.0);
    let mut out = Vec::new();
    contour::cell_segments(&c, 6.0, 0.5, &mut out);
    assert!(out.iter().all(Segment::is_finite));
    assert!(out.is_empty());

    let f = field(2, 2, 6.0, vec![f32::INFINITY, 0.0, 0.0, 0.0]);
    let segs = contour::extract(&f, 0.5);
    assert!(segs.iter().all(Segment::is_finite));
}

#[test]
fn thresholds_are_evenly_spaced_and_inclusive() {
    let levels = contour::thresholds(24, -0.42, 0.42);
    assert_eq!(levels.len(), 24);
    assert!((levels[0] + 0.42).abs() < 1e-6);
    assert!((levels[23] - 0.42).abs() < 1e-5);
    let step = levels[1] - levels[0];
    for pair in levels.windows(2) {
        assert!(((pair[1] - pair[0]) - step).abs() < 1e-5);
    }
    assert!(contour::thresholds(0, -1.0, 1.0).is_empty());
    assert_eq!(contour::thresholds(1, -1.0, 1.0), vec![0.0]);
}

#[test]
fn single_peak_closes_into_a_ring() {
    let f = field(
        3,
        3,
        10.0,
        vec![
            0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0,
        ],
    );
    let segs = contour::extract(&f, 0.5);
    assert_eq!(segs.len(), 4);

    let chains = chain::chains(&segs);
    assert_eq!(chains.len(), 1);
    let ring = &chains[0];
    assert!(ring.closed);
    assert_eq!(ring.points.len(), 4);
    let mut ids = ring.segments.clone();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn open_line_is_walked_in_both_directions() {
    // Seed in the middle so the walk has to extend from both ends.
    let segs = vec![
        Segment { x1: 1.0, y1: 0.0, x2: 2.0, y2: 0.0 },
        Segment { x1: 0.0, y1: 0.0, x2: 1.0, y2: 0.0 },
        Segment { x1: 2.0, y1: 0.0, x2: 3.0, y2: 0.0 },
    ];
    let assembly = chain::assemble(&segs);
    assert_eq!(assembly.consumed, 3);
    assert_eq!(assembly.chains.len(), 1);
    let c = &assembly.chains[0];
    assert!(!c.closed);
    assert_eq!(c.points, vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    assert_eq!(c.segments, vec![1, 0, 2]);
}

#[test]
fn nearly_equal_endpoints_are_joined() {
    let eps = KEY_QUANTUM * 0.2;
    let segs = vec![
        Segment { x1: 0.0, y1: 0.0, x2: 5.0, y2: 5.0 },
        Segment { x1: 5.0 + eps, y1: 5.0 - eps, x2: 9.0, y2: 5.0 },
    ];
    let chains = chain::chains(&segs);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].points.len(), 3);
}

#[test]
fn short_chains_are_dropped_but_still_consumed() {
    let segs = vec![
        Segment { x1: 0.0, y1: 0.0, x2: 1.0, y2: 1.0 },
        Segment { x1: 50.0, y1: 50.0, x2: 51.0, y2: 50.0 },
        Segment { x1: 51.0, y1: 50.0, x2: 52.0, y2: 51.0 },
    ];
    let assembly = chain::assemble(&segs);
    assert_eq!(assembly.consumed, 3);
    assert_eq!(assembly.chains.len(), 2);

    let kept = chain::chains(&segs);
    assert_eq!(kept.len(), 1);
    assert!(kept.iter().all(|c| c.points.len() >= MIN_CHAIN_POINTS));
}

#[test]
fn every_segment_is_consumed_exactly_once_on_noise_fields() {
    for seed in [1u64, 17, 4242] {
        let f = noise_field(seed, 420.0, 260.0, seed as f32 * 0.3);
        for level in contour::thresholds(24, -0.42, 0.42) {
            let segs = contour::extract(&f, level);
            let assembly = chain::assemble(&segs);
            assert_eq!(assembly.consumed, segs.len(), "seed {seed} level {level}");

            let mut hits = vec![0u32; segs.len()];
            for c in &assembly.chains {
                for &id in &c.segments {
                    hits[id as usize] += 1;
                }
            }
            assert!(hits.iter().all(|&h| h == 1), "seed {seed} level {level}");

            for c in chain::chains(&segs) {
                assert!(c.points.len() >= MIN_CHAIN_POINTS);
                for pair in c.points.windows(2) {
                    assert_ne!(point_key(pair[0]), point_key(pair[1]));
                }
            }
        }
    }
}

#[test]
fn mid_level_of_a_noise_field_has_contours() {
    let f = noise_field(9, 640.0, 360.0, 0.0);
    let (lo, hi) = f.range().expect("non-empty field");
    let mid = (lo + hi) * 0.5;
    let segs = contour::extract(&f, mid);
    assert!(!segs.is_empty());
    assert!(!chain::chains(&segs).is_empty());
}

#[test]
fn empty_field_yields_nothing() {
    let f = ScalarField::default();
    assert!(contour::extract(&f, 0.0).is_empty());
    assert!(chain::assemble(&[]).chains.is_empty());
}

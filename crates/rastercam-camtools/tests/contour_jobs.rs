use proptest::prelude::*;
use rastercam_camtools::{sort_paths, CamPipeline, CutPath};
use rastercam_core::{Lattice, OccupancyLattice, Path, Point3};
use rastercam_settings::JobSettings;
use std::ops::Range;

fn block(ni: usize, nj: usize, cols: Range<usize>, rows: Range<usize>) -> OccupancyLattice {
    Lattice::from_fn(ni, nj, |i, j| cols.contains(&i) && rows.contains(&j))
}

fn pipeline(offsets: i32) -> CamPipeline {
    let mut settings = JobSettings::new();
    settings.raster.pixels_per_mm = 1.0;
    settings.distance.threads = 3;
    settings.contour.bit_diameter = 3.0;
    settings.contour.offsets = offsets;
    settings.contour.overlap = 0.5;
    CamPipeline::new(settings).unwrap()
}

#[test]
fn test_offsets_around_block_cut_inside_out() {
    let occupancy = block(30, 30, 10..20, 10..20);
    let paths = pipeline(3).contours(&occupancy).unwrap();

    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.closed));

    let widths: Vec<f32> = paths.iter().map(|p| p.bounds().unwrap().width()).collect();
    assert!(widths[0] < widths[1] && widths[1] < widths[2], "{:?}", widths);
    for pair in paths.windows(2) {
        let inner = pair[0].bounds().unwrap();
        let outer = pair[1].bounds().unwrap();
        assert!(inner.is_within(&outer));
    }
}

#[test]
fn test_rings_keep_their_offset() {
    let occupancy = block(30, 30, 10..20, 10..20);
    let paths = pipeline(1).contours(&occupancy).unwrap();
    assert_eq!(paths.len(), 1);

    // Straight sides sit 1.5 mm outside the occupied cell centers
    let bounds = paths[0].bounds().unwrap();
    assert!((bounds.xmin - (10.5 - 1.5)).abs() < 0.1, "{:?}", bounds);
    assert!((bounds.xmax - (19.5 + 1.5)).abs() < 0.1, "{:?}", bounds);
}

#[test]
fn test_two_islands_each_get_contours() {
    let occupancy = Lattice::from_fn(40, 20, |i, j| {
        let first = (5..10).contains(&i) && (5..15).contains(&j);
        let second = (28..34).contains(&i) && (6..12).contains(&j);
        first || second
    });
    let paths = pipeline(1).contours(&occupancy).unwrap();
    assert_eq!(paths.len(), 2);
    // The nearer island is cut first
    assert!(paths[0].bounds().unwrap().xmax < paths[1].bounds().unwrap().xmin);
}

#[test]
fn test_blank_image_has_no_contours() {
    let occupancy: OccupancyLattice = Lattice::new(16, 16);
    let paths = pipeline(-1).contours(&occupancy).unwrap();
    assert!(paths.is_empty());
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Path {
    Path::closed(vec![
        Point3::xy(x, y),
        Point3::xy(x + w, y),
        Point3::xy(x + w, y + h),
        Point3::xy(x, y + h),
    ])
}

proptest! {
    #[test]
    fn contained_paths_come_first(
        boxes in prop::collection::vec((0u8..20, 0u8..20, 1u8..10, 1u8..10), 1..12)
    ) {
        let paths: Vec<Path> = boxes
            .iter()
            .map(|&(x, y, w, h)| rect(x as f32, y as f32, w as f32, h as f32))
            .collect();
        let order = sort_paths(&paths);

        let mut sorted = order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..paths.len()).collect::<Vec<_>>());

        let position: Vec<usize> = {
            let mut pos = vec![0; paths.len()];
            for (rank, &k) in order.iter().enumerate() {
                pos[k] = rank;
            }
            pos
        };
        for a in 0..paths.len() {
            for b in 0..paths.len() {
                let ba = CutPath::bounds(&paths[a]).unwrap();
                let bb = CutPath::bounds(&paths[b]).unwrap();
                if a != b && ba.is_within(&bb) && ba != bb {
                    prop_assert!(position[a] < position[b]);
                }
            }
        }
    }

    #[test]
    fn sequencing_is_deterministic(
        boxes in prop::collection::vec((0u8..20, 0u8..20, 1u8..10, 1u8..10), 0..10)
    ) {
        let paths: Vec<Path> = boxes
            .iter()
            .map(|&(x, y, w, h)| rect(x as f32, y as f32, w as f32, h as f32))
            .collect();
        prop_assert_eq!(sort_paths(&paths), sort_paths(&paths));
    }
}

use proptest::prelude::*;
use rastercam_core::{Path, Point3, VertexGraph};

fn build_open(graph: &mut VertexGraph, pts: &[(f32, f32)]) -> Vec<rastercam_core::VertexId> {
    let ids: Vec<_> = pts
        .iter()
        .enumerate()
        .map(|(slot, &(x, y))| graph.insert_at(slot, x, y))
        .collect();
    for pair in ids.windows(2) {
        graph.link(pair[0], pair[1]);
    }
    ids
}

#[test]
fn test_walk_simplify_detach_round() {
    // A noisy horizontal run followed by a sharp turn upwards
    let pts = [
        (0.0, 0.0),
        (1.0, 0.01),
        (2.0, 0.0),
        (3.0, -0.01),
        (4.0, 0.0),
        (4.0, 1.0),
        (4.0, 2.0),
    ];
    let mut graph = VertexGraph::with_slots(pts.len());
    let ids = build_open(&mut graph, &pts);

    let start = graph.backtrace(ids[5]);
    assert_eq!(start, ids[0]);

    let chain = graph.chain(start);
    assert_eq!(chain.len(), pts.len());

    let simplified = graph.decimate(&chain, 0.25);
    let path = graph.to_path(&simplified);
    graph.detach(&simplified);

    assert_eq!(
        path,
        Path::open(vec![
            Point3::xy(0.0, 0.0),
            Point3::xy(4.0, 0.0),
            Point3::xy(4.0, 2.0)
        ])
    );
    assert!((0..pts.len()).all(|s| graph.slot(s).is_none()));
}

proptest! {
    #[test]
    fn decimation_keeps_open_endpoints(
        pts in prop::collection::vec((-50.0f32..50.0, -50.0f32..50.0), 2..40),
        tolerance in 0.0f32..20.0,
    ) {
        let mut graph = VertexGraph::with_slots(pts.len());
        let ids = build_open(&mut graph, &pts);
        let chain = graph.chain(ids[0]);
        let simplified = graph.decimate(&chain, tolerance);

        prop_assert_eq!(simplified.ids.first(), ids.first());
        prop_assert_eq!(simplified.ids.last(), ids.last());
        prop_assert!(simplified.len() <= ids.len());

        // Survivors keep their original relative order
        let positions: Vec<usize> = simplified
            .ids
            .iter()
            .map(|id| ids.iter().position(|x| x == id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

        // Every slot still resolves to a surviving vertex
        for slot in 0..pts.len() {
            let held = graph.slot(slot).unwrap();
            prop_assert!(simplified.ids.contains(&held));
        }
    }
}

//! Cut-order sequencing.
//!
//! Orders paths so that anything lying inside another path's bounding box is
//! cut before it, and among the paths that are free to go next, picks the one
//! whose start is nearest the previous path's exit. The tool starts at the
//! origin.

use rastercam_core::{Bounds, Path, Point3};
use tracing::{debug, warn};

/// Anything the sequencer can order
pub trait CutPath {
    /// Where cutting begins
    fn start(&self) -> Option<Point3>;

    /// Where the tool is left once the path is cut
    fn exit(&self) -> Option<Point3>;

    /// Axis-aligned extent in the XY plane
    fn bounds(&self) -> Option<Bounds>;
}

impl CutPath for Path {
    fn start(&self) -> Option<Point3> {
        Path::start(self)
    }

    fn exit(&self) -> Option<Point3> {
        Path::exit(self)
    }

    fn bounds(&self) -> Option<Bounds> {
        Path::bounds(self)
    }
}

/// Whether path `j` must be cut before path `k`.
///
/// Containment is weak on all four sides. Paths with identical boxes contain
/// each other, so the lower index goes first.
fn precedes(j: usize, inner: &Bounds, k: usize, outer: &Bounds) -> bool {
    inner.is_within(outer) && (inner != outer || j < k)
}

/// Containment constraints: `pending[k]` counts the paths that must precede
/// `k`, and `unlocks[j]` lists the paths waiting on `j`.
fn constraints(bounds: &[Option<Bounds>]) -> (Vec<usize>, Vec<Vec<usize>>) {
    let n = bounds.len();
    let mut pending = vec![0usize; n];
    let mut unlocks = vec![Vec::new(); n];
    for (k, outer) in bounds.iter().enumerate() {
        let Some(outer) = outer else { continue };
        for (j, inner) in bounds.iter().enumerate() {
            if j == k {
                continue;
            }
            if let Some(inner) = inner {
                if precedes(j, inner, k, outer) {
                    pending[k] += 1;
                    unlocks[j].push(k);
                }
            }
        }
    }
    (pending, unlocks)
}

/// Squared travel from `from` to the start of a path; empty paths sort last
fn travel(from: Point3, start: Option<Point3>) -> f32 {
    start.map_or(f32::INFINITY, |s| s.distance_squared_xy(from.x, from.y))
}

/// Compute a cutting order, returned as indices into `paths`.
///
/// Every path whose bounding box lies within another's is placed before it,
/// and of two paths with identical boxes the lower index goes first. Among
/// unconstrained paths the nearest start wins, ties going to the lower index.
pub fn sort_paths<P: CutPath>(paths: &[P]) -> Vec<usize> {
    let n = paths.len();
    let bounds: Vec<Option<Bounds>> = paths.iter().map(CutPath::bounds).collect();
    let starts: Vec<Option<Point3>> = paths.iter().map(CutPath::start).collect();
    let (mut pending, unlocks) = constraints(&bounds);

    let mut done = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut position = Point3::default();

    while order.len() < n {
        let mut best: Option<(usize, f32)> = None;
        for k in (0..n).filter(|&k| !done[k] && pending[k] == 0) {
            let d = travel(position, starts[k]);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((k, d));
            }
        }

        let Some((k, _)) = best else {
            warn!("No unconstrained path among {} remaining", n - order.len());
            break;
        };
        done[k] = true;
        order.push(k);
        for &waiting in &unlocks[k] {
            pending[waiting] = pending[waiting].saturating_sub(1);
        }
        if let Some(exit) = paths[k].exit() {
            position = exit;
        }
    }

    debug!("Sequenced {} paths", order.len());
    order
}

/// Rearrange `items` into `order`.
///
/// Indices missing from `order` drop their item, and repeated indices are
/// taken once.
pub fn apply_order<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&k| slots.get_mut(k).and_then(Option::take))
        .collect()
}

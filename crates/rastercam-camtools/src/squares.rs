//! Marching-squares lookup tables
//!
//! A cell spans four lattice samples, numbered by their offset from the
//! cell's lower-left sample `(i, j)`: corner `v` sits at `(i + v / 2, j + v % 2)`.
//! Bit `v` of a case index is set when corner `v` is at or below the contour
//! level.
//!
//! Cell edges are numbered 0 (row `j`), 1 (row `j + 1`), 2 (column `i`) and
//! 3 (column `i + 1`). Segments are oriented so the below-level corners lie
//! on their left, which makes segments from neighbouring cells chain
//! head-to-tail.

/// Corner bit for a sample at or below the level
pub const CORNER_BITS: [u8; 4] = [1, 2, 4, 8];

/// Case index where every corner is below the level
pub const ALL_BELOW: u8 = 0xF;

/// The two corners bounding each edge
pub const VERTEX_MAP: [[u8; 2]; 4] = [[0, 2], [1, 3], [0, 1], [2, 3]];

/// Up to two directed segments per case, as `[from_edge, to_edge]`
pub const EDGE_MAP: [[Option<[u8; 2]>; 2]; 16] = [
    [None, None],
    [Some([0, 2]), None],
    [Some([2, 1]), None],
    [Some([0, 1]), None],
    [Some([3, 0]), None],
    [Some([3, 2]), None],
    [Some([2, 1]), Some([3, 0])],
    [Some([3, 1]), None],
    [Some([1, 3]), None],
    [Some([0, 2]), Some([1, 3])],
    [Some([2, 3]), None],
    [Some([0, 3]), None],
    [Some([1, 0]), None],
    [Some([1, 2]), None],
    [Some([2, 0]), None],
    [None, None],
];

/// Lattice offset `(di, dj)` of a corner
pub fn corner_offset(corner: u8) -> (usize, usize) {
    ((corner / 2) as usize, (corner % 2) as usize)
}

/// Edge-slot coordinates `(di, dj, orientation)` of a cell edge.
///
/// Orientation 0 is the horizontal edge leaving a sample along +i, 1 the
/// vertical edge leaving it along +j. Each interior edge is shared by two
/// cells and resolves to the same slot from both.
pub fn edge_slot(edge: u8) -> (usize, usize, usize) {
    ((edge == 3) as usize, (edge == 1) as usize, (edge / 2) as usize)
}

/// Case index for four samples against `level`
pub fn classify(samples: [f32; 4], level: f32) -> u8 {
    samples
        .iter()
        .zip(CORNER_BITS)
        .filter(|&(&s, _)| s <= level)
        .fold(0, |case, (_, bit)| case | bit)
}

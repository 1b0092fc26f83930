//! Euclidean Distance Transform
//!
//! Computes, for every cell of an occupancy lattice, the distance in
//! millimeters to the nearest occupied cell. Uses the two-pass linear-time
//! algorithm of Meijster, Roerdink and Hesselink (2000):
//!
//! 1. **Vertical pass** (per column): distance in cells to the nearest
//!    occupied cell in the same column.
//! 2. **Horizontal pass** (per row): lower envelope of the parabolas
//!    `(u - i)^2 + g(i)^2`, giving the exact squared Euclidean distance.
//!
//! Columns are independent in the first pass and rows in the second, so both
//! passes accept a sub-range and can be split across threads.

use rastercam_core::{DistanceField, Lattice, OccupancyLattice};
use rayon::prelude::*;
use std::ops::Range;
use tracing::debug;

/// Per-column vertical distances produced by the first pass.
///
/// Stored column-major so each column range is one contiguous slab.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalDistances {
    ni: usize,
    nj: usize,
    data: Vec<i64>,
}

impl VerticalDistances {
    /// Storage for an `ni x nj` lattice, every cell unset
    pub fn new(ni: usize, nj: usize) -> Self {
        Self {
            ni,
            nj,
            data: vec![0; ni * nj],
        }
    }

    /// Run the vertical pass over every column
    pub fn compute(occupancy: &OccupancyLattice) -> Self {
        let mut g = Self::new(occupancy.ni(), occupancy.nj());
        vertical_pass(occupancy, 0..occupancy.ni(), &mut g.data);
        g
    }

    /// Vertical distance (cells) at column `i`, row `j`
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.data[i * self.nj + j]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    /// Column-major storage, `nj` values per column
    pub fn as_mut_slice(&mut self) -> &mut [i64] {
        &mut self.data
    }
}

/// Value larger than any in-lattice distance, marking "nothing found yet"
fn sentinel(ni: usize, nj: usize) -> i64 {
    (ni + nj) as i64
}

/// First pass over the columns in `columns`.
///
/// `g` holds exactly those columns, column-major: column `i` occupies
/// `g[(i - columns.start) * nj..][..nj]`.
///
/// # Panics
///
/// Panics if `g` does not have `columns.len() * nj` entries or the range
/// exceeds the lattice width.
pub fn vertical_pass(occupancy: &OccupancyLattice, columns: Range<usize>, g: &mut [i64]) {
    let (ni, nj) = occupancy.shape();
    assert!(columns.end <= ni, "column range {:?} exceeds width {}", columns, ni);
    assert_eq!(g.len(), columns.len() * nj, "column slab has the wrong length");
    if nj == 0 {
        return;
    }

    let far = sentinel(ni, nj);
    for (col, i) in g.chunks_mut(nj).zip(columns) {
        col[0] = if occupancy[(i, 0)] { 0 } else { far };

        // Sweep down
        for j in 1..nj {
            col[j] = if occupancy[(i, j)] { 0 } else { col[j - 1] + 1 };
        }

        // Sweep up
        for j in (0..nj - 1).rev() {
            if col[j + 1] < col[j] {
                col[j] = col[j + 1] + 1;
            }
        }
    }
}

/// Squared distance from column `x` to the parabola rooted at column `i`
fn f_edt(x: usize, i: usize, g: &[i64]) -> i64 {
    let dx = x as i64 - i as i64;
    dx * dx + g[i] * g[i]
}

/// Last column at which the parabola at `i` is still no higher than the one
/// at `u` (`i < u`)
fn sep_edt(i: usize, u: usize, g: &[i64]) -> i64 {
    let (i, u) = (i as i64, u as i64);
    let (gi, gu) = (g[i as usize], g[u as usize]);
    (u * u - i * i + gu * gu - gi * gi).div_euclid(2 * (u - i))
}

/// Second pass over the rows in `rows`.
///
/// `out` holds exactly those rows, row-major: row `j` occupies
/// `out[(j - rows.start) * ni..][..ni]`. Values are written in millimeters.
///
/// # Panics
///
/// Panics if `pixels_per_mm` is not positive, if `out` does not have
/// `rows.len() * ni` entries, or if the range exceeds the lattice height.
pub fn horizontal_pass(
    g: &VerticalDistances,
    rows: Range<usize>,
    pixels_per_mm: f32,
    out: &mut [f32],
) {
    let (ni, nj) = g.shape();
    assert!(pixels_per_mm > 0.0, "pixels_per_mm must be > 0");
    assert!(rows.end <= nj, "row range {:?} exceeds height {}", rows, nj);
    assert_eq!(out.len(), rows.len() * ni, "row slab has the wrong length");
    if ni == 0 {
        return;
    }

    // Start column of each envelope segment, and the parabola that owns it
    let mut t = vec![0usize; ni];
    let mut s = vec![0usize; ni];
    let mut row = vec![0i64; ni];

    for (dst, j) in out.chunks_mut(ni).zip(rows) {
        for (i, value) in row.iter_mut().enumerate() {
            *value = g.get(i, j);
        }

        let mut q: isize = 0;
        s[0] = 0;
        t[0] = 0;
        for u in 1..ni {
            // Drop parabolas the new one undercuts at their segment start
            while q >= 0 && f_edt(t[q as usize], s[q as usize], &row) > f_edt(t[q as usize], u, &row)
            {
                q -= 1;
            }

            if q < 0 {
                q = 0;
                s[0] = u;
            } else {
                let w = 1 + sep_edt(s[q as usize], u, &row);
                if w < ni as i64 {
                    q += 1;
                    s[q as usize] = u;
                    t[q as usize] = w as usize;
                }
            }
        }

        for u in (0..ni).rev() {
            dst[u] = (f_edt(u, s[q as usize], &row) as f64).sqrt() as f32 / pixels_per_mm;
            if u == t[q as usize] {
                q -= 1;
            }
        }
    }
}

/// Distance transform of `occupancy`, in millimeters.
///
/// # Panics
///
/// Panics if `pixels_per_mm` is not positive.
pub fn distance_transform(occupancy: &OccupancyLattice, pixels_per_mm: f32) -> DistanceField {
    let (ni, nj) = occupancy.shape();
    let g = VerticalDistances::compute(occupancy);
    let mut field: DistanceField = Lattice::new(ni, nj);
    horizontal_pass(&g, 0..nj, pixels_per_mm, field.as_mut_slice());
    field
}

/// Split `0..n` into `parts` contiguous ranges at `t * n / parts`
pub fn partition(n: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    (0..parts)
        .map(|t| (t * n / parts)..((t + 1) * n / parts))
        .filter(|r| !r.is_empty())
        .collect()
}

/// Cut `data` into one mutable slab per range, `stride` values per index
fn split_slabs<'a, T>(
    mut data: &'a mut [T],
    ranges: &[Range<usize>],
    stride: usize,
) -> Vec<(&'a mut [T], Range<usize>)> {
    let mut slabs = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = data.split_at_mut(range.len() * stride);
        slabs.push((head, range.clone()));
        data = tail;
    }
    slabs
}

/// Distance transform with both passes split into `threads` ranges and run
/// on the rayon pool. Produces the same field as [`distance_transform`].
///
/// # Panics
///
/// Panics if `pixels_per_mm` is not positive.
pub fn distance_transform_parallel(
    occupancy: &OccupancyLattice,
    pixels_per_mm: f32,
    threads: usize,
) -> DistanceField {
    assert!(pixels_per_mm > 0.0, "pixels_per_mm must be > 0");
    let (ni, nj) = occupancy.shape();

    let column_ranges = partition(ni, threads);
    debug!(
        "Distance transform {}x{}: {} column ranges",
        ni,
        nj,
        column_ranges.len()
    );
    let mut g = VerticalDistances::new(ni, nj);
    split_slabs(g.as_mut_slice(), &column_ranges, nj)
        .into_par_iter()
        .for_each(|(slab, columns)| vertical_pass(occupancy, columns, slab));

    let row_ranges = partition(nj, threads);
    debug!("Distance transform: {} row ranges", row_ranges.len());
    let mut field: DistanceField = Lattice::new(ni, nj);
    split_slabs(field.as_mut_slice(), &row_ranges, ni)
        .into_par_iter()
        .for_each(|(slab, rows)| horizontal_pass(&g, rows, pixels_per_mm, slab));

    field
}

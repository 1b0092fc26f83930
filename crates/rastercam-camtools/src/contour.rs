//! Contour Assembler
//!
//! Extracts iso-contours from a distance field with marching squares. Every
//! cell edge crossing becomes exactly one vertex in a shared [`VertexGraph`]
//! slot table, so segments found independently in neighbouring cells chain
//! into continuous polylines without a separate merge step. The chains are
//! then walked, simplified and detached into owned [`Path`]s.

use crate::error::{CamToolResult, ParameterError, ParameterResult};
use crate::sequence::{apply_order, sort_paths};
use crate::squares::{classify, corner_offset, edge_slot, ALL_BELOW, EDGE_MAP, VERTEX_MAP};
use rastercam_core::{DistanceField, Path, VertexGraph, VertexId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of contour offsets to cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetCount {
    /// A fixed number of offsets
    Fixed(usize),
    /// Keep stepping outwards until the distance field is exhausted
    UntilExhausted,
}

impl OffsetCount {
    /// Convert the settings convention (`-1` = until exhausted)
    pub fn from_count(count: i32) -> ParameterResult<Self> {
        match count {
            -1 => Ok(Self::UntilExhausted),
            n if n >= 1 => Ok(Self::Fixed(n as usize)),
            n => Err(ParameterError::InvalidValue {
                name: "offsets".to_string(),
                reason: format!("{} (expected -1 or a positive count)", n),
            }),
        }
    }
}

/// Contour cut parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourParameters {
    /// Tool diameter (mm)
    pub bit_diameter: f32,
    /// Number of offsets
    pub offsets: OffsetCount,
    /// Fraction of the diameter between successive offsets
    pub overlap: f32,
}

impl Default for ContourParameters {
    fn default() -> Self {
        Self {
            bit_diameter: 3.175,
            offsets: OffsetCount::Fixed(1),
            overlap: 0.5,
        }
    }
}

impl ContourParameters {
    pub fn validate(&self) -> ParameterResult<()> {
        ParameterError::require_positive("bit_diameter", self.bit_diameter)?;
        ParameterError::require_positive("overlap", self.overlap)?;
        ParameterError::require_range("overlap", self.overlap, 0.0, 1.0)?;
        Ok(())
    }

    /// Contour levels for a field whose largest distance is `max_distance`
    pub fn levels(&self, max_distance: f32) -> ParameterResult<Vec<f32>> {
        self.validate()?;
        contour_levels(
            self.bit_diameter,
            self.offsets,
            self.overlap,
            max_distance,
        )
    }
}

/// Upper bound on the number of planned contour levels
pub const MAX_CONTOUR_LEVELS: usize = 100_000;

/// Plan offset levels: the first at the tool radius, then one every
/// `bit_diameter * overlap`.
///
/// With [`OffsetCount::UntilExhausted`] levels are added until one reaches
/// `max_distance`, and that last level is clamped to `max_distance`.
///
/// # Errors
///
/// Fails when the plan would exceed [`MAX_CONTOUR_LEVELS`] levels, when
/// `max_distance` is not finite, or when the step is too small to separate
/// neighbouring levels at their magnitude.
pub fn contour_levels(
    bit_diameter: f32,
    offsets: OffsetCount,
    overlap: f32,
    max_distance: f32,
) -> ParameterResult<Vec<f32>> {
    let first = bit_diameter / 2.0;
    let step = bit_diameter * overlap;

    let count = match offsets {
        OffsetCount::Fixed(count) => count.max(1),
        OffsetCount::UntilExhausted => {
            if !max_distance.is_finite() {
                return Err(ParameterError::InvalidValue {
                    name: "max_distance".to_string(),
                    reason: format!("{} is not finite", max_distance),
                });
            }
            if step > 0.0 && max_distance > first {
                let steps = ((f64::from(max_distance) - f64::from(first)) / f64::from(step)).ceil();
                if steps >= MAX_CONTOUR_LEVELS as f64 {
                    return Err(too_many_levels(steps));
                }
                steps as usize + 1
            } else {
                1
            }
        }
    };
    if count > MAX_CONTOUR_LEVELS {
        return Err(too_many_levels(count as f64));
    }

    let mut levels: Vec<f32> = (0..count).map(|k| first + k as f32 * step).collect();
    if offsets == OffsetCount::UntilExhausted {
        // rounding may put an earlier level at or past the clamp
        while levels.len() > 1 && levels[levels.len() - 2] >= max_distance {
            levels.remove(levels.len() - 2);
        }
        let last = levels.len() - 1;
        levels[last] = max_distance;
    }

    if !levels.windows(2).all(|w| w[0] < w[1]) {
        return Err(ParameterError::InvalidValue {
            name: "overlap".to_string(),
            reason: format!(
                "step {} mm does not separate levels up to {} mm",
                step,
                levels[levels.len() - 1]
            ),
        });
    }
    Ok(levels)
}

fn too_many_levels(count: f64) -> ParameterError {
    ParameterError::OutOfRange {
        name: "contour levels".to_string(),
        value: count,
        min: 1.0,
        max: MAX_CONTOUR_LEVELS as f64,
    }
}

/// Index of edge slot `(i, j, orientation)` in an `ni`-wide lattice
fn slot_index(ni: usize, i: usize, j: usize, orientation: usize) -> usize {
    (j * ni + i) * 2 + orientation
}

/// Pick the level that crosses a cell, scanning upwards.
///
/// Stops at the first level with a mixed case; a cell entirely at or below a
/// level is at or below every later one too, so it is skipped outright.
fn select_level(samples: [f32; 4], levels: &[f32]) -> Option<(f32, u8)> {
    for &level in levels {
        match classify(samples, level) {
            ALL_BELOW => return None,
            0 => continue,
            case => return Some((level, case)),
        }
    }
    None
}

/// Walk every cell and populate the graph with linked crossing vertices.
fn fill_slots(
    graph: &mut VertexGraph,
    distances: &DistanceField,
    mm_per_pixel: f32,
    levels: &[f32],
) {
    let (ni, nj) = distances.shape();
    for j in 0..nj.saturating_sub(1) {
        for i in 0..ni.saturating_sub(1) {
            let samples = [
                distances[(i, j)],
                distances[(i, j + 1)],
                distances[(i + 1, j)],
                distances[(i + 1, j + 1)],
            ];
            let Some((level, case)) = select_level(samples, levels) else {
                continue;
            };

            for segment in EDGE_MAP[case as usize].iter().flatten() {
                let mut prev: Option<VertexId> = None;
                for &edge in segment {
                    let (di, dj, orientation) = edge_slot(edge);
                    let slot = slot_index(ni, i + di, j + dj, orientation);

                    let id = match graph.slot(slot) {
                        Some(id) => id,
                        None => {
                            let [c0, c1] = VERTEX_MAP[edge as usize];
                            let (ci0, cj0) = corner_offset(c0);
                            let (ci1, cj1) = corner_offset(c1);
                            let (i0, j0) = (i + ci0, j + cj0);
                            let (i1, j1) = (i + ci1, j + cj1);

                            let d0 = distances[(i0, j0)];
                            let d1 = distances[(i1, j1)];
                            let t = (d0 - level) / (d0 - d1);

                            let x = mm_per_pixel
                                * (i0 as f32 + (i1 as f32 - i0 as f32) * t + 0.5);
                            let y = mm_per_pixel
                                * (j0 as f32 + (j1 as f32 - j0 as f32) * t + 0.5);
                            graph.insert_at(slot, x, y)
                        }
                    };

                    if let Some(p) = prev {
                        graph.link(p, id);
                    }
                    prev = Some(id);
                }
            }
        }
    }
}

/// Extract contours at the given levels.
///
/// Returns one simplified path per connected chain, in slot-scan order.
/// Paths are simplified with an area tolerance of `(mm_per_pixel / 2)^2`.
///
/// # Errors
///
/// Returns [`CamToolError::Core`](crate::CamToolError::Core) if the edge-slot
/// table cannot be allocated, and
/// [`CamToolError::Allocation`](crate::CamToolError::Allocation) if the
/// output collection cannot grow.
///
/// # Panics
///
/// Panics if `mm_per_pixel` is not positive or `levels` is not strictly
/// increasing.
pub fn find_paths(
    distances: &DistanceField,
    mm_per_pixel: f32,
    levels: &[f32],
) -> CamToolResult<Vec<Path>> {
    assert!(mm_per_pixel > 0.0, "mm_per_pixel must be > 0");
    assert!(
        levels.windows(2).all(|w| w[0] < w[1]),
        "contour levels must be strictly increasing"
    );

    let (ni, nj) = distances.shape();
    let mut graph = VertexGraph::try_with_slots(ni * nj * 2)?;
    fill_slots(&mut graph, distances, mm_per_pixel, levels);
    debug!(
        "Contour assembly created {} vertices over {} levels",
        graph.vertex_count(),
        levels.len()
    );

    // Allow one half-pixel square of decimation error
    let tolerance = (mm_per_pixel / 2.0).powi(2);

    let mut paths: Vec<Path> = Vec::new();
    for slot in 0..graph.slot_count() {
        let Some(id) = graph.slot(slot) else {
            continue;
        };

        let start = graph.backtrace(id);
        let mut chain = graph.chain(start);
        if !chain.ids.contains(&id) {
            chain = graph.chain(id);
        }
        let simplified = graph.decimate(&chain, tolerance);

        if paths.len() == paths.capacity() {
            paths.try_reserve(paths.len().max(1))?;
        }
        paths.push(graph.to_path(&simplified));
        graph.detach(&simplified);
    }

    debug!("Extracted {} contour paths", paths.len());
    Ok(paths)
}

/// Plan levels, extract contours and put them in cutting order.
pub fn contour_cut(
    distances: &DistanceField,
    mm_per_pixel: f32,
    params: &ContourParameters,
) -> CamToolResult<Vec<Path>> {
    let levels = params.levels(distances.max_value())?;
    info!(
        "Contour cut: {} levels from {:.3} mm to {:.3} mm",
        levels.len(),
        levels[0],
        levels[levels.len() - 1]
    );

    let paths = find_paths(distances, mm_per_pixel, &levels)?;
    let order = sort_paths(&paths);
    Ok(apply_order(paths, &order))
}

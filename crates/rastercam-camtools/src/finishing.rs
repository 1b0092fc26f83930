//! Raster finishing passes.
//!
//! Sweeps the tool along evenly spaced lattice columns, then rows, lifting it
//! at every sample to the lowest height that clears the surface under its
//! footprint.

use crate::endmill::{MillProfile, MillType};
use crate::error::{CamToolResult, ParameterError, ParameterResult};
use rastercam_core::{HeightLattice, Path, Point3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Finishing pass parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishParameters {
    /// Tool diameter (mm)
    pub bit_diameter: f32,
    /// Fraction of the diameter between adjacent passes
    pub overlap: f32,
    /// Tool tip shape
    pub mill: MillType,
}

impl Default for FinishParameters {
    fn default() -> Self {
        Self {
            bit_diameter: 3.175,
            overlap: 0.5,
            mill: MillType::Flat,
        }
    }
}

impl FinishParameters {
    pub fn validate(&self) -> ParameterResult<()> {
        ParameterError::require_positive("bit_diameter", self.bit_diameter)?;
        ParameterError::require_positive("overlap", self.overlap)?;
        ParameterError::require_range("overlap", self.overlap, 0.0, 1.0)?;
        Ok(())
    }
}

/// Lattice lines visited along an axis of `n` samples.
///
/// Starts one tool radius in and stops before the far radius; the step is
/// `diameter * overlap` in whole pixels, at least one.
pub fn raster_lines(n: usize, diameter: f32, overlap: f32, mm_per_pixel: f32) -> Vec<usize> {
    let margin = (diameter / 2.0) / mm_per_pixel;
    let step = (((diameter * overlap) / mm_per_pixel) as usize).max(1);
    let limit = n as f32 - margin;

    let mut lines = Vec::new();
    let mut index = margin as usize;
    while (index as f32) < limit {
        lines.push(index);
        index += step;
    }
    lines
}

/// One pass along a lattice line.
///
/// `column` selects a sweep over `j` at fixed `i`, otherwise over `i` at
/// fixed `j`.
fn sweep(
    heights: &HeightLattice,
    profile: &MillProfile,
    mm_per_pixel: f32,
    line: usize,
    column: bool,
) -> CamToolResult<Path> {
    let (ni, nj) = heights.shape();
    let count = if column { nj } else { ni };

    let mut points = Vec::new();
    points.try_reserve_exact(count)?;
    for k in 0..count {
        let (i, j) = if column { (line, k) } else { (k, line) };
        let z = profile.get_max(heights, i, j);
        points.push(Point3::new(i as f32 * mm_per_pixel, j as f32 * mm_per_pixel, z));
    }
    Ok(Path::open(points))
}

/// Generate finishing passes over a height map.
///
/// Column passes come first, in increasing `i`, then row passes in
/// increasing `j`. Each pass is an open path with one point per lattice
/// sample along its line.
///
/// # Errors
///
/// Returns a parameter error for a non-positive diameter or an overlap
/// outside `(0, 1]`, and an allocation error if the output cannot grow.
///
/// # Panics
///
/// Panics if `mm_per_pixel` or `mm_per_height_unit` is not positive.
pub fn finish_cut(
    heights: &HeightLattice,
    mm_per_pixel: f32,
    mm_per_height_unit: f32,
    params: &FinishParameters,
) -> CamToolResult<Vec<Path>> {
    params.validate()?;
    assert!(mm_per_pixel > 0.0, "mm_per_pixel must be > 0");
    assert!(mm_per_height_unit > 0.0, "mm_per_height_unit must be > 0");

    if heights.is_empty() {
        return Ok(Vec::new());
    }

    let profile = MillProfile::new(
        params.mill,
        params.bit_diameter,
        mm_per_pixel,
        mm_per_height_unit,
    );
    let (ni, nj) = heights.shape();
    let columns = raster_lines(ni, params.bit_diameter, params.overlap, mm_per_pixel);
    let rows = raster_lines(nj, params.bit_diameter, params.overlap, mm_per_pixel);
    debug!(
        "Finishing with {} mill, footprint {} cells: {} columns, {} rows",
        params.mill,
        profile.side(),
        columns.len(),
        rows.len()
    );

    let mut paths = Vec::new();
    paths.try_reserve_exact(columns.len() + rows.len())?;

    let column_paths = columns
        .par_iter()
        .map(|&i| sweep(heights, &profile, mm_per_pixel, i, true))
        .collect::<CamToolResult<Vec<Path>>>()?;
    paths.extend(column_paths);

    let row_paths = rows
        .par_iter()
        .map(|&j| sweep(heights, &profile, mm_per_pixel, j, false))
        .collect::<CamToolResult<Vec<Path>>>()?;
    paths.extend(row_paths);

    info!("Generated {} finishing passes", paths.len());
    Ok(paths)
}

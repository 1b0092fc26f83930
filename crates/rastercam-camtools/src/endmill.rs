//! End mill profiles.
//!
//! A profile is a square footprint sampled on the height lattice: a contact
//! mask of the cells within the tool's radius, and for each of them how far
//! the tool tip sits above its lowest point, in height units.

use crate::error::{CamToolError, CamToolResult};
use rastercam_core::{HeightLattice, Lattice};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// End mill tip shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MillType {
    /// Flat end: the whole footprint cuts at one depth
    Flat,
    /// Ball end: hemispherical tip
    Ball,
}

impl MillType {
    /// Numeric tool code, 0 for flat and 1 for ball
    pub fn from_index(index: i32) -> CamToolResult<Self> {
        match index {
            0 => Ok(Self::Flat),
            1 => Ok(Self::Ball),
            other => Err(CamToolError::UnsupportedTool(format!(
                "unknown end mill type {} (expected 0 or 1)",
                other
            ))),
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::Flat => 0,
            Self::Ball => 1,
        }
    }
}

impl fmt::Display for MillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Ball => write!(f, "ball"),
        }
    }
}

impl FromStr for MillType {
    type Err = CamToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "0" => Ok(Self::Flat),
            "ball" | "1" => Ok(Self::Ball),
            _ => Err(CamToolError::UnsupportedTool(format!(
                "unknown end mill type '{}'",
                s
            ))),
        }
    }
}

/// Sampled footprint of an end mill
#[derive(Debug, Clone, PartialEq)]
pub struct MillProfile {
    mill: MillType,
    side: usize,
    mask: Lattice<bool>,
    depression: Lattice<u16>,
    mm_per_height_unit: f32,
}

impl MillProfile {
    /// Sample a tool of `diameter` mm.
    ///
    /// The footprint is `floor(diameter / mm_per_pixel)` cells on a side,
    /// centered on cell `side / 2`. A cell is in contact when its center is
    /// strictly closer than the radius.
    ///
    /// # Panics
    ///
    /// Panics if any of the scales or the diameter is not positive.
    pub fn new(mill: MillType, diameter: f32, mm_per_pixel: f32, mm_per_height_unit: f32) -> Self {
        assert!(diameter > 0.0, "diameter must be > 0");
        assert!(mm_per_pixel > 0.0, "mm_per_pixel must be > 0");
        assert!(mm_per_height_unit > 0.0, "mm_per_height_unit must be > 0");

        let side = (diameter / mm_per_pixel) as usize;
        let r = (side / 2) as f32;
        let radius = diameter / 2.0;

        let offset = |c: usize, d: usize| {
            let dc = c as f32 - r;
            let dd = d as f32 - r;
            (dc * dc + dd * dd).sqrt() * mm_per_pixel
        };

        let mask = Lattice::from_fn(side, side, |c, d| offset(c, d) < radius);
        let depression = Lattice::from_fn(side, side, |c, d| {
            let p = offset(c, d);
            match mill {
                MillType::Ball if p < radius => {
                    ((radius - (diameter * diameter / 4.0 - p * p).sqrt()) / mm_per_height_unit)
                        as u16
                }
                _ => 0,
            }
        });

        Self {
            mill,
            side,
            mask,
            depression,
            mm_per_height_unit,
        }
    }

    pub fn flat(diameter: f32, mm_per_pixel: f32, mm_per_height_unit: f32) -> Self {
        Self::new(MillType::Flat, diameter, mm_per_pixel, mm_per_height_unit)
    }

    pub fn ball(diameter: f32, mm_per_pixel: f32, mm_per_height_unit: f32) -> Self {
        Self::new(MillType::Ball, diameter, mm_per_pixel, mm_per_height_unit)
    }

    pub fn mill(&self) -> MillType {
        self.mill
    }

    /// Footprint width in cells
    pub fn side(&self) -> usize {
        self.side
    }

    /// Whether footprint cell `(c, d)` touches the surface
    pub fn contacts(&self, c: usize, d: usize) -> bool {
        self.mask[(c, d)]
    }

    /// Tip height above the tool's lowest point at footprint cell `(c, d)`
    pub fn depression(&self, c: usize, d: usize) -> u16 {
        self.depression[(c, d)]
    }

    /// Lowest tool-tip height (mm) centered at lattice cell `(i, j)` that
    /// clears every height under the footprint.
    ///
    /// Footprint cells falling outside the lattice are ignored, and the
    /// result never goes below zero.
    pub fn get_max(&self, heights: &HeightLattice, i: usize, j: usize) -> f32 {
        let (ni, nj) = heights.shape();
        let half = self.side / 2;
        let mut max: i32 = 0;

        for d in 0..self.side {
            let Some(b) = (j + d).checked_sub(half).filter(|&b| b < nj) else {
                continue;
            };
            for c in 0..self.side {
                let Some(a) = (i + c).checked_sub(half).filter(|&a| a < ni) else {
                    continue;
                };
                if !self.mask[(c, d)] {
                    continue;
                }
                let height = heights[(a, b)] as i32 - self.depression[(c, d)] as i32;
                max = max.max(height);
            }
        }

        max as f32 * self.mm_per_height_unit
    }
}

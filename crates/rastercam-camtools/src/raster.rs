//! Raster import and export.
//!
//! Converts images to lattices and back. Image rows run top to bottom while
//! lattice rows run bottom to top, so row 0 of a lattice is the last row of
//! its image.

use crate::error::CamToolResult;
use image::{DynamicImage, GrayImage, Luma};
use rastercam_core::{DistanceField, HeightLattice, Lattice, OccupancyLattice};
use std::path::Path;
use tracing::debug;

/// Full-scale value of a 16-bit height map
pub const HEIGHT_FULL_SCALE: f32 = u16::MAX as f32;

/// Load an image from disk
pub fn load_image(path: impl AsRef<Path>) -> CamToolResult<DynamicImage> {
    let img = image::open(path.as_ref())?;
    debug!(
        "Loaded {} ({}x{})",
        path.as_ref().display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Occupancy from 8-bit luma: a pixel is occupied when `gray >= threshold`,
/// or the reverse when `invert` is set.
pub fn occupancy_from_image(img: &DynamicImage, threshold: u8, invert: bool) -> OccupancyLattice {
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    Lattice::from_fn(w as usize, h as usize, |i, j| {
        let Luma([value]) = *gray.get_pixel(i as u32, h - 1 - j as u32);
        (value >= threshold) != invert
    })
}

/// Height map from 16-bit luma
pub fn heights_from_image(img: &DynamicImage) -> HeightLattice {
    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    Lattice::from_fn(w as usize, h as usize, |i, j| {
        gray.get_pixel(i as u32, h - 1 - j as u32).0[0]
    })
}

/// Occupancy of every cell at or above `level`
pub fn threshold_heights(heights: &HeightLattice, level: u16) -> OccupancyLattice {
    heights.map(|&h| h >= level)
}

/// Millimeters per height unit for a height map spanning `z_range_mm`
pub fn mm_per_height_unit(z_range_mm: f32) -> f32 {
    z_range_mm / HEIGHT_FULL_SCALE
}

/// Render a distance field as 8-bit gray, scaled so the largest distance is
/// white.
pub fn distance_to_image(field: &DistanceField) -> GrayImage {
    let (ni, nj) = field.shape();
    let max = field.max_value();
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    GrayImage::from_fn(ni as u32, nj as u32, |x, y| {
        let d = field[(x as usize, nj - 1 - y as usize)];
        let value = if d.is_finite() { (d * scale).round().clamp(0.0, 255.0) } else { 255.0 };
        Luma([value as u8])
    })
}

/// Render occupancy as black (occupied) on white
pub fn occupancy_to_image(occupancy: &OccupancyLattice) -> GrayImage {
    let (ni, nj) = occupancy.shape();
    GrayImage::from_fn(ni as u32, nj as u32, |x, y| {
        if occupancy[(x as usize, nj - 1 - y as usize)] {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_bottom_row_becomes_row_zero() {
        let mut gray = GrayImage::from_pixel(3, 2, Luma([0]));
        gray.put_pixel(0, 1, Luma([255]));
        let occ = occupancy_from_image(&DynamicImage::ImageLuma8(gray), 128, false);
        assert_eq!(occ.shape(), (3, 2));
        assert!(occ[(0, 0)]);
        assert!(!occ[(0, 1)]);
        assert!(!occ[(1, 0)]);
    }

    #[test]
    fn test_threshold_and_invert() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([(x * 64) as u8]));
        let img = DynamicImage::ImageLuma8(gray);
        let occ = occupancy_from_image(&img, 128, false);
        assert_eq!(occ.as_slice(), &[false, false, true, true]);
        let occ = occupancy_from_image(&img, 128, true);
        assert_eq!(occ.as_slice(), &[true, true, false, false]);
    }

    #[test]
    fn test_sixteen_bit_heights() {
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(2, 2, |x, y| Luma([(x * 1000 + y * 10) as u16]));
        let heights = heights_from_image(&DynamicImage::ImageLuma16(buf));
        assert_eq!(heights[(0, 0)], 10);
        assert_eq!(heights[(1, 0)], 1010);
        assert_eq!(heights[(1, 1)], 1000);
    }

    #[test]
    fn test_threshold_heights() {
        let heights = Lattice::from_vec(3, 1, vec![5u16, 10, 15]).unwrap();
        assert_eq!(threshold_heights(&heights, 10).as_slice(), &[false, true, true]);
    }

    #[test]
    fn test_height_scale() {
        assert!((mm_per_height_unit(65.535) - 0.001).abs() < 1e-8);
    }

    #[test]
    fn test_occupancy_image_round_trip() {
        let occ = Lattice::from_fn(4, 3, |i, j| i == j);
        let img = DynamicImage::ImageLuma8(occupancy_to_image(&occ));
        assert_eq!(occupancy_from_image(&img, 128, true), occ);
    }

    #[test]
    fn test_distance_image_scales_to_white() {
        let field = Lattice::from_vec(2, 1, vec![0.0f32, 4.0]).unwrap();
        let img = distance_to_image(&field);
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 255);
    }
}

//! Job pipeline.
//!
//! Binds validated [`JobSettings`] to the individual stages: image import,
//! distance transform, contour cutting and finishing.

use crate::contour::{contour_cut, ContourParameters, OffsetCount};
use crate::distance::distance_transform_parallel;
use crate::endmill::MillType;
use crate::error::{CamToolError, CamToolResult};
use crate::export::SvgOptions;
use crate::finishing::{finish_cut, FinishParameters};
use crate::raster;
use image::DynamicImage;
use rastercam_core::{CoreError, DistanceField, HeightLattice, OccupancyLattice, Path};
use rastercam_settings::JobSettings;
use tracing::{info, warn};

/// A configured CAM job
#[derive(Debug, Clone)]
pub struct CamPipeline {
    settings: JobSettings,
}

impl CamPipeline {
    /// Validate `settings` and build a pipeline from them
    pub fn new(settings: JobSettings) -> CamToolResult<Self> {
        settings.validate()?;
        CoreError::check_scale("mm_per_pixel", settings.raster.mm_per_pixel())?;
        CoreError::check_scale(
            "mm_per_height_unit",
            raster::mm_per_height_unit(settings.raster.z_range_mm),
        )?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    pub fn mm_per_pixel(&self) -> f32 {
        self.settings.raster.mm_per_pixel()
    }

    pub fn mm_per_height_unit(&self) -> f32 {
        raster::mm_per_height_unit(self.settings.raster.z_range_mm)
    }

    /// Threshold an image into an occupancy lattice
    pub fn occupancy(&self, img: &DynamicImage) -> OccupancyLattice {
        raster::occupancy_from_image(
            img,
            self.settings.raster.threshold,
            self.settings.raster.invert,
        )
    }

    /// Read an image as a height map
    pub fn heights(&self, img: &DynamicImage) -> HeightLattice {
        raster::heights_from_image(img)
    }

    /// Distance field of `occupancy`, split across the configured threads
    pub fn distances(&self, occupancy: &OccupancyLattice) -> DistanceField {
        distance_transform_parallel(
            occupancy,
            self.settings.raster.pixels_per_mm,
            self.settings.distance.threads,
        )
    }

    pub fn contour_parameters(&self) -> CamToolResult<ContourParameters> {
        let contour = &self.settings.contour;
        Ok(ContourParameters {
            bit_diameter: contour.bit_diameter,
            offsets: OffsetCount::from_count(contour.offsets)?,
            overlap: contour.overlap,
        })
    }

    /// Offset contours around the occupied region, in cutting order
    pub fn contours(&self, occupancy: &OccupancyLattice) -> CamToolResult<Vec<Path>> {
        let params = self.contour_parameters()?;
        let distances = self.distances(occupancy);
        let paths = contour_cut(&distances, self.mm_per_pixel(), &params)?;
        info!("Contour job produced {} paths", paths.len());
        Ok(paths)
    }

    /// Finishing passes over a height map.
    ///
    /// An unrecognised end mill type is reported and yields no passes.
    pub fn finishing(&self, heights: &HeightLattice) -> CamToolResult<Vec<Path>> {
        let finish = &self.settings.finish;
        let mill = match finish.mill_type.parse::<MillType>() {
            Ok(mill) => mill,
            Err(CamToolError::UnsupportedTool(reason)) => {
                warn!("Skipping finishing passes: {}", reason);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let params = FinishParameters {
            bit_diameter: finish.bit_diameter,
            overlap: finish.overlap,
            mill,
        };
        finish_cut(
            heights,
            self.mm_per_pixel(),
            self.mm_per_height_unit(),
            &params,
        )
    }

    pub fn svg_options(&self) -> SvgOptions {
        SvgOptions {
            border: self.settings.export.svg_border,
            stroke: self.settings.export.svg_stroke,
        }
    }
}

//! # Rastercam CAM Tools
//!
//! Toolpath generation from raster images for 2.5D milling.
//!
//! ## Stages
//!
//! - **Distance Transform**: exact Euclidean distance from every cell to the
//!   nearest occupied cell, optionally split across threads
//! - **Contour Assembler**: marching-squares iso-contours of a distance field,
//!   chained and simplified into polylines
//! - **Sequencer**: inside-out, nearest-first cutting order
//! - **Finishing**: flat and ball end mill raster passes over a height map
//!
//! ## Supporting Infrastructure
//!
//! - **Raster**: image import and export
//! - **Export**: SVG and JSON toolpath output
//! - **Pipeline**: settings-driven jobs tying the stages together

pub mod contour;
pub mod distance;
pub mod endmill;
pub mod error;
pub mod export;
pub mod finishing;
pub mod pipeline;
pub mod raster;
pub mod sequence;
pub mod squares;

// Re-export commonly used items
pub use contour::{contour_cut, contour_levels, find_paths, ContourParameters, OffsetCount};
pub use distance::{
    distance_transform, distance_transform_parallel, horizontal_pass, vertical_pass,
    VerticalDistances,
};
pub use endmill::{MillProfile, MillType};
pub use error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
pub use export::{load_json, save_json, save_paths, save_svg, write_svg, SvgOptions};
pub use finishing::{finish_cut, raster_lines, FinishParameters};
pub use pipeline::CamPipeline;
pub use sequence::{apply_order, sort_paths, CutPath};

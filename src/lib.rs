//! # Rastercam
//!
//! Raster CAM toolpath generation for 2.5D milling:
//! - Exact Euclidean distance fields from thresholded images
//! - Offset contours assembled with marching squares
//! - Inside-out, nearest-first cut sequencing
//! - Flat and ball end mill finishing passes over height maps
//!
//! ## Architecture
//!
//! Rastercam is organized as a workspace with multiple crates:
//!
//! 1. **rastercam-core** - Lattices, polylines and the shared vertex graph
//! 2. **rastercam-camtools** - Distance transform, contours, sequencing, finishing, export
//! 3. **rastercam-settings** - Job settings with JSON/TOML persistence
//! 4. **rastercam** - Command-line front end that ties the crates together

pub mod cli;

pub use rastercam_camtools::{
    contour_cut, distance_transform, distance_transform_parallel, find_paths, finish_cut,
    sort_paths, CamPipeline, CamToolError, CamToolResult, ContourParameters, FinishParameters,
    MillProfile, MillType, OffsetCount, SvgOptions,
};
pub use rastercam_core::{
    Bounds, CoreError, DistanceField, HeightLattice, Lattice, OccupancyLattice, Path, Point3,
};
pub use rastercam_settings::{JobSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

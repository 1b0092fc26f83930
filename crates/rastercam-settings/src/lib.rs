//! Rastercam Settings Crate
//!
//! Job settings for the raster CAM pipeline, loaded from and saved to JSON
//! or TOML files.

pub mod config;
pub mod error;

pub use config::{
    ConfigFormat, ContourSettings, DistanceSettings, ExportSettings, FinishSettings, JobSettings,
    RasterSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};

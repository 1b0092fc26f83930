//! Job settings for rastercam
//!
//! Settings are grouped by pipeline stage:
//! - Raster import (scale, threshold, height range)
//! - Distance transform (thread count)
//! - Contour cutting (tool, offsets, overlap)
//! - Finishing (tool, overlap, end mill type)
//! - Export (SVG framing)
//!
//! Files are JSON or TOML, chosen by extension. Every section has defaults,
//! so a file only needs to name the values it changes.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Raster import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Lattice resolution
    pub pixels_per_mm: f32,
    /// Gray level at or above which a pixel is occupied
    pub threshold: u8,
    /// Treat dark pixels as occupied instead
    pub invert: bool,
    /// Height spanned by the full 16-bit range of a height map (mm)
    pub z_range_mm: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            pixels_per_mm: 10.0,
            threshold: 128,
            invert: false,
            z_range_mm: 10.0,
        }
    }
}

impl RasterSettings {
    pub fn mm_per_pixel(&self) -> f32 {
        1.0 / self.pixels_per_mm
    }
}

/// Distance transform settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceSettings {
    /// Number of ranges each pass is split into
    pub threads: usize,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self { threads: 2 }
    }
}

/// Contour cut settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    /// Tool diameter (mm)
    pub bit_diameter: f32,
    /// Number of offsets, or -1 to continue until the part is cleared
    pub offsets: i32,
    /// Fraction of the diameter between offsets
    pub overlap: f32,
}

impl Default for ContourSettings {
    fn default() -> Self {
        Self {
            bit_diameter: 3.175,
            offsets: 1,
            overlap: 0.5,
        }
    }
}

/// Finishing pass settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishSettings {
    /// Tool diameter (mm)
    pub bit_diameter: f32,
    /// Fraction of the diameter between passes
    pub overlap: f32,
    /// End mill type name ("flat" or "ball")
    pub mill_type: String,
}

impl Default for FinishSettings {
    fn default() -> Self {
        Self {
            bit_diameter: 3.175,
            overlap: 0.5,
            mill_type: "flat".to_string(),
        }
    }
}

/// SVG export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Margin around the drawing, as a fraction of its extent
    pub svg_border: f32,
    /// Stroke width
    pub svg_stroke: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            svg_border: 0.0,
            svg_stroke: 0.1,
        }
    }
}

/// Complete job settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    pub raster: RasterSettings,
    pub distance: DistanceSettings,
    pub contour: ContourSettings,
    pub finish: FinishSettings,
    pub export: ExportSettings,
}

/// Settings file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(format!(
                "{} (settings file must be .json or .toml)",
                other.unwrap_or("no extension")
            ))
            .into()),
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> SettingsResult<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(content)?,
            Self::Toml => toml::from_str(content)?,
        })
    }

    fn render<T: Serialize>(self, value: &T) -> SettingsResult<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Toml => toml::to_string_pretty(value).map_err(ConfigError::from)?,
        })
    }
}

fn require_positive(key: &str, value: f32) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("{} must be > 0", value)))
    }
}

fn require_overlap(key: &str, value: f32) -> SettingsResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("{} must be in (0, 1]", value)))
    }
}

impl JobSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let settings: Self = format.parse(&content)?;
        settings.validate()?;
        debug!("Loaded job settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = ConfigFormat::from_path(path)?;
        let content = format.render(self)?;

        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;
        debug!("Saved job settings to {}", path.display());
        Ok(())
    }

    /// Validate settings
    ///
    /// The end mill name is checked where it is used, not here.
    pub fn validate(&self) -> SettingsResult<()> {
        // Raster import
        require_positive("raster.pixels_per_mm", self.raster.pixels_per_mm)?;
        require_positive("raster.z_range_mm", self.raster.z_range_mm)?;

        if self.distance.threads == 0 {
            return Err(SettingsError::invalid("distance.threads", "must be > 0"));
        }

        // Contour cutting
        require_positive("contour.bit_diameter", self.contour.bit_diameter)?;
        require_overlap("contour.overlap", self.contour.overlap)?;
        if self.contour.offsets == 0 || self.contour.offsets < -1 {
            return Err(SettingsError::invalid(
                "contour.offsets",
                format!("{} (expected -1 or a positive count)", self.contour.offsets),
            ));
        }

        // Finishing
        require_positive("finish.bit_diameter", self.finish.bit_diameter)?;
        require_overlap("finish.overlap", self.finish.overlap)?;

        if self.export.svg_border.is_nan() || self.export.svg_border < 0.0 {
            return Err(SettingsError::invalid("export.svg_border", "must be >= 0"));
        }
        require_positive("export.svg_stroke", self.export.svg_stroke)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = JobSettings::new();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.raster.pixels_per_mm, 10.0);
        assert_eq!(settings.contour.offsets, 1);
        assert_eq!(settings.finish.mill_type, "flat");
        assert!((settings.raster.mm_per_pixel() - 0.1).abs() < 1e-7);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut settings = JobSettings::new();
        settings.raster.pixels_per_mm = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = JobSettings::new();
        settings.distance.threads = 0;
        assert!(settings.validate().is_err());

        let mut settings = JobSettings::new();
        settings.contour.overlap = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = JobSettings::new();
        settings.finish.overlap = 0.0;
        assert!(settings.validate().is_err());

        for offsets in [0, -2] {
            let mut settings = JobSettings::new();
            settings.contour.offsets = offsets;
            assert!(settings.validate().is_err(), "offsets {}", offsets);
        }

        let mut settings = JobSettings::new();
        settings.contour.offsets = -1;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_unknown_mill_type_passes_validation() {
        let mut settings = JobSettings::new();
        settings.finish.mill_type = "vbit".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: JobSettings = ConfigFormat::Toml
            .parse("[finish]\nmill_type = \"ball\"\n")
            .unwrap();
        assert_eq!(settings.finish.mill_type, "ball");
        assert_eq!(settings.finish.bit_diameter, 3.175);
        assert_eq!(settings.raster, RasterSettings::default());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("job.json")).unwrap(),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("job.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("job.yaml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("job")).is_err());
    }
}

//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for toolpath generation,
//! parameter validation, and image/export handling.

use rastercam_core::CoreError;
use rastercam_settings::SettingsError;
use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Errors that can occur during CAM tool operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// Invalid parameters were provided to a CAM tool.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The requested end mill type is not supported.
    #[error("Unsupported tool: {0}")]
    UnsupportedTool(String),

    /// Growing the output path collection failed.
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Image processing failed.
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// A core data model error occurred.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// The job settings were rejected.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors related to CAM tool parameter validation.
#[derive(Error, Debug)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl ParameterError {
    /// Reject values that are not strictly positive.
    pub fn require_positive(name: &str, value: f32) -> ParameterResult<f32> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::InvalidValue {
                name: name.to_string(),
                reason: format!("{} must be > 0", value),
            })
        }
    }

    /// Reject values outside `min..=max`.
    pub fn require_range(name: &str, value: f32, min: f32, max: f32) -> ParameterResult<f32> {
        if value >= min && value <= max {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                name: name.to_string(),
                value: value as f64,
                min: min as f64,
                max: max as f64,
            })
        }
    }
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

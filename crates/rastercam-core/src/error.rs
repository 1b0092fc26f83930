//! Error handling for RasterCAM core types
//!
//! Provides error types for lattice construction and polyline storage:
//! - Dimension errors (lattice shape does not match its data)
//! - Scale errors (non-positive pixel or height scales)
//! - Allocation errors (growth of path collections failed)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::collections::TryReserveError;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Lattice data does not match the declared shape
    #[error("Dimension mismatch: expected {expected} cells ({ni}x{nj}), got {actual}")]
    DimensionMismatch {
        /// Lattice width.
        ni: usize,
        /// Lattice height.
        nj: usize,
        /// Number of cells implied by the shape.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },

    /// A physical scale was zero, negative or not finite
    #[error("Invalid scale '{name}': {value} (must be > 0)")]
    InvalidScale {
        /// The scale parameter name.
        name: String,
        /// The rejected value.
        value: f32,
    },

    /// Growing a collection failed
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

impl CoreError {
    /// Check that a scale is strictly positive and finite.
    pub fn check_scale(name: &str, value: f32) -> CoreResult<f32> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::InvalidScale {
                name: name.to_string(),
                value,
            })
        }
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

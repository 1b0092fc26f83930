//! # RasterCAM Core
//!
//! Core data types shared by the RasterCAM toolpath crates:
//! - [`Lattice`] grids for occupancy, distance and height samples
//! - [`Path`] polylines handed back to callers
//! - [`VertexGraph`], the index-based vertex arena contours are assembled in

pub mod error;
pub mod lattice;
pub mod path;
pub mod vertex;

pub use error::{CoreError, CoreResult};
pub use lattice::{DistanceField, HeightLattice, Lattice, OccupancyLattice};
pub use path::{merged_bounds, Bounds, Path, Point3};
pub use vertex::{Chain, SlotId, Vertex, VertexGraph, VertexId};

//! Two-dimensional sample lattices
//!
//! A [`Lattice`] is a dense `ni x nj` grid stored row-major (`j * ni + i`).
//! The same container holds occupancy flags, distance fields and quantized
//! height maps. Column index `i` runs along +x, row index `j` along +y.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Dense row-major 2D grid
///
/// Deserialization goes through [`Lattice::from_vec`], so a payload whose
/// data does not fill `ni x nj` is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLattice<T>")]
pub struct Lattice<T> {
    ni: usize,
    nj: usize,
    data: Vec<T>,
}

/// Unchecked wire form of a [`Lattice`]
#[derive(Deserialize)]
struct RawLattice<T> {
    ni: usize,
    nj: usize,
    data: Vec<T>,
}

impl<T> TryFrom<RawLattice<T>> for Lattice<T> {
    type Error = CoreError;

    fn try_from(raw: RawLattice<T>) -> CoreResult<Self> {
        Self::from_vec(raw.ni, raw.nj, raw.data)
    }
}

/// Occupancy lattice: `true` cells are filled
pub type OccupancyLattice = Lattice<bool>;

/// Distance field in millimeters
pub type DistanceField = Lattice<f32>;

/// Quantized height map (one unit = `mm_per_height_unit`)
pub type HeightLattice = Lattice<u16>;

impl<T: Clone> Lattice<T> {
    /// Create a lattice with every cell set to `value`
    pub fn filled(ni: usize, nj: usize, value: T) -> Self {
        Self {
            ni,
            nj,
            data: vec![value; ni * nj],
        }
    }
}

impl<T: Clone + Default> Lattice<T> {
    /// Create a lattice of default-valued cells
    pub fn new(ni: usize, nj: usize) -> Self {
        Self::filled(ni, nj, T::default())
    }
}

impl<T> Lattice<T> {
    /// Wrap existing row-major data
    pub fn from_vec(ni: usize, nj: usize, data: Vec<T>) -> CoreResult<Self> {
        if ni.checked_mul(nj) != Some(data.len()) {
            return Err(CoreError::DimensionMismatch {
                ni,
                nj,
                expected: ni.saturating_mul(nj),
                actual: data.len(),
            });
        }
        Ok(Self { ni, nj, data })
    }

    /// Build a lattice by evaluating `f(i, j)` at every cell
    pub fn from_fn(ni: usize, nj: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(ni * nj);
        for j in 0..nj {
            for i in 0..ni {
                data.push(f(i, j));
            }
        }
        Self { ni, nj, data }
    }

    /// Width (number of columns)
    pub fn ni(&self) -> usize {
        self.ni
    }

    /// Height (number of rows)
    pub fn nj(&self) -> usize {
        self.nj
    }

    /// `(ni, nj)`
    pub fn shape(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cell at column `i`, row `j`, or `None` when out of bounds
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.ni && j < self.nj {
            self.data.get(j * self.ni + i)
        } else {
            None
        }
    }

    /// One row as a slice
    pub fn row(&self, j: usize) -> &[T] {
        &self.data[j * self.ni..(j + 1) * self.ni]
    }

    /// Iterator over rows
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks() rejects a zero chunk size
        self.data.chunks(self.ni.max(1)).take(self.nj)
    }

    /// Raw row-major storage
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major storage
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Apply `f` to every cell, producing a lattice of the same shape
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Lattice<U> {
        Lattice {
            ni: self.ni,
            nj: self.nj,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Whether two lattices share `(ni, nj)`
    pub fn same_shape<U>(&self, other: &Lattice<U>) -> bool {
        self.shape() == other.shape()
    }

    /// Assert that `other` has the same shape as `self`.
    ///
    /// # Panics
    ///
    /// Panics when the shapes differ; mixing lattice sizes in one operation is
    /// a caller bug.
    pub fn assert_same_shape<U>(&self, other: &Lattice<U>) {
        assert!(
            self.same_shape(other),
            "lattice shape mismatch: {:?} vs {:?}",
            self.shape(),
            other.shape()
        );
    }
}

impl Lattice<f32> {
    /// Largest finite sample, or `0.0` for an empty lattice
    pub fn max_value(&self) -> f32 {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f32, f32::max)
    }
}

impl<T> Index<(usize, usize)> for Lattice<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(i < self.ni && j < self.nj, "({}, {}) out of bounds", i, j);
        &self.data[j * self.ni + i]
    }
}

impl<T> IndexMut<(usize, usize)> for Lattice<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(i < self.ni && j < self.nj, "({}, {}) out of bounds", i, j);
        &mut self.data[j * self.ni + i]
    }
}

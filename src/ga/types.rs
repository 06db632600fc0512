//! Core data types shared by the engine and its operators.
//!
//! Cities are identified by their index in the engine's city list; an
//! [`Individual`] is a permutation of those indices.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A candidate visiting order: a permutation of `0..num_cities`.
pub type Individual = Vec<usize>;

/// An immutable 2-D coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct City {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl City {
    /// Creates a city at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &City) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for City {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for City {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Best individual of a generation, in canonical form.
///
/// `route` always starts at the depot and, in open-path mode, ends at the
/// final destination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationResult {
    /// Canonical visiting order.
    pub route: Vec<usize>,

    /// Total route length.
    pub distance: f64,

    /// Generation counter at the time of extraction.
    pub generation: usize,
}

/// Read-only view of the engine's cities.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CitiesSnapshot {
    pub cities: Vec<City>,
    pub start_index: usize,
}

/// Read-only view of the engine's progress.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateSnapshot {
    pub cities: Vec<City>,
    pub start_index: usize,
    pub generation: usize,

    /// Best distance in the live population.
    pub best_distance: f64,
}

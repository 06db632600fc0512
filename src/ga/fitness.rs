//! Route length evaluation.
//!
//! An individual is scored after being put into canonical form: rotated so
//! the depot comes first and, in open-path mode, with the final destination
//! swapped into the last position. Cycle mode adds the closing edge back to
//! the depot; open-path mode does not.

use super::types::{City, Individual};
use crate::error::{EngineError, Result};

/// Scores individuals against a fixed city set.
///
/// `final_index == start_index` means a closed tour; anything else is an
/// open path from `start_index` to `final_index`.
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    cities: &'a [City],
    start_index: usize,
    final_index: usize,
}

impl<'a> RouteEvaluator<'a> {
    pub fn new(cities: &'a [City], start_index: usize, final_index: usize) -> Self {
        Self {
            cities,
            start_index,
            final_index,
        }
    }

    /// Whether routes end at a fixed destination instead of returning home.
    pub fn is_open_path(&self) -> bool {
        self.final_index != self.start_index
    }

    /// Rotates `individual` so the depot is first; in open-path mode the
    /// final destination is then swapped into the last slot.
    ///
    /// # Errors
    /// [`EngineError::CorruptedPermutation`] if the depot or destination is
    /// missing from `individual`.
    pub fn canonical_route(&self, individual: &[usize]) -> Result<Individual> {
        let offset = individual
            .iter()
            .position(|&c| c == self.start_index)
            .ok_or(EngineError::CorruptedPermutation {
                value: self.start_index,
            })?;
        let mut route = individual.to_vec();
        route.rotate_left(offset);

        if self.is_open_path() {
            let last = route.len() - 1;
            if route[last] != self.final_index {
                let at = route
                    .iter()
                    .position(|&c| c == self.final_index)
                    .ok_or(EngineError::CorruptedPermutation {
                        value: self.final_index,
                    })?;
                route.swap(at, last);
            }
        }

        Ok(route)
    }

    /// Total length of `individual` in canonical form.
    pub fn evaluate(&self, individual: &[usize]) -> Result<f64> {
        let route = self.canonical_route(individual)?;
        self.route_length(&route)
    }

    /// Scores every individual, in population order.
    pub fn evaluate_all(&self, population: &[Individual]) -> Result<Vec<f64>> {
        population.iter().map(|ind| self.evaluate(ind)).collect()
    }

    /// Length of an already-ordered route, closing the loop in cycle mode.
    ///
    /// # Errors
    /// [`EngineError::CorruptedPermutation`] if the route names a city that
    /// does not exist.
    pub fn route_length(&self, route: &[usize]) -> Result<f64> {
        let points = route
            .iter()
            .map(|&c| {
                self.cities
                    .get(c)
                    .ok_or(EngineError::CorruptedPermutation { value: c })
            })
            .collect::<Result<Vec<&City>>>()?;

        let mut total: f64 = points.windows(2).map(|w| w[0].distance_to(w[1])).sum();
        if !self.is_open_path() {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                total += last.distance_to(first);
            }
        }
        Ok(total)
    }
}

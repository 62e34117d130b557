//! Closed tour with a cached cost.

use std::fmt;

use crate::error::{Error, Result};
use crate::model::DistanceModel;

/// A closed tour anchored at city 0, together with its total length.
///
/// `cities` has `n + 1` entries: a permutation of `0..n` followed by a copy
/// of the anchor, so `cities[0] == cities[n] == 0`. The cached `cost` always
/// equals the sum of the tour's edge lengths; the sequence can only be
/// changed through methods that update both together.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouteState {
    cities: Vec<usize>,
    cost: f64,
}

impl RouteState {
    /// Anchor city every tour starts and ends at.
    pub const ANCHOR: usize = 0;

    /// Wraps an already validated sequence and its precomputed cost.
    pub(crate) fn from_parts(cities: Vec<usize>, cost: f64) -> Self {
        Self { cities, cost }
    }

    /// Builds a route from an explicit city sequence of length `n + 1`.
    ///
    /// The sequence must start and end at city 0 and visit every other city
    /// exactly once. The cost is computed from scratch.
    pub fn from_cities(model: &DistanceModel, cities: Vec<usize>) -> Result<Self> {
        let n = model.len();
        if cities.len() != n + 1 {
            return Err(Error::invalid_route(format!(
                "expected {} entries for {n} cities, got {}",
                n + 1,
                cities.len()
            )));
        }
        if cities[0] != Self::ANCHOR || cities[n] != Self::ANCHOR {
            return Err(Error::invalid_route("route must start and end at city 0"));
        }
        let mut seen = vec![false; n];
        for &city in &cities[..n] {
            if city >= n {
                return Err(Error::invalid_route(format!("city {city} out of range")));
            }
            if std::mem::replace(&mut seen[city], true) {
                return Err(Error::invalid_route(format!("city {city} visited twice")));
            }
        }

        let mut route = Self { cities, cost: 0.0 };
        route.recompute_cost(model);
        Ok(route)
    }

    /// Number of distinct cities in the tour.
    pub fn len(&self) -> usize {
        self.cities.len() - 1
    }

    /// Always `false`; a tour holds at least the anchor.
    pub fn is_empty(&self) -> bool {
        self.cities.len() <= 1
    }

    /// The closed city sequence, anchor included at both ends.
    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns an independent copy of this route.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Overwrites this route with `other` without reallocating.
    ///
    /// # Panics
    ///
    /// Panics if the two routes cover a different number of cities.
    pub fn copy_from(&mut self, other: &RouteState) {
        assert_eq!(
            self.cities.len(),
            other.cities.len(),
            "routes must have the same length to be copied"
        );
        self.cities.copy_from_slice(&other.cities);
        self.cost = other.cost;
    }

    /// Sums the tour edges from scratch without touching the cache.
    pub fn total_cost(&self, model: &DistanceModel) -> f64 {
        self.cities
            .windows(2)
            .map(|w| model.edge_cost(w[0], w[1]))
            .sum()
    }

    /// Recomputes the cached cost from scratch in O(n).
    pub fn recompute_cost(&mut self, model: &DistanceModel) {
        self.cost = self.total_cost(model);
    }

    /// Exchanges the cities at interior positions `i` and `j` and adjusts the
    /// cost over the edges incident to those positions only.
    ///
    /// # Panics
    ///
    /// Panics if either position is the anchor (0 or `n`) or out of range.
    pub fn swap_positions(&mut self, model: &DistanceModel, i: usize, j: usize) {
        let n = self.len();
        assert!(
            (1..n).contains(&i) && (1..n).contains(&j),
            "swap positions ({i}, {j}) must be interior to a tour of {n} cities"
        );
        if i == j {
            return;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };

        // Edge `e` joins positions `e` and `e + 1`. Adjacent positions share
        // the edge `lo`, so it is only counted once.
        let mut edges = [lo - 1, lo, hi - 1, hi];
        let count = if hi == lo + 1 {
            edges[2] = hi;
            3
        } else {
            4
        };
        let edges = &edges[..count];

        let before: f64 = edges.iter().map(|&e| self.edge(model, e)).sum();
        self.cities.swap(lo, hi);
        let after: f64 = edges.iter().map(|&e| self.edge(model, e)).sum();
        self.cost += after - before;
    }

    /// The tour as 1-based city numbers, anchor repeated at the end.
    pub fn one_based(&self) -> Vec<usize> {
        self.cities.iter().map(|&c| c + 1).collect()
    }

    #[inline]
    fn edge(&self, model: &DistanceModel, e: usize) -> f64 {
        model.edge_cost(self.cities[e], self.cities[e + 1])
    }
}

impl fmt::Display for RouteState {
    /// Renders the tour as space separated 1-based city numbers, e.g. `1 3 2 1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.cities.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first + 1)?;
        }
        for city in iter {
            write!(f, " {}", city + 1)?;
        }
        Ok(())
    }
}

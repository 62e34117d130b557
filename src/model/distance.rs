//! Precomputed symmetric distance table.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};

/// A city location in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Euclidean distance model over `n` cities.
///
/// The table is stored row-major. The diagonal holds `f64::INFINITY` so that
/// a minimum search over a row never selects the city itself.
///
/// # Examples
///
/// ```
/// use u_tsp_anneal::model::{DistanceModel, Point};
///
/// let model = DistanceModel::new(vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]).unwrap();
/// assert_eq!(model.distance(0, 1), 5.0);
/// assert_eq!(model.distance(1, 0), 5.0);
/// assert!(model.distance(0, 0).is_infinite());
/// ```
#[derive(Debug, Clone)]
pub struct DistanceModel {
    points: Vec<Point>,
    table: Vec<f64>,
}

impl DistanceModel {
    /// Builds the full `n x n` table in O(n²).
    ///
    /// Fails on an empty point list or on a non-finite coordinate.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInstance);
        }
        if let Some((index, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(Error::InvalidCoordinate {
                index,
                x: p.x,
                y: p.y,
            });
        }

        let n = points.len();
        let mut table = vec![0.0; n * n];
        let fill_row = |(i, row): (usize, &mut [f64])| {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = if i == j {
                    f64::INFINITY
                } else {
                    points[i].distance(&points[j])
                };
            }
        };

        #[cfg(feature = "parallel")]
        table.par_chunks_mut(n).enumerate().for_each(fill_row);

        #[cfg(not(feature = "parallel"))]
        table.chunks_mut(n).enumerate().for_each(fill_row);

        Ok(Self { points, table })
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a model cannot be built without cities.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, i: usize) -> Point {
        self.points[i]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Table distance between `i` and `j`; `+inf` when `i == j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.table[i * self.points.len() + j]
    }

    /// Cost of travelling the tour edge `a -> b`.
    ///
    /// Identical to [`distance`](Self::distance) except that a city-to-itself
    /// edge costs nothing, which only happens in the single-city tour `[0, 0]`.
    #[inline]
    pub fn edge_cost(&self, a: usize, b: usize) -> f64 {
        if a == b {
            0.0
        } else {
            self.distance(a, b)
        }
    }

    /// One row of the table.
    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.points.len();
        &self.table[i * n..(i + 1) * n]
    }
}

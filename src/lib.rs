//! Adaptive simulated annealing for the Traveling Salesman Problem on 2D
//! points.
//!
//! - **Model**: parsing of the `n` / `id x y` instance format and the
//!   precomputed Euclidean distance table.
//! - **Route**: closed tours anchored at city 0 with an always-consistent
//!   cached cost, and greedy nearest-neighbor construction.
//! - **SA**: the annealing engine, with windowed swap moves, the Metropolis
//!   acceptance rule, a self-calibrating geometric schedule and stagnation
//!   reheats.
//!
//! # Example
//!
//! ```
//! use u_tsp_anneal::model::DistanceModel;
//! use u_tsp_anneal::sa::{AnnealConfig, AnnealingEngine};
//!
//! let model = DistanceModel::parse("5\n1 0 0\n2 0 2\n3 1 3\n4 2 2\n5 2 0\n").unwrap();
//! let config = AnnealConfig::default().with_min_iterations(5_000).with_seed(7);
//! let result = AnnealingEngine::new(model, config).unwrap().run();
//!
//! assert_eq!(result.best.cities().len(), 6);
//! assert!(result.best_cost <= result.initial_cost);
//! ```

mod error;
pub mod logging;
pub mod model;
pub mod random;
pub mod route;
pub mod sa;

pub use error::{Error, Result};

//! Adaptive Simulated Annealing (SA) for closed tours.
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Worsening swaps are accepted with a probability that
//! shrinks with the temperature, allowing the search to escape local optima.
//! The starting temperature is calibrated from the instance itself, and the
//! schedule reheats when the best tour stops improving.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Bookstaber, D. (1997), "Simulated Annealing for Traveling Salesman Problem"

mod config;
mod moves;
mod runner;
mod schedule;

pub use config::AnnealConfig;
pub use moves::{MoveGenerator, MoveWindow, Swap};
pub use runner::{acceptance_probability, AnnealResult, AnnealingEngine};
pub use schedule::{Calibration, CoolingStep, TemperatureController};

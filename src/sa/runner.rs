//! Annealing loop.
//!
//! # Algorithm
//!
//! 1. Build the nearest-neighbor tour; it is both `current` and `best`
//! 2. Calibrate `T0` from a short exploratory walk
//! 3. While the temperature is above its target:
//!    a. Copy `current` into the candidate buffer and apply one swap
//!    b. Accept if not worse, otherwise with probability
//!    `exp((current - candidate) / T)` (Metropolis)
//!    c. Snapshot `best` on a strict improvement
//!    d. Cool, or reheat after prolonged stagnation
//! 4. Return `best`
//!
//! Instances with fewer than four cities admit no swap and return the
//! starting tour after zero iterations.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use super::config::AnnealConfig;
use super::moves::MoveGenerator;
use super::schedule::{Calibration, CoolingStep, TemperatureController};
use crate::error::Result;
use crate::model::DistanceModel;
use crate::random::rng_from_seed;
use crate::route::{nearest_neighbor, RouteState};

/// Result of an annealing run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnnealResult {
    /// The best tour found.
    pub best: RouteState,

    /// Cost of the best tour.
    pub best_cost: f64,

    /// Main-loop iteration at which the best tour was found (0 = the
    /// starting tour was never improved).
    pub best_iteration: usize,

    /// Total main-loop iterations.
    pub iterations: usize,

    /// Cost of the nearest-neighbor starting tour.
    pub initial_cost: f64,

    /// Calibrated starting temperature (0 when no annealing ran).
    pub initial_temperature: f64,

    /// Temperature when the loop stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of accepted moves that did not worsen the current tour.
    pub improving_moves: usize,

    /// Number of stagnation reheats.
    pub reheats: usize,

    /// Best cost sampled every report interval; non-increasing.
    pub cost_history: Vec<f64>,
}

impl AnnealResult {
    /// Relative improvement of the best tour over the starting tour, in percent.
    pub fn improvement_percent(&self) -> f64 {
        if self.initial_cost > 0.0 {
            (self.initial_cost - self.best_cost) / self.initial_cost * 100.0
        } else {
            0.0
        }
    }

    /// Position in the run at which the best tour was found, in `[0, 1]`.
    pub fn best_found_fraction(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.best_iteration as f64 / self.iterations as f64
        }
    }
}

/// Metropolis acceptance probability of moving from `current_cost` to
/// `candidate_cost` at temperature `temperature`.
///
/// Returns 1 for a candidate that is not worse, `exp((current - candidate) / T)`
/// otherwise, and 0 for a worsening candidate at a non-positive temperature.
///
/// # Examples
///
/// ```
/// use u_tsp_anneal::sa::acceptance_probability;
///
/// assert_eq!(acceptance_probability(10.0, 9.0, 1.0), 1.0);
/// assert!((acceptance_probability(10.0, 12.0, 2.0) - (-1.0f64).exp()).abs() < 1e-15);
/// ```
pub fn acceptance_probability(current_cost: f64, candidate_cost: f64, temperature: f64) -> f64 {
    if candidate_cost <= current_cost {
        1.0
    } else if temperature > 0.0 {
        ((current_cost - candidate_cost) / temperature).exp()
    } else {
        0.0
    }
}

/// One annealing run: the distance model, the configuration and the random
/// source. [`run`](Self::run) consumes the engine, so the current and best
/// tours and the temperature state live exactly as long as the loop.
pub struct AnnealingEngine<R = StdRng> {
    model: DistanceModel,
    config: AnnealConfig,
    rng: R,
}

impl AnnealingEngine<StdRng> {
    /// Creates an engine whose random source is seeded from `config.seed`.
    pub fn new(model: DistanceModel, config: AnnealConfig) -> Result<Self> {
        let rng = rng_from_seed(config.seed);
        Self::with_rng(model, config, rng)
    }
}

impl<R: Rng> AnnealingEngine<R> {
    /// Creates an engine with an explicit random source.
    pub fn with_rng(model: DistanceModel, config: AnnealConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config, rng })
    }

    pub fn model(&self) -> &DistanceModel {
        &self.model
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    /// Runs the annealing loop to completion.
    pub fn run(mut self) -> AnnealResult {
        let model = &self.model;
        let config = &self.config;
        let rng = &mut self.rng;

        let initial = nearest_neighbor(model);
        let initial_cost = initial.cost();
        debug!("initial cost: {initial_cost:.5}");

        let Some(moves) = MoveGenerator::new(model.len(), config.window) else {
            debug!(
                "{} cities admit no swap move, returning the starting tour",
                model.len()
            );
            return AnnealResult::unchanged(initial);
        };

        let calibration = Calibration::run(model, &initial, &moves, config, rng);
        debug!(
            "calibration: {} samples, cost range [{:.5}, {:.5}], melting point {:.6}",
            calibration.samples,
            calibration.min_cost,
            calibration.max_cost,
            calibration.melting_point
        );

        let mut schedule = TemperatureController::new(calibration.initial_temperature, config);
        debug!(
            "initial temperature: {:.6}, decay: {:.9}, window: {}",
            schedule.initial_temperature(),
            schedule.decay(),
            moves.window()
        );

        let mut current = initial.duplicate();
        let mut candidate = initial.duplicate();
        let mut best = initial;
        let mut best_iteration = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;

        let report_interval = config.effective_report_interval();
        let mut cost_history = vec![best.cost()];

        while schedule.is_running() {
            if config.max_iterations > 0 && schedule.iteration() >= config.max_iterations {
                break;
            }
            let iteration = schedule.iteration() + 1;

            let swap = moves.propose(rng);
            candidate.copy_from(&current);
            candidate.swap_positions(model, swap.first, swap.second);

            let accept = if candidate.cost() <= current.cost() {
                improving_moves += 1;
                true
            } else {
                let p = acceptance_probability(
                    current.cost(),
                    candidate.cost(),
                    schedule.temperature(),
                );
                rng.random::<f64>() < p
            };

            let mut improved = false;
            if accept {
                std::mem::swap(&mut current, &mut candidate);
                accepted_moves += 1;

                if current.cost() < best.cost() {
                    best.copy_from(&current);
                    best_iteration = iteration;
                    improved = true;
                }
            }

            if schedule.advance(improved) == CoolingStep::Reheated {
                debug!(
                    "iteration {iteration}: stagnation, reheated to {:.6}",
                    schedule.temperature()
                );
            }

            if iteration % report_interval == 0 {
                cost_history.push(best.cost());
                debug!(
                    "iteration {iteration}: temperature {:.6}, cost {:.5}, best {:.5}",
                    schedule.temperature(),
                    current.cost(),
                    best.cost()
                );
            }
        }

        if cost_history
            .last()
            .is_none_or(|&last| (last - best.cost()).abs() > 1e-15)
        {
            cost_history.push(best.cost());
        }

        let result = AnnealResult {
            best_cost: best.cost(),
            best,
            best_iteration,
            iterations: schedule.iteration(),
            initial_cost,
            initial_temperature: schedule.initial_temperature(),
            final_temperature: schedule.temperature(),
            accepted_moves,
            improving_moves,
            reheats: schedule.reheats(),
            cost_history,
        };

        info!(
            "best cost {:.5} found at iteration {} of {} ({:.2}% into the run), {:.2}% better than the starting tour",
            result.best_cost,
            result.best_iteration,
            result.iterations,
            result.best_found_fraction() * 100.0,
            result.improvement_percent()
        );
        result
    }
}

impl AnnealResult {
    fn unchanged(initial: RouteState) -> Self {
        let cost = initial.cost();
        Self {
            best: initial,
            best_cost: cost,
            best_iteration: 0,
            iterations: 0,
            initial_cost: cost,
            initial_temperature: 0.0,
            final_temperature: 0.0,
            accepted_moves: 0,
            improving_moves: 0,
            reheats: 0,
            cost_history: vec![cost],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use crate::random::create_rng;
    use crate::sa::MoveWindow;

    fn random_model(n: usize, seed: u64) -> DistanceModel {
        let mut rng = create_rng(seed);
        let points = (0..n)
            .map(|_| Point::new(rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
            .collect();
        DistanceModel::new(points).unwrap()
    }

    fn quick_config(seed: u64) -> AnnealConfig {
        AnnealConfig::default()
            .with_min_iterations(20_000)
            .with_window(MoveWindow::Fixed(10))
            .with_seed(seed)
    }

    fn assert_valid_tour(route: &RouteState, model: &DistanceModel) {
        let n = model.len();
        let cities = route.cities();
        assert_eq!(cities.len(), n + 1);
        assert_eq!(cities[0], 0);
        assert_eq!(cities[n], 0);
        let mut sorted = cities[..n].to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
        let exact = route.total_cost(model);
        assert!(
            (route.cost() - exact).abs() <= 1e-9 * exact.max(1.0),
            "cached cost {} vs exact {}",
            route.cost(),
            exact
        );
    }

    #[test]
    fn test_unit_square_cost_four() {
        let model = DistanceModel::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ])
        .unwrap();
        let engine = AnnealingEngine::new(model.clone(), quick_config(42)).unwrap();
        let result = engine.run();

        assert!((result.best_cost - 4.0).abs() < 1e-9);
        assert_valid_tour(&result.best, &model);
    }

    #[test]
    fn test_degenerate_instances_skip_annealing() {
        for n in 1..4 {
            let model = random_model(n, n as u64);
            let initial = nearest_neighbor(&model);
            let result = AnnealingEngine::new(model.clone(), quick_config(1))
                .unwrap()
                .run();
            assert_eq!(result.iterations, 0);
            assert_eq!(result.best, initial);
            assert_eq!(result.best_cost, initial.cost());
            assert_eq!(result.best_iteration, 0);
            assert_valid_tour(&result.best, &model);
        }
    }

    #[test]
    fn test_single_city() {
        let model = DistanceModel::new(vec![Point::new(2.0, 3.0)]).unwrap();
        let result = AnnealingEngine::new(model, quick_config(3)).unwrap().run();
        assert_eq!(result.best.cities(), &[0, 0]);
        assert_eq!(result.best_cost, 0.0);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.improvement_percent(), 0.0);
    }

    #[test]
    fn test_run_improves_on_nearest_neighbor() {
        let model = random_model(60, 7);
        let initial_cost = nearest_neighbor(&model).cost();
        let result = AnnealingEngine::new(model.clone(), quick_config(11))
            .unwrap()
            .run();

        assert_valid_tour(&result.best, &model);
        assert!(result.iterations >= 20_000);
        assert!(result.best_cost <= initial_cost + 1e-9);
        assert_eq!(result.initial_cost, initial_cost);
        assert!(result.initial_temperature > 0.0);
        assert!(result.final_temperature <= result.initial_temperature * 0.1);
        assert!(result.accepted_moves >= result.improving_moves);
        assert!(result.best_iteration <= result.iterations);
        assert!(result.improvement_percent() >= 0.0);
        assert!((0.0..=1.0).contains(&result.best_found_fraction()));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let model = random_model(50, 19);
        let a = AnnealingEngine::new(model.clone(), quick_config(99))
            .unwrap()
            .run();
        let b = AnnealingEngine::new(model, quick_config(99)).unwrap().run();

        assert_eq!(a.best.cities(), b.best.cities());
        assert_eq!(a.best_cost, b.best_cost);
        assert_eq!(a.best_iteration, b.best_iteration);
        assert_eq!(a.iterations, b.iterations);
        assert_eq!(a.accepted_moves, b.accepted_moves);
        assert_eq!(a.reheats, b.reheats);
        assert_eq!(a.cost_history, b.cost_history);
    }

    #[test]
    fn test_explicit_rng_matches_seeded_config() {
        let model = random_model(30, 4);
        let config = quick_config(5);
        let a = AnnealingEngine::new(model.clone(), config.clone())
            .unwrap()
            .run();
        let b = AnnealingEngine::with_rng(model, config, create_rng(5))
            .unwrap()
            .run();
        assert_eq!(a.best.cities(), b.best.cities());
        assert_eq!(a.accepted_moves, b.accepted_moves);
    }

    #[test]
    fn test_max_iterations_caps_run() {
        let model = random_model(40, 8);
        let config = quick_config(2).with_max_iterations(500);
        let result = AnnealingEngine::new(model, config).unwrap().run();
        assert_eq!(result.iterations, 500);
    }

    #[test]
    fn test_stagnation_reheats_extend_run() {
        let model = random_model(50, 31);
        let config = quick_config(9)
            .with_stagnation_fraction(0.001)
            .with_reheat_boost(0.5);
        let result = AnnealingEngine::new(model.clone(), config).unwrap().run();

        assert!(result.reheats > 0, "expected stagnation reheats");
        assert!(
            result.iterations > 20_000,
            "reheats should push the run past its budget, got {} iterations",
            result.iterations
        );
        assert!(result.final_temperature <= result.initial_temperature * 0.1);
        assert_valid_tour(&result.best, &model);
    }

    #[test]
    fn test_cost_history_non_increasing() {
        let model = random_model(40, 13);
        let config = quick_config(6).with_report_interval(250);
        let result = AnnealingEngine::new(model, config).unwrap().run();

        assert!(result.cost_history.len() > 2);
        for window in result.cost_history.windows(2) {
            assert!(
                window[1] <= window[0] + 1e-10,
                "best cost history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
        let last = *result.cost_history.last().unwrap();
        assert!((last - result.best_cost).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let model = random_model(10, 1);
        let config = AnnealConfig::default().with_target_temperature_fraction(2.0);
        assert!(AnnealingEngine::new(model, config).is_err());
    }

    #[test]
    fn test_acceptance_probability_formula() {
        let mut rng = create_rng(17);
        for _ in 0..1_000 {
            let old: f64 = rng.random_range(0.0..1_000.0);
            let new: f64 = old + rng.random_range(1e-6..100.0);
            let t: f64 = rng.random_range(1e-3..500.0);
            let p = acceptance_probability(old, new, t);
            assert_eq!(p, ((old - new) / t).exp());
            assert!((0.0..1.0).contains(&p));
        }
    }

    #[test]
    fn test_acceptance_probability_limits() {
        assert_eq!(acceptance_probability(5.0, 5.0, 1.0), 1.0);
        assert_eq!(acceptance_probability(5.0, 4.0, 0.0), 1.0);
        assert_eq!(acceptance_probability(5.0, 6.0, 0.0), 0.0);
        assert!(acceptance_probability(5.0, 6.0, 1e12) > 0.999_999);
        assert!(acceptance_probability(5.0, 6.0, 1e-6) < 1e-12);
    }

    #[test]
    fn test_high_temperature_accepts_most_moves() {
        let model = random_model(40, 23);
        // A large melting fraction keeps T far above typical deltas.
        let config = quick_config(8)
            .with_melting_fraction(1e6)
            .with_max_iterations(5_000);
        let result = AnnealingEngine::new(model, config).unwrap().run();
        let ratio = result.accepted_moves as f64 / result.iterations as f64;
        assert!(ratio > 0.8, "expected high acceptance at high temp, got {ratio}");
    }
}

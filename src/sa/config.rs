//! Annealing configuration.

use super::moves::MoveWindow;
use crate::error::{Error, Result};

/// Configuration for the adaptive annealing run.
///
/// Every parameter has a default; the `with_*` builders override one at a
/// time.
///
/// # Examples
///
/// ```
/// use u_tsp_anneal::sa::{AnnealConfig, MoveWindow};
///
/// let config = AnnealConfig::default()
///     .with_min_iterations(50_000)
///     .with_melting_fraction(0.5)
///     .with_window(MoveWindow::Fixed(20))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnealConfig {
    /// Iterations the temperature needs to fall from `T0` to the target
    /// without reheats. Reheats can extend the run past this budget.
    pub min_iterations: usize,

    /// Share of the calibrated melting point used as the initial temperature.
    pub melting_fraction: f64,

    /// The run stops once `T <= T0 * target_temperature_fraction`. In (0, 1).
    pub target_temperature_fraction: f64,

    /// Iterations without a new best, as a share of `min_iterations`, that
    /// trigger a reheat.
    pub stagnation_fraction: f64,

    /// Reheat strength. A reheat multiplies `T` by
    /// `1 + reheat_boost * remaining / min_iterations`. Zero disables reheats.
    pub reheat_boost: f64,

    /// Maximum distance between the two swapped tour positions.
    pub window: MoveWindow,

    /// Calibration sample count as a share of `min_iterations` (at least 2).
    pub calibration_fraction: f64,

    /// Fixed probability of accepting a worsening move during calibration.
    pub calibration_acceptance: f64,

    /// Hard cap on main-loop iterations. 0 = no cap.
    pub max_iterations: usize,

    /// Iterations between progress snapshots. 0 = `min_iterations / 10`.
    pub report_interval: usize,

    /// Random seed for reproducibility. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            min_iterations: 1_000_000,
            melting_fraction: 0.7,
            target_temperature_fraction: 0.1,
            stagnation_fraction: 0.01,
            reheat_boost: 0.05,
            window: MoveWindow::default(),
            calibration_fraction: 0.01,
            calibration_acceptance: 0.05,
            max_iterations: 0,
            report_interval: 0,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_min_iterations(mut self, n: usize) -> Self {
        self.min_iterations = n;
        self
    }

    pub fn with_melting_fraction(mut self, fraction: f64) -> Self {
        self.melting_fraction = fraction;
        self
    }

    pub fn with_target_temperature_fraction(mut self, fraction: f64) -> Self {
        self.target_temperature_fraction = fraction;
        self
    }

    pub fn with_stagnation_fraction(mut self, fraction: f64) -> Self {
        self.stagnation_fraction = fraction;
        self
    }

    pub fn with_reheat_boost(mut self, boost: f64) -> Self {
        self.reheat_boost = boost;
        self
    }

    pub fn with_window(mut self, window: MoveWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_calibration_fraction(mut self, fraction: f64) -> Self {
        self.calibration_fraction = fraction;
        self
    }

    pub fn with_calibration_acceptance(mut self, probability: f64) -> Self {
        self.calibration_acceptance = probability;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_report_interval(mut self, n: usize) -> Self {
        self.report_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Per-iteration multiplicative cooling factor.
    ///
    /// Chosen so that `min_iterations` undisturbed steps take the
    /// temperature from `T0` to `T0 * target_temperature_fraction`.
    pub fn decay_factor(&self) -> f64 {
        self.target_temperature_fraction
            .powf(1.0 / self.min_iterations as f64)
    }

    /// Iterations without improvement that trigger a reheat.
    pub fn stagnation_limit(&self) -> usize {
        ((self.stagnation_fraction * self.min_iterations as f64).round() as usize).max(1)
    }

    /// Number of exploratory iterations run before the main loop.
    pub fn calibration_samples(&self) -> usize {
        ((self.calibration_fraction * self.min_iterations as f64).ceil() as usize).max(2)
    }

    /// Effective snapshot interval.
    pub fn effective_report_interval(&self) -> usize {
        if self.report_interval > 0 {
            self.report_interval
        } else {
            (self.min_iterations / 10).max(1)
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.min_iterations == 0 {
            return Err(Error::invalid_config("min_iterations must be positive"));
        }
        if !(self.melting_fraction > 0.0 && self.melting_fraction.is_finite()) {
            return Err(Error::invalid_config(format!(
                "melting_fraction must be positive, got {}",
                self.melting_fraction
            )));
        }
        let target = self.target_temperature_fraction;
        if !(target > 0.0 && target < 1.0) {
            return Err(Error::invalid_config(format!(
                "target_temperature_fraction must be in (0, 1), got {target}"
            )));
        }
        if !(self.stagnation_fraction > 0.0 && self.stagnation_fraction.is_finite()) {
            return Err(Error::invalid_config(format!(
                "stagnation_fraction must be positive, got {}",
                self.stagnation_fraction
            )));
        }
        if !(self.reheat_boost >= 0.0 && self.reheat_boost.is_finite()) {
            return Err(Error::invalid_config(format!(
                "reheat_boost must be non-negative, got {}",
                self.reheat_boost
            )));
        }
        if !(self.calibration_fraction > 0.0 && self.calibration_fraction.is_finite()) {
            return Err(Error::invalid_config(format!(
                "calibration_fraction must be positive, got {}",
                self.calibration_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.calibration_acceptance) {
            return Err(Error::invalid_config(format!(
                "calibration_acceptance must be in [0, 1], got {}",
                self.calibration_acceptance
            )));
        }
        match self.window {
            MoveWindow::Fixed(k) if k < 2 => {
                return Err(Error::invalid_config(format!(
                    "fixed move window must be at least 2, got {k}"
                )));
            }
            MoveWindow::Scaled { fraction, .. } if !(fraction >= 0.0 && fraction.is_finite()) => {
                return Err(Error::invalid_config(format!(
                    "scaled move window fraction must be non-negative, got {fraction}"
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

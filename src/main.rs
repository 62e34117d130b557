use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use u_tsp_anneal::logging::init_logger;
use u_tsp_anneal::model::DistanceModel;
use u_tsp_anneal::sa::{AnnealConfig, AnnealingEngine, MoveWindow};

/// Solves a 2D TSP instance with adaptive simulated annealing and prints the
/// tour as 1-based city numbers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Instance file (`n` followed by `id x y` lines). Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Print calibration, progress and summary diagnostics to stderr.
    #[arg(short, long)]
    debug: bool,

    /// Iterations for the temperature to reach its target without reheats.
    #[arg(long)]
    min_iterations: Option<usize>,

    /// Share of the calibrated melting point used as the initial temperature.
    #[arg(long)]
    melting_fraction: Option<f64>,

    /// Stop once the temperature falls to this share of the initial one.
    #[arg(long)]
    target_fraction: Option<f64>,

    /// Iterations without improvement, as a share of the budget, before a reheat.
    #[arg(long)]
    stagnation_fraction: Option<f64>,

    /// Reheat strength.
    #[arg(long)]
    reheat_boost: Option<f64>,

    /// Fixed maximum distance between swapped positions. Scales with the
    /// instance size when omitted.
    #[arg(long, conflicts_with_all = ["window_fraction", "window_floor"])]
    window: Option<usize>,

    /// Share of the city count used as the swap window.
    #[arg(long)]
    window_fraction: Option<f64>,

    /// Smallest swap window on small instances.
    #[arg(long)]
    window_floor: Option<usize>,

    /// Calibration samples as a share of the iteration budget.
    #[arg(long)]
    calibration_fraction: Option<f64>,

    /// Acceptance probability of uphill moves during calibration.
    #[arg(long)]
    calibration_acceptance: Option<f64>,

    /// Iterations between progress reports and cost history samples.
    #[arg(long)]
    report_interval: Option<usize>,

    /// Hard cap on annealing iterations.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Random seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn config(&self) -> AnnealConfig {
        let mut config = AnnealConfig::default();
        if let Some(n) = self.min_iterations {
            config = config.with_min_iterations(n);
        }
        if let Some(f) = self.melting_fraction {
            config = config.with_melting_fraction(f);
        }
        if let Some(f) = self.target_fraction {
            config = config.with_target_temperature_fraction(f);
        }
        if let Some(f) = self.stagnation_fraction {
            config = config.with_stagnation_fraction(f);
        }
        if let Some(b) = self.reheat_boost {
            config = config.with_reheat_boost(b);
        }
        if let Some(window) = self.window() {
            config = config.with_window(window);
        }
        if let Some(f) = self.calibration_fraction {
            config = config.with_calibration_fraction(f);
        }
        if let Some(p) = self.calibration_acceptance {
            config = config.with_calibration_acceptance(p);
        }
        if let Some(n) = self.report_interval {
            config = config.with_report_interval(n);
        }
        if let Some(n) = self.max_iterations {
            config = config.with_max_iterations(n);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    fn window(&self) -> Option<MoveWindow> {
        if let Some(k) = self.window {
            return Some(MoveWindow::Fixed(k));
        }
        if self.window_fraction.is_none() && self.window_floor.is_none() {
            return None;
        }
        let MoveWindow::Scaled { fraction, floor } = MoveWindow::default() else {
            return None;
        };
        Some(MoveWindow::Scaled {
            fraction: self.window_fraction.unwrap_or(fraction),
            floor: self.window_floor.unwrap_or(floor),
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.debug)?;

    let model = match &args.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            DistanceModel::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to read instance {}", path.display()))?
        }
        None => DistanceModel::from_reader(io::stdin().lock())
            .context("failed to read instance from stdin")?,
    };

    let engine = AnnealingEngine::new(model, args.config()).context("invalid configuration")?;
    let result = engine.run();

    println!("{}", result.best);
    Ok(())
}

//! Diagnostic output setup for the command-line front end.
//!
//! The library reports through the `log` facade: run summaries at `info`,
//! calibration and progress snapshots at `debug`. Nothing is printed unless
//! a logger is installed with a level that lets those records through.

use std::io::Write;

use env_logger::{fmt::Formatter, Builder, Target};
use log::{Level, LevelFilter};

use crate::{Error, Result};

/// Installs a compact stderr logger.
///
/// `verbose` enables `debug` records; otherwise logging is off so standard
/// output carries only the tour.
pub fn init_logger(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Off
    };

    Builder::new()
        .filter_level(level)
        .write_style(env_logger::WriteStyle::Never)
        .format(|buf: &mut Formatter, record| {
            writeln!(buf, "{} {}", level_tag(record.level()), record.args())
        })
        .target(Target::Stderr)
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

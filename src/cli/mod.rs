// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code. More specific options for `selfcal`
//! subcommands are contained in modules.
//!
//! Only 3 things should be public in this module: `SelfCal`,
//! `SelfCal::run`, and `SelfCalError` (re-exported from the crate
//! root).

mod fringes;
mod noise;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;

use crate::SelfCalError;

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Self-calibration fringe synthesis and map-noise analysis for a bolometric interferometer"
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct SelfCal {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,

    /// Only verify that arguments were correctly ingested and print out
    /// high-level information.
    #[clap(long)]
    #[clap(global = true)]
    dry_run: bool,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    #[clap(alias = "fringes")]
    #[clap(about = "Synthesise the fringes of baselines on the focal plane from the seven horn-switch configurations.")]
    Fringes(fringes::FringesArgs),

    #[clap(alias = "fringes-aberration")]
    #[clap(about = "Synthesise fringes from measured per-horn aberration files instead of the ideal optics model.")]
    FringesAberration(fringes::FringesAberrationArgs),

    #[clap(alias = "noise-analysis")]
    #[clap(about = "Estimate zoned pixel-pixel noise covariance/correlation from an ensemble of map realizations.")]
    NoiseAnalysis(noise::NoiseAnalysisArgs),

    #[clap(alias = "make-realizations")]
    #[clap(about = "Fabricate a synthetic ensemble of map realization files for exercising the noise analysis.")]
    MakeRealizations(noise::MakeRealizationsArgs),
}

impl SelfCal {
    pub fn run(self) -> Result<(), SelfCalError> {
        // Set up logging.
        let GlobalArgs { verbosity, dry_run } = self.global_opts;
        setup_logging(verbosity).expect("Failed to initialise logging.");

        let sub_command = match &self.command {
            Command::Fringes(_) => "fringes",
            Command::FringesAberration(_) => "fringes-aberration",
            Command::NoiseAnalysis(_) => "noise-analysis",
            Command::MakeRealizations(_) => "make-realizations",
        };
        info!("selfcal {} {}", sub_command, env!("CARGO_PKG_VERSION"));

        match self.command {
            Command::Fringes(args) => args.run(dry_run)?,
            Command::FringesAberration(args) => args.run(dry_run)?,
            Command::NoiseAnalysis(args) => args.run(dry_run)?,
            Command::MakeRealizations(args) => args.run(dry_run)?,
        }

        info!("selfcal {} complete.", sub_command);
        Ok(())
    }
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();

    Ok(())
}

/// Today's date in the `YYYYMMDD` form used as output filename prefix.
fn date_prefix() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// Parse a baseline given on the command line as two comma-separated
/// horn numbers, e.g. "25,57".
fn parse_baseline(s: &str) -> Result<crate::instrument::Baseline, SelfCalError> {
    let mut split = s.split(',').map(|part| part.trim().parse::<usize>());
    match (split.next(), split.next(), split.next()) {
        (Some(Ok(first)), Some(Ok(second)), None) => {
            Ok(crate::instrument::Baseline::new(first, second)?)
        }
        _ => Err(SelfCalError::BadBaseline(s.to_string())),
    }
}

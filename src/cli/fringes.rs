// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::Parser;
use itertools::Itertools;
use log::info;
use ndarray::prelude::*;
use vec1::vec1;

use super::{date_prefix, parse_baseline};
use crate::{
    constants::FP_SIDE,
    focalplane::{detector_mask, image_to_tes_signal},
    fringes::{combine_fringes_aberration, power_combinations, AberrationSet},
    instrument::{DeadSwitchSet, HornArray, InstrumentKind},
    optics::{IdealOptics, SourceParams, SourcePointing},
    SelfCalError,
};

/// Synthesise fringes with the ideal optics model.
#[derive(Parser, Debug)]
pub(super) struct FringesArgs {
    /// The baselines to synthesise, each as two comma-separated horn
    /// numbers (e.g. "25,57").
    #[clap(name = "BASELINES", required = true)]
    baselines: Vec<String>,

    /// Horns whose switches are stuck closed. These degrade the
    /// "realistic" patterns but are bypassed by the single-horn and
    /// baseline-only patterns.
    #[clap(long, multiple_values = true)]
    dead_switches: Vec<usize>,

    /// Source zenith angle [degrees].
    #[clap(long, allow_hyphen_values = true, default_value = "0.0")]
    theta_deg: f64,

    /// Source azimuth [degrees].
    #[clap(long, allow_hyphen_values = true, default_value = "0.0")]
    phi_deg: f64,

    /// Source frequency [GHz]. Overrides the parameter file.
    #[clap(long)]
    freq_ghz: Option<f64>,

    /// Sample-pixel count along one side of the focal-plane image.
    /// Overrides the parameter file.
    #[clap(long)]
    reso: Option<usize>,

    /// All of the source/grid parameters may be specified in a TOML
    /// file. Any CLI arguments override parameters set in the file.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Directory to write the fringe images (and plots) into.
    #[clap(short, long, default_value = ".")]
    outdir: PathBuf,

    /// Label used in output filenames.
    #[clap(long, default_value = "fringes")]
    name: String,
}

impl FringesArgs {
    pub(super) fn run(&self, dry_run: bool) -> Result<(), SelfCalError> {
        let baselines = self
            .baselines
            .iter()
            .map(|s| parse_baseline(s))
            .collect::<Result<Vec<_>, _>>()?;
        let dead = DeadSwitchSet::new(self.dead_switches.clone())?;
        let params = self.source_params()?;
        let pointings = vec1![SourcePointing {
            theta: self.theta_deg.to_radians(),
            phi: self.phi_deg.to_radians(),
        }];

        info!(
            "{} baseline(s), source at (theta, phi) = ({}, {}) deg, {} GHz, {reso} x {reso} image",
            baselines.len(),
            self.theta_deg,
            self.phi_deg,
            params.freq_hz / 1e9,
            reso = params.reso,
        );
        if dry_run {
            return Ok(());
        }

        let model = IdealOptics::default();
        let date = date_prefix();
        std::fs::create_dir_all(&self.outdir)?;
        for baseline in baselines {
            let combos = power_combinations(&model, baseline, &dead, &pointings, params);
            let fringes = combos.combine();
            let base = format!(
                "{date}_{}_{}_{}",
                self.name,
                baseline.first(),
                baseline.second()
            );

            write_image(
                &self.outdir.join(format!("{base}.dat")),
                fringes.slice(s![.., .., 0]),
            )?;
            // When the sample grid matches the physical focal plane,
            // also write the detector-masked image and its unfolded
            // per-channel signals.
            if params.reso == FP_SIDE {
                let masked = &fringes.slice(s![.., .., 0]) * &detector_mask();
                write_image(&self.outdir.join(format!("{base}_masked.dat")), masked.view())?;
                let tes_signal = image_to_tes_signal(masked.view())?;
                write_image(
                    &self.outdir.join(format!("{base}_tes.dat")),
                    tes_signal.view(),
                )?;
            }
            #[cfg(feature = "plotting")]
            crate::plotting::plot_power_combinations(
                &combos,
                0,
                &format!("baseline {baseline}"),
                &self.outdir.join(format!("{base}.png")),
            )?;
        }
        Ok(())
    }

    /// Parameter-file values, overridden by any CLI arguments.
    fn source_params(&self) -> Result<SourceParams, SelfCalError> {
        let mut params: SourceParams = match &self.config {
            Some(file) => toml::from_str(&std::fs::read_to_string(file)?)?,
            None => SourceParams::default(),
        };
        if let Some(freq_ghz) = self.freq_ghz {
            params.freq_hz = freq_ghz * 1e9;
        }
        if let Some(reso) = self.reso {
            params.reso = reso;
        }
        Ok(params)
    }
}

/// Synthesise fringes from per-horn aberration files.
#[derive(Parser, Debug)]
pub(super) struct FringesAberrationArgs {
    /// Directory holding one tab-separated sample file per horn.
    #[clap(name = "DATA_DIR")]
    data_dir: PathBuf,

    /// The baselines to synthesise, each as two comma-separated horn
    /// numbers (e.g. "25,57").
    #[clap(name = "BASELINES", required = true)]
    baselines: Vec<String>,

    /// Source zenith angle [degrees].
    #[clap(long, allow_hyphen_values = true, default_value = "0.0")]
    theta_deg: f64,

    /// Source frequency [GHz].
    #[clap(long, default_value = "150.0")]
    freq_ghz: f64,

    /// Directory to write the fringe images (and plots) into.
    #[clap(short, long, default_value = ".")]
    outdir: PathBuf,

    /// Label used in output filenames.
    #[clap(long, default_value = "fringes_aberration")]
    name: String,
}

impl FringesAberrationArgs {
    pub(super) fn run(&self, dry_run: bool) -> Result<(), SelfCalError> {
        let baselines = self
            .baselines
            .iter()
            .map(|s| parse_baseline(s))
            .collect::<Result<Vec<_>, _>>()?;
        let set = AberrationSet::load(&self.data_dir)?;
        info!(
            "{} baseline(s), source at theta = {} deg, {} GHz, {nn} x {nn} samples",
            baselines.len(),
            self.theta_deg,
            self.freq_ghz,
            nn = set.sampling(),
        );
        if dry_run {
            return Ok(());
        }

        let horn_array = HornArray::td();
        let date = date_prefix();
        std::fs::create_dir_all(&self.outdir)?;
        for baseline in baselines {
            let fringes = combine_fringes_aberration(
                InstrumentKind::TD,
                &set,
                baseline,
                &horn_array,
                self.theta_deg,
                self.freq_ghz,
            )?;
            // The sample files are in the simulation frame; rotate into
            // the ONAFP frame so both fringe paths write the same view.
            let fringes = crate::math::rot90_cw(fringes.view());
            let base = format!(
                "{date}_{}_{}_{}",
                self.name,
                baseline.first(),
                baseline.second()
            );

            write_image(&self.outdir.join(format!("{base}.dat")), fringes.view())?;
            #[cfg(feature = "plotting")]
            crate::plotting::plot_fringe(
                fringes.view(),
                &format!("baseline {baseline}"),
                &self.outdir.join(format!("{base}.png")),
            )?;
        }
        Ok(())
    }
}

/// Dump one image as a plain numeric text file, one row per line.
fn write_image(path: &Path, image: ArrayView2<f64>) -> Result<(), SelfCalError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for row in image.outer_iter() {
        let line = row.iter().map(|v| format!("{v:.10e}")).join(" ");
        writeln!(writer, "{line}")?;
    }
    info!("Wrote {}", path.display());
    Ok(())
}

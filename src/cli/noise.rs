// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use log::{debug, info};
use ndarray::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use super::date_prefix;
use crate::{
    analysis::{
        covcorr_between_pixels, correlation_distance, dump_covcorr, extract_zone,
        residuals_from_ensemble, zone_assignment,
    },
    ensemble::{
        discover_realizations, realization_filename,
        synthetic::{synthesize_realization, SyntheticParams},
        PatchEnsemble, STOKES,
    },
    SelfCalError,
};

/// Zoned noise covariance/correlation analysis of a realization
/// ensemble.
#[derive(Parser, Debug)]
pub(super) struct NoiseAnalysisArgs {
    /// Directory holding the realization FITS files.
    #[clap(name = "DIR")]
    dir: PathBuf,

    /// The simulation name embedded in the realization filenames.
    #[clap(name = "NAME")]
    name: String,

    /// Analyse the noiseless companion files instead of the noisy ones.
    #[clap(long)]
    noiseless: bool,

    /// Number of angular zones to split the patch into.
    #[clap(short = 'z', long, default_value = "4")]
    n_zones: usize,

    /// Patch centre longitude [degrees].
    #[clap(long, allow_hyphen_values = true, default_value = "0.0")]
    center_lon_deg: f64,

    /// Patch centre latitude [degrees].
    #[clap(long, allow_hyphen_values = true, default_value = "-57.0")]
    center_lat_deg: f64,

    /// Directory to write the matrix dumps (and plots) into.
    #[clap(short, long, default_value = ".")]
    outdir: PathBuf,
}

impl NoiseAnalysisArgs {
    pub(super) fn run(&self, dry_run: bool) -> Result<(), SelfCalError> {
        let files = discover_realizations(&self.dir, &self.name, self.noiseless)?;
        info!(
            "{} realization file(s) for '{}' (noiseless: {}), {} zone(s)",
            files.len(),
            self.name,
            self.noiseless,
            self.n_zones
        );
        if dry_run {
            return Ok(());
        }

        let ensemble = PatchEnsemble::load(&files)?;
        info!(
            "{} subband(s), {} patch pixel(s), nside {}",
            ensemble.num_subbands(),
            ensemble.num_patch_pixels(),
            ensemble.nside
        );
        let residuals = residuals_from_ensemble(ensemble.patches.view())?;
        let zones = zone_assignment(
            self.n_zones,
            ensemble.nside,
            self.center_lon_deg,
            self.center_lat_deg,
            &ensemble.seen,
        )?;

        let date = date_prefix();
        std::fs::create_dir_all(&self.outdir)?;
        for (izone, zone) in zones.iter().enumerate() {
            let zone_residuals = extract_zone(residuals.view(), zone);
            let (cov, corr) = covcorr_between_pixels(zone_residuals.view())?;

            // One correlation-distance table per zone: a line per
            // subband, a column per Stokes component.
            let corrdist_path = self
                .outdir
                .join(format!("{date}_{}_corrdist_zone{}.dat", self.name, izone + 1));
            let mut corrdist = BufWriter::new(File::create(&corrdist_path)?);
            writeln!(corrdist, "# subband {}", STOKES.join(" "))?;
            for isub in 0..corr.dim().0 {
                write!(corrdist, "{}", isub + 1)?;
                for (istk, stokes) in STOKES.iter().enumerate() {
                    let dist = correlation_distance(corr.slice(s![isub, istk, .., ..]));
                    debug!(
                        "zone {}, subband {}, {stokes}: correlation distance {dist:.4}",
                        izone + 1,
                        isub + 1,
                    );
                    write!(corrdist, " {dist:.10e}")?;
                }
                writeln!(corrdist)?;
            }
            info!("Wrote {}", corrdist_path.display());

            let cov_prefix = format!("{date}_{}_cov_zone{}", self.name, izone + 1);
            let corr_prefix = format!("{date}_{}_corr_zone{}", self.name, izone + 1);
            dump_covcorr(&self.outdir, &cov_prefix, cov.view())?;
            dump_covcorr(&self.outdir, &corr_prefix, corr.view())?;

            #[cfg(feature = "plotting")]
            for isub in 0..corr.dim().0 {
                for (istk, stokes) in STOKES.iter().enumerate() {
                    let output = self
                        .outdir
                        .join(format!("{corr_prefix}_{stokes}_subband{}.png", isub + 1));
                    crate::plotting::plot_matrix(
                        corr.slice(s![isub, istk, .., ..]),
                        &format!("corr zone {} {stokes} subband {}", izone + 1, isub + 1),
                        &output,
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Fabricate a synthetic realization ensemble on disk.
#[derive(Parser, Debug)]
pub(super) struct MakeRealizationsArgs {
    /// Number of realizations to write.
    #[clap(short, long, default_value = "10")]
    num_realizations: usize,

    /// Seed for the noise generator. Unseeded runs are not
    /// reproducible.
    #[clap(long)]
    seed: Option<u64>,

    /// Healpix nside of the maps. Overrides the parameter file.
    #[clap(long)]
    nside: Option<usize>,

    /// Number of frequency subbands. Overrides the parameter file.
    #[clap(long)]
    num_subbands: Option<usize>,

    /// White-noise RMS. Overrides the parameter file.
    #[clap(long)]
    noise_rms: Option<f64>,

    /// All of the map parameters may be specified in a TOML file. Any
    /// CLI arguments override parameters set in the file.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Directory to write the FITS files into.
    #[clap(short, long, default_value = ".")]
    outdir: PathBuf,

    /// The simulation name embedded in the filenames.
    #[clap(long, default_value = "syntreals")]
    name: String,
}

impl MakeRealizationsArgs {
    pub(super) fn run(&self, dry_run: bool) -> Result<(), SelfCalError> {
        let mut params: SyntheticParams = match &self.config {
            Some(file) => toml::from_str(&std::fs::read_to_string(file)?)?,
            None => SyntheticParams::default(),
        };
        if let Some(nside) = self.nside {
            params.nside = nside;
        }
        if let Some(num_subbands) = self.num_subbands {
            params.num_subbands = num_subbands;
        }
        if let Some(noise_rms) = self.noise_rms {
            params.noise_rms = noise_rms;
        }

        info!(
            "{} realization(s), nside {}, {} subband(s), noise RMS {}",
            self.num_realizations, params.nside, params.num_subbands, params.noise_rms
        );
        if dry_run {
            return Ok(());
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let date = date_prefix();
        std::fs::create_dir_all(&self.outdir)?;
        for index in 0..self.num_realizations {
            let realization = synthesize_realization(&params, &mut rng)?;
            let path = self
                .outdir
                .join(realization_filename(&date, &self.name, false, index));
            realization.write(&path)?;
            debug!("Wrote {}", path.display());
        }
        info!(
            "Wrote {} realization file(s) under {}",
            self.num_realizations,
            self.outdir.display()
        );
        Ok(())
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Zoned noise statistics over realization ensembles.
//!
//! The observed patch is split into angular zones around the patch
//! centre, and pixel-pixel covariance/correlation matrices are
//! estimated per zone, per frequency subband and per Stokes component,
//! from the residuals of many noise realizations.

mod error;
#[cfg(test)]
mod tests;

pub use error::AnalysisError;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use itertools::Itertools;
use log::{debug, info};
use ndarray::prelude::*;
use rayon::prelude::*;
use scorus::healpix::utils::nside2npix;

use crate::{
    ensemble::{NUM_STOKES, STOKES},
    math::{angular_separation, direction_from_lonlat, pixel_direction},
};

/// Deviation of every realization from the across-realization mean, at
/// each (subband, patch pixel, Stokes) coordinate. The input has shape
/// (realization, subband, patch pixel, Stokes); so does the output. At
/// least two realizations are needed for the mean to leave any noise to
/// study.
pub fn residuals_from_ensemble(patches: ArrayView4<f64>) -> Result<Array4<f64>, AnalysisError> {
    let nreals = patches.dim().0;
    if nreals < 2 {
        return Err(AnalysisError::NotEnoughRealizations { got: nreals });
    }
    let mean = patches.mean_axis(Axis(0)).expect("nreals >= 2");
    Ok(&patches - &mean)
}

/// Split the observed pixels into `n_zones` disjoint, exhaustive groups
/// of (as near as possible) equal size, ordered by increasing angular
/// distance from the patch centre.
///
/// Each returned zone holds patch-pixel indices (positions along the
/// compressed pixel axis of a patch array), sorted ascending. Pixels at
/// equal distance are assigned stably, by original pixel index.
pub fn zone_assignment(
    n_zones: usize,
    nside: usize,
    center_lon_deg: f64,
    center_lat_deg: f64,
    seen: &[bool],
) -> Result<Vec<Vec<usize>>, AnalysisError> {
    if n_zones == 0 {
        return Err(AnalysisError::NoZones);
    }
    let npix = nside2npix(nside);
    if seen.len() != npix {
        return Err(AnalysisError::BadSeenLength {
            got: seen.len(),
            expected: npix,
        });
    }

    let center = direction_from_lonlat(center_lon_deg, center_lat_deg);
    // (angular distance, patch-pixel index), in sky-pixel order.
    let mut distances: Vec<(f64, usize)> = seen
        .iter()
        .enumerate()
        .filter(|(_, &s)| s)
        .enumerate()
        .map(|(patch_index, (ipix, _))| {
            (
                angular_separation(&pixel_direction(nside, ipix), &center),
                patch_index,
            )
        })
        .collect();
    // A stable sort on distance keeps equidistant pixels in original
    // pixel order.
    distances.sort_by(|a, b| a.0.total_cmp(&b.0));

    let num_seen = distances.len();
    let mut zones = Vec::with_capacity(n_zones);
    for izone in 0..n_zones {
        // Quantile cuts; sizes differ by at most one.
        let start = izone * num_seen / n_zones;
        let end = (izone + 1) * num_seen / n_zones;
        let zone: Vec<usize> = distances[start..end]
            .iter()
            .map(|&(_, patch_index)| patch_index)
            .sorted_unstable()
            .collect();
        debug!("zone {}/{n_zones}: {} pixels", izone + 1, zone.len());
        zones.push(zone);
    }
    Ok(zones)
}

/// Restrict a residual array (realization, subband, patch pixel,
/// Stokes) to one zone's pixels, preserving the other axes.
pub fn extract_zone(data: ArrayView4<f64>, zone: &[usize]) -> Array4<f64> {
    data.select(Axis(2), zone)
}

/// Pixel-pixel covariance and correlation matrices of a residual
/// ensemble, per subband and Stokes component.
///
/// The input has shape (realization, subband, pixel, Stokes); both
/// outputs have shape (subband, Stokes, pixel, pixel). The covariance
/// uses the unbiased estimator (dividing by `nreals - 1`); the
/// correlation divides by the outer product of the per-pixel standard
/// deviations, so pixels with zero variance produce NaN rows/columns
/// rather than an error.
pub fn covcorr_between_pixels(
    residuals: ArrayView4<f64>,
) -> Result<(Array4<f64>, Array4<f64>), AnalysisError> {
    let (nreals, nsub, npix, nstk) = residuals.dim();
    if nreals < 2 {
        return Err(AnalysisError::NotEnoughRealizations { got: nreals });
    }

    let blocks: Vec<((usize, usize), (Array2<f64>, Array2<f64>))> = (0..nsub)
        .cartesian_product(0..nstk)
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(isub, istk)| {
            let block = residuals.slice(s![.., isub, .., istk]);
            ((isub, istk), covcorr_block(block))
        })
        .collect();

    let mut cov = Array4::zeros((nsub, nstk, npix, npix));
    let mut corr = Array4::zeros((nsub, nstk, npix, npix));
    for ((isub, istk), (block_cov, block_corr)) in blocks {
        cov.slice_mut(s![isub, istk, .., ..]).assign(&block_cov);
        corr.slice_mut(s![isub, istk, .., ..]).assign(&block_corr);
    }
    Ok((cov, corr))
}

/// Covariance and correlation over one (realization, pixel) block.
fn covcorr_block(block: ArrayView2<f64>) -> (Array2<f64>, Array2<f64>) {
    let (nreals, npix) = block.dim();
    let mean = block.mean_axis(Axis(0)).expect("nreals >= 2");
    let centred = &block - &mean;

    let mut cov = Array2::zeros((npix, npix));
    for a in 0..npix {
        for b in a..npix {
            let mut sum = 0.0;
            for r in 0..nreals {
                sum += centred[(r, a)] * centred[(r, b)];
            }
            let value = sum / (nreals - 1) as f64;
            cov[(a, b)] = value;
            cov[(b, a)] = value;
        }
    }

    let std: Vec<f64> = (0..npix).map(|a| cov[(a, a)].sqrt()).collect();
    let corr = Array2::from_shape_fn((npix, npix), |(a, b)| cov[(a, b)] / (std[a] * std[b]));
    (cov, corr)
}

/// A scalar summary of how far a correlation matrix is from diagonal:
/// the mean squared off-diagonal entry, i.e. the sum of squared
/// off-diagonal correlations divided by n(n-1). Zero for a perfectly
/// uncorrelated (diagonal) matrix; at most one.
pub fn correlation_distance(corr: ArrayView2<f64>) -> f64 {
    let n = corr.nrows();
    if n < 2 {
        return 0.0;
    }
    let off_diagonal_sum: f64 = corr
        .indexed_iter()
        .filter(|((a, b), _)| a != b)
        .map(|(_, &c)| c * c)
        .sum();
    off_diagonal_sum / (n * (n - 1)) as f64
}

/// Dump one matrix per (Stokes, subband) pair as a plain numeric text
/// file: one row of whitespace-separated values per matrix row.
pub fn dump_covcorr(
    dir: &Path,
    prefix: &str,
    matrices: ArrayView4<f64>,
) -> Result<(), AnalysisError> {
    let (nsub, nstk, _, _) = matrices.dim();
    debug_assert_eq!(nstk, NUM_STOKES);
    for isub in 0..nsub {
        for istk in 0..nstk {
            let path = dir.join(format!("{prefix}_{}_subband{}.dat", STOKES[istk], isub + 1));
            let mut writer = BufWriter::new(File::create(&path)?);
            for row in matrices.slice(s![isub, istk, .., ..]).outer_iter() {
                let line = row.iter().map(|v| format!("{v:.10e}")).join(" ");
                writeln!(writer, "{line}")?;
            }
        }
    }
    info!("Wrote {} dump files under {}", nsub * nstk, dir.display());
    Ok(())
}

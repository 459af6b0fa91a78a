// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A synthetic stand-in for the external map-making collaborator.
//!
//! Real ensembles come out of the map-making solver, one FITS file per
//! noise seed. This module fabricates files with the same layout from a
//! toy model (a Gaussian bump on the patch plus white noise) so the
//! noise-analysis pipeline can be exercised end to end without the
//! simulation package.

use ndarray::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use scorus::healpix::utils::nside2npix;

use super::{EnsembleError, MapRealization, NUM_STOKES};
use crate::math::{angular_separation, direction_from_lonlat, pixel_direction};

/// Tunables for one synthetic realization.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct SyntheticParams {
    /// Healpix nside of the maps.
    pub nside: usize,
    /// Number of frequency subbands.
    pub num_subbands: usize,
    /// Patch centre longitude \[deg\].
    pub center_lon_deg: f64,
    /// Patch centre latitude \[deg\].
    pub center_lat_deg: f64,
    /// Angular radius of the observed patch \[deg\].
    pub patch_radius_deg: f64,
    /// Peak amplitude of the (noiseless) sky bump.
    pub signal_amplitude: f64,
    /// White-noise RMS added to every observed (subband, pixel, Stokes)
    /// cell.
    pub noise_rms: f64,
}

impl Default for SyntheticParams {
    fn default() -> SyntheticParams {
        SyntheticParams {
            nside: 16,
            num_subbands: 3,
            center_lon_deg: 0.0,
            center_lat_deg: -57.0,
            patch_radius_deg: 15.0,
            signal_amplitude: 100.0,
            noise_rms: 1.0,
        }
    }
}

/// Build one synthetic realization. The convolved map is the noiseless
/// sky (identical across realizations); the reconstructed map adds
/// white noise on the observed pixels; the difference map is their
/// difference. A `noise_rms` of zero is rejected rather than producing
/// a degenerate ensemble.
pub fn synthesize_realization(
    params: &SyntheticParams,
    rng: &mut impl Rng,
) -> Result<MapRealization, EnsembleError> {
    if !(params.noise_rms > 0.0 && params.noise_rms.is_finite()) {
        return Err(EnsembleError::InvalidNoiseRms {
            got: params.noise_rms,
        });
    }
    let normal = Normal::new(0.0, params.noise_rms).expect("checked above");

    let npix = nside2npix(params.nside);
    let center = direction_from_lonlat(params.center_lon_deg, params.center_lat_deg);
    let radius = params.patch_radius_deg.to_radians();

    let separations: Vec<f64> = (0..npix)
        .map(|ipix| angular_separation(&pixel_direction(params.nside, ipix), &center))
        .collect();
    let seen: Vec<bool> = separations.iter().map(|&sep| sep < radius).collect();

    let nsub = params.num_subbands;
    let mut convolved = Array3::zeros((nsub, npix, NUM_STOKES));
    let mut recon = Array3::zeros((nsub, npix, NUM_STOKES));
    let sigma = radius / 2.0;
    for isub in 0..nsub {
        // The bump narrows with frequency, Q and U carry a fraction of
        // it.
        let band_scale = 1.0 / (1.0 + isub as f64 / nsub as f64);
        for (ipix, &sep) in separations.iter().enumerate() {
            if !seen[ipix] {
                continue;
            }
            let bump =
                params.signal_amplitude * (-sep * sep / (2.0 * sigma * sigma * band_scale)).exp();
            for istk in 0..NUM_STOKES {
                let stokes_scale = if istk == 0 { 1.0 } else { 0.05 };
                let signal = bump * stokes_scale;
                convolved[(isub, ipix, istk)] = signal;
                recon[(isub, ipix, istk)] = signal + normal.sample(rng);
            }
        }
    }
    let diff = &recon - &convolved;

    Ok(MapRealization {
        recon,
        convolved,
        diff,
        seen,
        nside: params.nside,
    })
}

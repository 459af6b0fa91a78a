// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The whole noise pipeline: fabricate realization files on disk,
//! rediscover and load them, then run the zoned covariance analysis.

use ndarray::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use tempfile::TempDir;

use cmb_selfcal::{
    analysis::{
        correlation_distance, covcorr_between_pixels, extract_zone, residuals_from_ensemble,
        zone_assignment,
    },
    ensemble::{
        discover_realizations, realization_filename,
        synthetic::{synthesize_realization, SyntheticParams},
        PatchEnsemble,
    },
};

#[test]
fn white_noise_ensemble_end_to_end() {
    let num_realizations = 20;
    let params = SyntheticParams {
        nside: 8,
        num_subbands: 2,
        noise_rms: 1.0,
        ..Default::default()
    };

    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mut rng = StdRng::seed_from_u64(20260831);
    for index in 0..num_realizations {
        let realization = synthesize_realization(&params, &mut rng).unwrap();
        let path = tmp_dir
            .path()
            .join(realization_filename("20260831", "endtoend", false, index));
        realization.write(&path).unwrap();
    }

    let files = discover_realizations(tmp_dir.path(), "endtoend", false).unwrap();
    assert_eq!(files.len(), num_realizations);
    let ensemble = PatchEnsemble::load(&files).unwrap();
    assert_eq!(ensemble.num_realizations(), num_realizations);
    assert_eq!(ensemble.num_subbands(), params.num_subbands);
    assert_eq!(ensemble.nside, params.nside);
    let num_patch_pixels = ensemble.num_patch_pixels();
    assert!(num_patch_pixels > 0);

    let residuals = residuals_from_ensemble(ensemble.patches.view()).unwrap();
    let zones = zone_assignment(
        2,
        ensemble.nside,
        params.center_lon_deg,
        params.center_lat_deg,
        &ensemble.seen,
    )
    .unwrap();
    assert_eq!(zones.iter().map(Vec::len).sum::<usize>(), num_patch_pixels);

    for zone in &zones {
        let zone_residuals = extract_zone(residuals.view(), zone);
        let (cov, corr) = covcorr_between_pixels(zone_residuals.view()).unwrap();
        let (nsub, nstk, npix, _) = cov.dim();
        assert_eq!(nsub, params.num_subbands);
        assert_eq!(npix, zone.len());

        for isub in 0..nsub {
            for istk in 0..nstk {
                // White noise of unit RMS: the diagonal averages to the
                // variance, and the off-diagonal correlations stay near
                // zero (sample scatter is ~1/sqrt(nreals - 1)).
                let diagonal_mean = (0..npix)
                    .map(|p| cov[(isub, istk, p, p)])
                    .sum::<f64>()
                    / npix as f64;
                assert!(
                    (diagonal_mean - 1.0).abs() < 0.25,
                    "diagonal mean {diagonal_mean} too far from the noise variance"
                );

                let distance = correlation_distance(corr.slice(s![isub, istk, .., ..]));
                assert!(
                    distance < 0.15,
                    "correlation distance {distance} too large for white noise"
                );
            }
        }
    }
}

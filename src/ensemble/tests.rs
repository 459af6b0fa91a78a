// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use rand::{rngs::StdRng, SeedableRng};

use super::{synthetic::*, *};

fn small_params() -> SyntheticParams {
    SyntheticParams {
        nside: 8,
        num_subbands: 2,
        ..Default::default()
    }
}

#[test]
fn test_filename_convention() {
    assert_eq!(
        realization_filename("20190704", "try50reals", false, 12),
        "20190704_try50reals_noiselessFalse_0012.fits"
    );
    assert_eq!(
        realization_filename("20190704", "try50reals", true, 0),
        "20190704_try50reals_noiselessTrue_0000.fits"
    );
}

#[test]
fn test_fits_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let real = synthesize_realization(&small_params(), &mut rng).unwrap();

    let path = dir.path().join(realization_filename("20260831", "roundtrip", false, 0));
    real.write(&path).unwrap();
    let back = MapRealization::read(&path).unwrap();

    assert_eq!(back.nside, real.nside);
    assert_eq!(back.seen, real.seen);
    assert_eq!(back.recon.dim(), real.recon.dim());
    assert_abs_diff_eq!(back.recon, real.recon);
    assert_abs_diff_eq!(back.convolved, real.convolved);
    assert_abs_diff_eq!(back.diff, real.diff);
}

#[test]
fn test_synthetic_consistency() {
    let mut rng = StdRng::seed_from_u64(1);
    let real = synthesize_realization(&small_params(), &mut rng).unwrap();
    // diff is recon - convolved by construction.
    assert_abs_diff_eq!(real.diff.clone(), &real.recon - &real.convolved);
    // Some pixels are seen, but not the whole sky.
    let seen_count = real.seen.iter().filter(|&&s| s).count();
    assert!(seen_count > 0);
    assert!(seen_count < real.seen.len());
    // Unseen pixels carry no signal.
    for (ipix, &seen) in real.seen.iter().enumerate() {
        if !seen {
            assert_eq!(real.recon[(0, ipix, 0)], 0.0);
        }
    }
}

#[test]
fn test_synthetic_rejects_zero_noise() {
    let mut rng = StdRng::seed_from_u64(1);
    let params = SyntheticParams {
        noise_rms: 0.0,
        ..small_params()
    };
    assert!(matches!(
        synthesize_realization(&params, &mut rng),
        Err(EnsembleError::InvalidNoiseRms { .. })
    ));
}

#[test]
fn test_extract_patch() {
    let map = Array3::from_shape_fn((2, 4, NUM_STOKES), |(s, p, k)| {
        (s * 100 + p * 10 + k) as f64
    });
    let seen = vec![false, true, false, true];
    let patch = extract_patch(map.view(), &seen);
    assert_eq!(patch.dim(), (2, 2, NUM_STOKES));
    // Patch pixels keep increasing sky-pixel order.
    assert_eq!(patch[(0, 0, 0)], 10.0);
    assert_eq!(patch[(0, 1, 0)], 30.0);
    assert_eq!(patch[(1, 1, 2)], 132.0);
}

#[test]
fn test_discovery_filters_on_noiseless_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let real = synthesize_realization(&small_params(), &mut rng).unwrap();
    for index in 0..3 {
        let path = dir.path().join(realization_filename("20260831", "disc", false, index));
        real.write(&path).unwrap();
    }
    let noiseless_path = dir.path().join(realization_filename("20260831", "disc", true, 0));
    real.write(&noiseless_path).unwrap();

    let noisy = discover_realizations(dir.path(), "disc", false).unwrap();
    assert_eq!(noisy.len(), 3);
    let noiseless = discover_realizations(dir.path(), "disc", true).unwrap();
    assert_eq!(noiseless.len(), 1);
    assert!(matches!(
        discover_realizations(dir.path(), "other", false),
        Err(EnsembleError::NoFiles { .. })
    ));
}

#[test]
fn test_patch_ensemble_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let params = small_params();
    for index in 0..4 {
        let real = synthesize_realization(&params, &mut rng).unwrap();
        let path = dir.path().join(realization_filename("20260831", "load", false, index));
        real.write(&path).unwrap();
    }

    let files = discover_realizations(dir.path(), "load", false).unwrap();
    let ensemble = PatchEnsemble::load(&files).unwrap();
    assert_eq!(ensemble.num_realizations(), 4);
    assert_eq!(ensemble.num_subbands(), params.num_subbands);
    let seen_count = ensemble.seen.iter().filter(|&&s| s).count();
    assert_eq!(ensemble.num_patch_pixels(), seen_count);

    assert!(ensemble.realization(3).is_ok());
    assert!(matches!(
        ensemble.realization(4),
        Err(EnsembleError::InvalidRealizationIndex { got: 4, nreals: 4 })
    ));
}

#[test]
fn test_patch_ensemble_rejects_mismatched_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let real = synthesize_realization(&small_params(), &mut rng).unwrap();
    real.write(&dir.path().join(realization_filename("20260831", "bad", false, 0)))
        .unwrap();
    let other = synthesize_realization(
        &SyntheticParams {
            num_subbands: 3,
            ..small_params()
        },
        &mut rng,
    )
    .unwrap();
    other
        .write(&dir.path().join(realization_filename("20260831", "bad", false, 1)))
        .unwrap();

    let files = discover_realizations(dir.path(), "bad", false).unwrap();
    assert!(matches!(
        PatchEnsemble::load(&files),
        Err(EnsembleError::MismatchedShapes { .. })
    ));
}

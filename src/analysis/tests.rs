// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use ndarray::array;

use super::*;

/// The hand-computable scenario: 3 realizations of 4 pixels, 1 subband,
/// 1 Stokes component.
fn hand_ensemble() -> Array4<f64> {
    let mut patches = Array4::zeros((3, 1, 4, 1));
    patches
        .slice_mut(s![0, 0, .., 0])
        .assign(&array![1.0, 2.0, 3.0, 4.0]);
    patches
        .slice_mut(s![1, 0, .., 0])
        .assign(&array![2.0, 3.0, 4.0, 5.0]);
    patches
        .slice_mut(s![2, 0, .., 0])
        .assign(&array![0.0, 1.0, 2.0, 3.0]);
    patches
}

#[test]
fn test_residuals_hand_computable() {
    let patches = hand_ensemble();
    let residuals = residuals_from_ensemble(patches.view()).unwrap();
    assert_abs_diff_eq!(
        residuals.slice(s![0, 0, .., 0]),
        array![0.0, 0.0, 0.0, 0.0].view()
    );
    assert_abs_diff_eq!(
        residuals.slice(s![1, 0, .., 0]),
        array![1.0, 1.0, 1.0, 1.0].view()
    );
    assert_abs_diff_eq!(
        residuals.slice(s![2, 0, .., 0]),
        array![-1.0, -1.0, -1.0, -1.0].view()
    );
}

#[test]
fn test_covariance_hand_computable() {
    // Residuals are +/-1 in lockstep across all four pixels: every
    // pixel pair has covariance exactly 1 and correlation exactly 1.
    let patches = hand_ensemble();
    let residuals = residuals_from_ensemble(patches.view()).unwrap();
    let (cov, corr) = covcorr_between_pixels(residuals.view()).unwrap();
    assert_eq!(cov.dim(), (1, 1, 4, 4));
    for &value in cov.iter() {
        assert_abs_diff_eq!(value, 1.0);
    }
    for &value in corr.iter() {
        assert_abs_diff_eq!(value, 1.0);
    }
}

#[test]
fn test_residuals_need_two_realizations() {
    let patches = Array4::zeros((1, 1, 4, 1));
    assert!(matches!(
        residuals_from_ensemble(patches.view()),
        Err(AnalysisError::NotEnoughRealizations { got: 1 })
    ));
    assert!(matches!(
        covcorr_between_pixels(patches.view()),
        Err(AnalysisError::NotEnoughRealizations { got: 1 })
    ));
}

#[test]
fn test_covariance_diagonal_is_variance() {
    // A 5-realization ensemble with per-pixel values we can reference
    // against a direct variance computation.
    let mut patches = Array4::zeros((5, 1, 3, 1));
    let values = [
        [1.0, -3.0, 10.0],
        [2.0, 0.0, 12.0],
        [3.0, 3.0, 8.0],
        [4.0, 6.0, 11.0],
        [5.0, 9.0, 9.0],
    ];
    for (r, row) in values.iter().enumerate() {
        patches.slice_mut(s![r, 0, .., 0]).assign(&Array1::from_vec(row.to_vec()));
    }
    let residuals = residuals_from_ensemble(patches.view()).unwrap();
    let (cov, _) = covcorr_between_pixels(residuals.view()).unwrap();

    for p in 0..3 {
        let column: Vec<f64> = (0..5).map(|r| values[r][p]).collect();
        let mean = column.iter().sum::<f64>() / 5.0;
        let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
        assert_abs_diff_eq!(cov[(0, 0, p, p)], variance, epsilon = 1e-12);
    }
}

#[test]
fn test_correlation_properties() {
    // Random-ish but deterministic residuals with nonzero variance.
    let mut patches = Array4::zeros((6, 2, 5, 3));
    for (r, mut real) in patches.outer_iter_mut().enumerate() {
        for ((isub, p, istk), value) in real.indexed_iter_mut() {
            *value = ((r * 31 + isub * 17 + p * 7 + istk * 3) % 13) as f64 - 6.0;
        }
    }
    let residuals = residuals_from_ensemble(patches.view()).unwrap();
    let (_, corr) = covcorr_between_pixels(residuals.view()).unwrap();

    for isub in 0..2 {
        for istk in 0..3 {
            let block = corr.slice(s![isub, istk, .., ..]);
            for a in 0..5 {
                assert_abs_diff_eq!(block[(a, a)], 1.0, epsilon = 1e-12);
                for b in 0..5 {
                    assert_abs_diff_eq!(block[(a, b)], block[(b, a)], epsilon = 1e-12);
                    assert!(block[(a, b)] >= -1.0 - 1e-12);
                    assert!(block[(a, b)] <= 1.0 + 1e-12);
                }
            }
        }
    }
}

#[test]
fn test_zero_variance_pixel_gives_nan_correlation() {
    let mut patches = Array4::zeros((3, 1, 2, 1));
    // Pixel 0 varies, pixel 1 is constant.
    patches.slice_mut(s![.., 0, 0, 0]).assign(&array![1.0, 2.0, 3.0]);
    patches.slice_mut(s![.., 0, 1, 0]).assign(&array![5.0, 5.0, 5.0]);
    let residuals = residuals_from_ensemble(patches.view()).unwrap();
    let (cov, corr) = covcorr_between_pixels(residuals.view()).unwrap();
    assert_abs_diff_eq!(cov[(0, 0, 1, 1)], 0.0);
    assert!(corr[(0, 0, 0, 1)].is_nan());
    assert!(corr[(0, 0, 1, 1)].is_nan());
    // The varying pixel keeps a clean diagonal.
    assert_abs_diff_eq!(corr[(0, 0, 0, 0)], 1.0);
}

#[test]
fn test_zone_partition_is_disjoint_and_exhaustive() {
    let nside = 8;
    let npix = nside2npix(nside);
    // An arbitrary scattered patch.
    let seen: Vec<bool> = (0..npix).map(|i| i % 3 == 0).collect();
    let num_seen = seen.iter().filter(|&&s| s).count();

    let zones = zone_assignment(4, nside, 0.0, -57.0, &seen).unwrap();
    assert_eq!(zones.len(), 4);

    let mut all: Vec<usize> = vec![];
    for zone in &zones {
        // Quantile balance.
        assert!((zone.len() as i64 - num_seen as i64 / 4).abs() <= 1);
        all.extend(zone.iter().copied());
    }
    let unique: HashSet<usize> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len(), "zones overlap");
    assert_eq!(all.len(), num_seen, "zones don't cover the patch");
    assert!(unique.iter().all(|&p| p < num_seen));
}

#[test]
fn test_zones_are_ordered_by_distance() {
    let nside = 8;
    let npix = nside2npix(nside);
    let center = direction_from_lonlat(0.0, -57.0);
    let seen: Vec<bool> = (0..npix).map(|i| i % 2 == 0).collect();
    let patch_pixels: Vec<usize> = (0..npix).filter(|i| i % 2 == 0).collect();

    let zones = zone_assignment(3, nside, 0.0, -57.0, &seen).unwrap();
    let max_dist = |zone: &[usize]| {
        zone.iter()
            .map(|&p| angular_separation(&pixel_direction(nside, patch_pixels[p]), &center))
            .fold(f64::MIN, f64::max)
    };
    let min_dist = |zone: &[usize]| {
        zone.iter()
            .map(|&p| angular_separation(&pixel_direction(nside, patch_pixels[p]), &center))
            .fold(f64::MAX, f64::min)
    };
    assert!(max_dist(&zones[0]) <= min_dist(&zones[1]));
    assert!(max_dist(&zones[1]) <= min_dist(&zones[2]));
}

#[test]
fn test_zone_assignment_validation() {
    assert!(matches!(
        zone_assignment(0, 8, 0.0, 0.0, &[true; 768]),
        Err(AnalysisError::NoZones)
    ));
    assert!(matches!(
        zone_assignment(2, 8, 0.0, 0.0, &[true; 100]),
        Err(AnalysisError::BadSeenLength { got: 100, .. })
    ));
}

#[test]
fn test_extract_zone() {
    let data = Array4::from_shape_fn((2, 1, 5, 3), |(r, s, p, k)| {
        (r * 1000 + s * 100 + p * 10 + k) as f64
    });
    let zone = vec![1, 4];
    let extracted = extract_zone(data.view(), &zone);
    assert_eq!(extracted.dim(), (2, 1, 2, 3));
    assert_eq!(extracted[(0, 0, 0, 0)], 10.0);
    assert_eq!(extracted[(0, 0, 1, 0)], 40.0);
    assert_eq!(extracted[(1, 0, 1, 2)], 1042.0);
}

#[test]
fn test_correlation_distance() {
    let identity = Array2::eye(4);
    assert_abs_diff_eq!(correlation_distance(identity.view()), 0.0);

    let ones = Array2::ones((4, 4));
    assert_abs_diff_eq!(correlation_distance(ones.view()), 1.0);

    // Hand-computed: two off-diagonal entries of 0.5 in a 3x3 matrix:
    // (0.25 + 0.25) / (3 * 2).
    let mut m = Array2::eye(3);
    m[(0, 1)] = 0.5;
    m[(1, 0)] = 0.5;
    assert_abs_diff_eq!(correlation_distance(m.view()), 0.5 / 6.0);

    // Degenerate sizes.
    assert_abs_diff_eq!(correlation_distance(Array2::eye(1).view()), 0.0);
}

#[test]
fn test_dump_covcorr_writes_one_file_per_stokes_subband() {
    let dir = tempfile::tempdir().unwrap();
    let matrices = Array4::ones((2, 3, 4, 4));
    dump_covcorr(dir.path(), "corr", matrices.view()).unwrap();
    for isub in 1..=2 {
        for stokes in ["I", "Q", "U"] {
            let path = dir.path().join(format!("corr_{stokes}_subband{isub}.dat"));
            let contents = std::fs::read_to_string(&path).unwrap();
            assert_eq!(contents.lines().count(), 4);
            let first: Vec<f64> = contents
                .lines()
                .next()
                .unwrap()
                .split_whitespace()
                .map(|v| v.parse().unwrap())
                .collect();
            assert_eq!(first, vec![1.0; 4]);
        }
    }
}

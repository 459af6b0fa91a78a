// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fringe synthesis through the public API.

use approx::assert_abs_diff_eq;
use vec1::vec1;

use cmb_selfcal::{
    fringes::power_combinations,
    instrument::{Baseline, DeadSwitchSet},
    optics::{IdealOptics, SourceParams, SourcePointing},
};

#[test]
fn seven_power_maps_are_consistent() {
    let model = IdealOptics::default();
    let baseline = Baseline::new(25, 57).unwrap();
    let dead = DeadSwitchSet::empty();
    let pointings = vec1![SourcePointing {
        theta: 0.02,
        phi: 0.5,
    }];
    let params = SourceParams {
        reso: 17,
        ..Default::default()
    };

    let combos = power_combinations(&model, baseline, &dead, &pointings, params);
    let fringes = combos.combine();

    // The combination is exactly invertible wherever the divisor is
    // nonzero.
    for ((i, j, k), &f) in fringes.indexed_iter() {
        let c_i = combos.c_i[(i, j, k)];
        if c_i.abs() > 1e-12 {
            let reconstructed = f * c_i + combos.c_minus_i[(i, j, k)]
                + combos.c_minus_j[(i, j, k)]
                - combos.s_minus_ij[(i, j, k)];
            assert_abs_diff_eq!(reconstructed, combos.s[(i, j, k)], epsilon = 1e-9);
        }
    }

    // All seven maps are power maps: non-negative everywhere.
    for (_, power) in combos.iter() {
        assert!(power.iter().all(|&p| p >= 0.0));
    }
}

#[test]
fn dead_switches_change_realistic_patterns_only() {
    let model = IdealOptics::default();
    let baseline = Baseline::new(25, 57).unwrap();
    let pointings = vec1![SourcePointing {
        theta: 0.0,
        phi: 0.0,
    }];
    let params = SourceParams {
        reso: 9,
        ..Default::default()
    };

    let healthy = power_combinations(&model, baseline, &DeadSwitchSet::empty(), &pointings, params);
    let dead = DeadSwitchSet::new(vec![3, 40]).unwrap();
    let degraded = power_combinations(&model, baseline, &dead, &pointings, params);

    // Closing two extra horns lowers the all-open power.
    let healthy_total: f64 = healthy.s.sum();
    let degraded_total: f64 = degraded.s.sum();
    assert!(degraded_total < healthy_total);

    // The single-horn and baseline-only patterns bypass dead switches.
    assert_abs_diff_eq!(degraded.c_i, healthy.c_i);
    assert_abs_diff_eq!(degraded.c_j, healthy.c_j);
    assert_abs_diff_eq!(degraded.s_ij, healthy.s_ij);
}

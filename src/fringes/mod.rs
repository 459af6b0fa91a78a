// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fringe synthesis from seven horn-switch configurations.
//!
//! The fringe pattern of a baseline (i, j) is isolated from power
//! measurements as
//!
//! ```text
//! fringes = (S - C_-i - C_-j + S_-ij) / C_i
//! ```
//!
//! where S is all horns open, C_-i / C_-j / S_-ij close one or both
//! baseline horns, and C_i has only horn i open. Division is plain IEEE
//! arithmetic: sample pixels where C_i vanishes come out NaN/inf and are
//! expected to be masked downstream, not reported as errors.

mod aberration;
mod error;

pub use aberration::{combine_fringes_aberration, AberrationSet};
pub use error::FringesError;

use log::debug;
use ndarray::prelude::*;
use vec1::Vec1;

use crate::{
    instrument::{Baseline, DeadSwitchSet, SwitchPattern},
    optics::{power_on_array, OpticsModel, SourceParams, SourcePointing},
};

/// The power on the focal plane under each of the seven switch
/// patterns, each of shape (reso, reso, n_pointings), ONAFP frame.
pub struct PowerCombinations {
    pub s: Array3<f64>,
    pub c_minus_i: Array3<f64>,
    pub c_minus_j: Array3<f64>,
    pub s_minus_ij: Array3<f64>,
    pub c_i: Array3<f64>,
    pub c_j: Array3<f64>,
    pub s_ij: Array3<f64>,
}

impl PowerCombinations {
    /// Iterate the seven maps in pattern order, for plotting and dumps.
    pub fn iter(&self) -> impl Iterator<Item = (SwitchPattern, &Array3<f64>)> {
        SwitchPattern::ALL.into_iter().zip([
            &self.s,
            &self.c_minus_i,
            &self.c_minus_j,
            &self.s_minus_ij,
            &self.c_i,
            &self.c_j,
            &self.s_ij,
        ])
    }

    /// Apply the combination formula. Pixels where C_i vanishes come
    /// out NaN/inf.
    pub fn combine(&self) -> Array3<f64> {
        (&self.s - &self.c_minus_i - &self.c_minus_j + &self.s_minus_ij) / &self.c_i
    }
}

/// Evaluate the power on the focal plane under all seven switch
/// patterns for one baseline. Each pattern gets its own freshly built
/// configuration value, so the evaluations are independent of each
/// other and of any caller state.
pub fn power_combinations(
    model: &dyn OpticsModel,
    baseline: Baseline,
    dead: &DeadSwitchSet,
    pointings: &Vec1<SourcePointing>,
    params: SourceParams,
) -> PowerCombinations {
    let mut run = |pattern: SwitchPattern| {
        let config = pattern.horn_config(baseline, dead);
        debug!(
            "baseline {baseline}: evaluating {pattern} ({} horns open)",
            config.num_open()
        );
        power_on_array(model, &config, pointings, params)
    };
    PowerCombinations {
        s: run(SwitchPattern::AllOpen),
        c_minus_i: run(SwitchPattern::AllButFirst),
        c_minus_j: run(SwitchPattern::AllButSecond),
        s_minus_ij: run(SwitchPattern::AllButBaseline),
        c_i: run(SwitchPattern::OnlyFirst),
        c_j: run(SwitchPattern::OnlySecond),
        s_ij: run(SwitchPattern::OnlyBaseline),
    }
}

/// The fringes of one baseline on the focal plane, shape (reso, reso,
/// n_pointings).
pub fn combine_fringes(
    model: &dyn OpticsModel,
    baseline: Baseline,
    dead: &DeadSwitchSet,
    pointings: &Vec1<SourcePointing>,
    params: SourceParams,
) -> Array3<f64> {
    power_combinations(model, baseline, dead, pointings, params).combine()
}

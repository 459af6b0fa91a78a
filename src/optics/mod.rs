// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The optics-response seam and the power-on-array evaluator.
//!
//! The real instrument response lives in an external optics package;
//! [`OpticsModel`] is the contract this crate consumes it through. The
//! shipped [`IdealOptics`] is an aberration-free phased-array model: the
//! combiner optics map source direction and focal-plane position to phase
//! gradients across the horn array, and the field at a detector is the
//! coherent sum over the open horns.


use ndarray::prelude::*;
use rayon::prelude::*;
use vec1::Vec1;

use crate::{
    c64,
    constants::{DETECTOR_AREA, FOCAL_LENGTH, PRIMARY_BEAM_FWHM_DEG, VEL_C},
    instrument::{HornArray, HornConfig},
    math::{cexp, rot90_cw3},
};

/// One position of the calibration source relative to the optical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourcePointing {
    /// Zenith angle \[rad\].
    pub theta: f64,
    /// Azimuthal angle \[rad\].
    pub phi: f64,
}

/// Tunables for a power-on-array evaluation. Everything that used to be
/// an implicit module-level default is enumerated here.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceParams {
    /// Source frequency \[Hz\].
    pub freq_hz: f64,
    /// Source spectral irradiance \[W/m^2/Hz\].
    pub spectral_irradiance: f64,
    /// Sample-pixel count along one side of the focal-plane image.
    pub reso: usize,
    /// Position of the focal-plane border closest to the centre \[m\].
    pub xmin: f64,
    /// Position of the opposite border \[m\].
    pub xmax: f64,
}

impl Default for SourceParams {
    fn default() -> SourceParams {
        SourceParams {
            freq_hz: crate::constants::DEFAULT_FREQ_HZ,
            spectral_irradiance: crate::constants::DEFAULT_SPECTRAL_IRRADIANCE,
            reso: crate::constants::DEFAULT_RESO,
            xmin: crate::constants::DEFAULT_XMIN,
            xmax: crate::constants::DEFAULT_XMAX,
        }
    }
}

/// The external optics-response collaborator, reduced to the one call
/// this crate makes: the complex field at a set of sample positions
/// behind the horn array, per pointing.
pub trait OpticsModel: Sync {
    /// The distance between the horn-array plane and the focal plane
    /// \[m\]. Sample positions are generated at `z = -focal_length()`.
    fn focal_length(&self) -> f64;

    /// The complex field response. `positions` has shape
    /// (`n_positions`, 3) \[m\]; the result has shape (`n_positions`,
    /// `n_pointings`).
    fn response(
        &self,
        config: &HornConfig,
        pointings: &[SourcePointing],
        freq_hz: f64,
        spectral_irradiance: f64,
        positions: ArrayView2<f64>,
    ) -> Array2<c64>;
}

/// An ideal, aberration-free optics model over the TD horn array.
#[derive(Debug, Clone)]
pub struct IdealOptics {
    pub horns: HornArray,
    pub focal_length: f64,
    pub detector_area: f64,
    /// Primary-beam FWHM \[deg\]; the beam is Gaussian in the source
    /// zenith angle.
    pub primary_beam_fwhm_deg: f64,
}

impl Default for IdealOptics {
    fn default() -> IdealOptics {
        IdealOptics {
            horns: HornArray::td(),
            focal_length: FOCAL_LENGTH,
            detector_area: DETECTOR_AREA,
            primary_beam_fwhm_deg: PRIMARY_BEAM_FWHM_DEG,
        }
    }
}

impl IdealOptics {
    fn primary_beam(&self, theta: f64) -> f64 {
        let sigma = self.primary_beam_fwhm_deg.to_radians() / (8.0 * 2f64.ln()).sqrt();
        (-theta * theta / (2.0 * sigma * sigma)).exp()
    }
}

impl OpticsModel for IdealOptics {
    fn focal_length(&self) -> f64 {
        self.focal_length
    }

    fn response(
        &self,
        config: &HornConfig,
        pointings: &[SourcePointing],
        freq_hz: f64,
        spectral_irradiance: f64,
        positions: ArrayView2<f64>,
    ) -> Array2<c64> {
        let open: Vec<[f64; 2]> = config
            .open_horns()
            .into_iter()
            .map(|h| self.horns.center(h).expect("validated at construction"))
            .collect();
        let k = 2.0 * std::f64::consts::PI * freq_hz / VEL_C;
        let amp = (spectral_irradiance * self.detector_area).sqrt();

        let mut field = Array2::zeros((positions.nrows(), pointings.len()));
        field
            .axis_iter_mut(Axis(1))
            .into_par_iter()
            .zip(pointings.par_iter())
            .for_each(|(mut column, pointing)| {
                // Transverse direction cosines of the source.
                let sx = pointing.theta.sin() * pointing.phi.cos();
                let sy = pointing.theta.sin() * pointing.phi.sin();
                let beam = self.primary_beam(pointing.theta);
                for (value, position) in column.iter_mut().zip(positions.outer_iter()) {
                    let (px, py) = (position[0], position[1]);
                    let mut sum = c64::new(0.0, 0.0);
                    for &[hx, hy] in &open {
                        // Phase from the incoming plane wave plus the
                        // angle the combiner maps this focal position to.
                        let phase =
                            k * (hx * sx + hy * sy + (hx * px + hy * py) / self.focal_length);
                        sum += cexp(phase);
                    }
                    *value = sum * amp * beam;
                }
            });
        field
    }
}

/// Power on the focal plane in the ONAFP frame, one image per pointing.
///
/// Builds a regular `reso` x `reso` grid over \[xmin, xmax\]^2 at the
/// focal distance behind the array, queries the optics model, squares
/// the field magnitude, and rotates the simulation frame by 90 degrees
/// into the ONAFP frame. The result has shape (reso, reso, n_pointings).
pub fn power_on_array(
    model: &dyn OpticsModel,
    config: &HornConfig,
    pointings: &Vec1<SourcePointing>,
    params: SourceParams,
) -> Array3<f64> {
    let SourceParams {
        freq_hz,
        spectral_irradiance,
        reso,
        xmin,
        xmax,
    } = params;

    // The same raveled meshgrid the simulation frame is defined in: x
    // varies fastest along a row.
    let step = (xmax - xmin) / (reso - 1).max(1) as f64;
    let mut positions = Array2::zeros((reso * reso, 3));
    for i in 0..reso {
        for j in 0..reso {
            let n = i * reso + j;
            positions[(n, 0)] = xmin + step * j as f64;
            positions[(n, 1)] = xmin + step * i as f64;
            positions[(n, 2)] = -model.focal_length();
        }
    }

    let field = model.response(
        config,
        pointings.as_slice(),
        freq_hz,
        spectral_irradiance,
        positions.view(),
    );
    let power = field.mapv(|e| e.norm_sqr());
    let power_grf = power
        .into_shape_with_order((reso, reso, pointings.len()))
        .expect("same number of elements");

    rot90_cw3(power_grf.view())
}

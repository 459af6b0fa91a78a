// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Instrument geometry and default observation parameters.

/// Speed of light \[m/s\].
pub const VEL_C: f64 = 299_792_458.0;

/// The number of horns in the technological-demonstrator (TD) array.
pub const NUM_HORNS: usize = 64;

/// The number of horns along one side of the square TD array.
pub const HORN_GRID_SIDE: usize = 8;

/// Distance between the centres of two neighbouring horns \[m\].
pub const HORN_SPACING: f64 = 0.014;

/// Distance between the horn-array plane and the focal plane \[m\].
pub const FOCAL_LENGTH: f64 = 0.3;

/// Absorbing area of one TES bolometer \[m^2\] (3 mm x 3 mm).
pub const DETECTOR_AREA: f64 = 9e-6;

/// FWHM of the primary beam at the reference frequency \[deg\].
pub const PRIMARY_BEAM_FWHM_DEG: f64 = 13.0;

/// The number of pixels along one side of the full focal-plane image.
pub const FP_SIDE: usize = 34;

/// The number of pixels along one side of one focal-plane quadrant.
pub const QUADRANT_SIDE: usize = 17;

/// The total number of focal-plane indices (`FP_SIDE` squared); valid
/// indices are `0..FP_NUM_INDICES`.
pub const FP_NUM_INDICES: usize = FP_SIDE * FP_SIDE;

/// The number of TES channels per ASIC.
pub const NUM_TES: usize = 128;

/// The number of readout ASICs.
pub const NUM_ASICS: usize = 8;

/// TES channel numbers that are wired to thermometers, not bolometers.
/// These channels carry no sky signal and are skipped when a TES-signal
/// array is folded back into a focal-plane image.
pub const THERMOMETER_TES: [u8; 4] = [4, 36, 68, 100];

/// Default frequency of the calibration source \[Hz\].
pub const DEFAULT_FREQ_HZ: f64 = 150e9;

/// Default spectral irradiance of the calibration source \[W/m^2/Hz\].
pub const DEFAULT_SPECTRAL_IRRADIANCE: f64 = 1.0;

/// Default number of sample pixels along one side of a simulated
/// focal-plane image.
pub const DEFAULT_RESO: usize = 34;

/// Default position of the focal-plane border closest to the optical
/// axis \[m\].
pub const DEFAULT_XMIN: f64 = -0.06;

/// Default position of the opposite focal-plane border \[m\].
pub const DEFAULT_XMAX: f64 = 0.06;

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Self-calibration fringe analysis and map-noise statistics for a
bolometric-interferometer CMB telescope.

The two independent procedures provided here are (1) the synthesis of
interference fringes on the focal plane from seven horn-switch
configurations, and (2) the zoned covariance/correlation analysis of
ensembles of reconstructed-map noise realizations. Everything
algorithmically heavy (the real optics response, map making, sky
pixelization) lives behind small trait/function seams; this crate is the
bookkeeping, the statistics and the file plumbing around them.
 */

pub mod analysis;
pub mod cli;
pub mod constants;
pub mod ensemble;
mod error;
pub mod focalplane;
pub mod fringes;
pub mod instrument;
pub(crate) mod math;
pub mod optics;
#[cfg(feature = "plotting")]
pub mod plotting;

pub use error::SelfCalError;

/// A shorthand for the only complex type used in this crate.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use ndarray::prelude::*;
use scorus::{
    coordinates::{SphCoord, Vec3d},
    healpix::pix::pix2vec_ring,
};

use crate::c64;

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// The angle between two unit vectors \[radians\].
#[inline]
pub(crate) fn angular_separation(a: &Vec3d<f64>, b: &Vec3d<f64>) -> f64 {
    let dot = a.x * b.x + a.y * b.y + a.z * b.z;
    dot.clamp(-1.0, 1.0).acos()
}

/// The unit vector of a (ring-ordered) healpix pixel centre.
#[inline]
pub(crate) fn pixel_direction(nside: usize, ipix: usize) -> Vec3d<f64> {
    pix2vec_ring::<f64>(nside, ipix)
}

/// The unit vector of a sky direction given as longitude/latitude
/// \[deg\].
#[inline]
pub(crate) fn direction_from_lonlat(lon_deg: f64, lat_deg: f64) -> Vec3d<f64> {
    let pol = (90.0 - lat_deg).to_radians();
    let az = lon_deg.to_radians();
    Vec3d::from_sph_coord(SphCoord::new(pol, az))
}

/// Rotate the two leading (square) axes of a 3D array by 90 degrees
/// clockwise, leaving the trailing axis alone. The equivalent of numpy's
/// `rot90(arr, k=-1, axes=(0, 1))`.
pub(crate) fn rot90_cw3(arr: ArrayView3<f64>) -> Array3<f64> {
    let (n, m, p) = arr.dim();
    debug_assert_eq!(n, m);
    Array3::from_shape_fn((n, n, p), |(i, j, k)| arr[(n - 1 - j, i, k)])
}

/// As [`rot90_cw3`], but for a single square image.
pub(crate) fn rot90_cw(arr: ArrayView2<f64>) -> Array2<f64> {
    let (n, m) = arr.dim();
    debug_assert_eq!(n, m);
    Array2::from_shape_fn((n, n), |(i, j)| arr[(n - 1 - j, i)])
}

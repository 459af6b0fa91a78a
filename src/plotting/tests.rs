// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

fn rgb_of(colour: RGBAColor) -> (u8, u8, u8) {
    colour.to_backend_color().rgb
}

#[test]
fn test_colour_map_endpoints() {
    assert_eq!(rgb_of(sequential_colour(0.0)), (0, 0, 0));
    assert_eq!(rgb_of(sequential_colour(1.0)), (255, 255, 255));
    // Out-of-range inputs clamp instead of wrapping.
    assert_eq!(rgb_of(sequential_colour(-1.0)), rgb_of(sequential_colour(0.0)));
    assert_eq!(rgb_of(sequential_colour(2.0)), rgb_of(sequential_colour(1.0)));

    assert_eq!(rgb_of(diverging_colour(0.0)), (0, 0, 255));
    assert_eq!(rgb_of(diverging_colour(1.0)), (255, 0, 0));
    assert_eq!(rgb_of(diverging_colour(0.5)), (255, 255, 255));
}

#[test]
fn test_finite_range_skips_nan() {
    let image = ndarray::array![[1.0, f64::NAN], [f64::INFINITY, -2.0]];
    assert_eq!(finite_range(image.view()), Some((-2.0, 1.0)));

    let all_nan = ndarray::Array2::from_elem((2, 2), f64::NAN);
    assert_eq!(finite_range(all_nan.view()), None);
}

#[test]
fn test_plot_image_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let image = ndarray::Array2::from_shape_fn((17, 17), |(r, c)| (r * c) as f64);
    let output = dir.path().join("image.png");
    plot_image(image.view(), "power", &output).unwrap();
    let meta = std::fs::metadata(&output).unwrap();
    assert!(meta.len() > 0);
}

#[test]
fn test_plot_image_rejects_all_nan() {
    let dir = tempfile::tempdir().unwrap();
    let image = ndarray::Array2::from_elem((4, 4), f64::NAN);
    let output = dir.path().join("nan.png");
    assert!(matches!(
        plot_image(image.view(), "empty", &output),
        Err(DrawError::AllNan(_))
    ));
}

#[test]
fn test_plot_fringe_handles_nan_cells() {
    let dir = tempfile::tempdir().unwrap();
    let mut image = ndarray::Array2::from_shape_fn((8, 8), |(r, c)| r as f64 - c as f64);
    image[(0, 0)] = f64::NAN;
    let output = dir.path().join("fringe.png");
    plot_fringe(image.view(), "fringes [1, 2]", &output).unwrap();
    assert!(output.exists());
}

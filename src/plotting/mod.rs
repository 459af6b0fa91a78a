// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to plot focal-plane images and pixel-pixel matrices as PNGs.

mod error;
#[cfg(test)]
mod tests;

pub use error::DrawError;

use std::path::Path;

use log::info;
use ndarray::prelude::*;
use plotters::{coord::Shift, prelude::*, style::RGBAColor};

use crate::fringes::PowerCombinations;

/// The number of X pixels on single-panel plots.
const X_PIXELS: u32 = 900;
/// The number of Y pixels on single-panel plots.
const Y_PIXELS: u32 = 900;

/// The colour drawn for NaN cells.
const NAN_COLOUR: RGBColor = RGBColor(220, 220, 220);

// These can't be lazy_static statics: the ttf backend's font handle isn't
// `Sync`.
fn title_font() -> TextStyle<'static> {
    ("sans-serif", 40).into_font().into()
}
fn panel_font() -> TextStyle<'static> {
    ("sans-serif", 24).into_font().into()
}

/// Sequential colour map for non-negative data (power maps): black
/// through red to yellow-white.
fn sequential_colour(t: f64) -> RGBAColor {
    let t = t.clamp(0.0, 1.0);
    let r = (255.0 * (3.0 * t).min(1.0)) as u8;
    let g = (255.0 * ((3.0 * t - 1.0).clamp(0.0, 1.0))) as u8;
    let b = (255.0 * ((3.0 * t - 2.0).clamp(0.0, 1.0))) as u8;
    RGBColor(r, g, b).to_rgba()
}

/// Diverging colour map for signed data (fringes, correlations): blue
/// through white to red, with 0.5 mapping to white.
fn diverging_colour(t: f64) -> RGBAColor {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        let u = t * 2.0;
        RGBColor((255.0 * u) as u8, (255.0 * u) as u8, 255).to_rgba()
    } else {
        let u = (1.0 - t) * 2.0;
        RGBColor(255, (255.0 * u) as u8, (255.0 * u) as u8).to_rgba()
    }
}

/// Value range of an image, ignoring NaN and infinities.
fn finite_range(image: ArrayView2<f64>) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for &v in image.iter().filter(|v| v.is_finite()) {
        range = Some(match range {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }
    range
}

/// Draw one heatmap into a drawing area. Row 0 is drawn at the top, so
/// the image appears the way the array reads. NaN and infinite cells
/// are grey.
fn draw_heatmap<DB: DrawingBackend>(
    drawing_area: &DrawingArea<DB, Shift>,
    image: ArrayView2<f64>,
    title: &str,
    limits: (f64, f64),
    colour: fn(f64) -> RGBAColor,
) -> Result<(), DrawError> {
    let (nrows, ncols) = image.dim();
    let (lo, hi) = limits;
    let span = if (hi - lo).abs() < f64::EPSILON {
        1.0
    } else {
        hi - lo
    };

    let mut cc = ChartBuilder::on(drawing_area)
        .caption(title, panel_font())
        .margin(5)
        .build_cartesian_2d(0..ncols, 0..nrows)
        .map_err(|e| DrawError::Heatmap(e.to_string()))?;
    cc.configure_mesh()
        .disable_mesh()
        .draw()
        .map_err(|e| DrawError::Heatmap(e.to_string()))?;

    cc.draw_series(image.indexed_iter().map(|((row, col), &v)| {
        let style = if v.is_finite() {
            colour((v - lo) / span).filled()
        } else {
            NAN_COLOUR.filled()
        };
        // Flip vertically; plotters' y axis grows upwards.
        Rectangle::new([(col, nrows - 1 - row), (col + 1, nrows - row)], style)
    }))
    .map_err(|e| DrawError::Heatmap(e.to_string()))?;
    Ok(())
}

/// Plot one focal-plane image (power map, TES image, detector mask...)
/// as a PNG heatmap with a sequential colour map.
pub fn plot_image(image: ArrayView2<f64>, title: &str, output: &Path) -> Result<(), DrawError> {
    let limits = finite_range(image).ok_or_else(|| DrawError::AllNan(title.to_string()))?;
    let root_area = BitMapBackend::new(output, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root_area
        .fill(&WHITE)
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    draw_heatmap(&root_area, image, title, limits, sequential_colour)?;
    root_area
        .present()
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    info!("Wrote {}", output.display());
    Ok(())
}

/// Plot a signed image (fringes, residual maps) with a diverging colour
/// map, symmetric about zero.
pub fn plot_fringe(image: ArrayView2<f64>, title: &str, output: &Path) -> Result<(), DrawError> {
    let (lo, hi) = finite_range(image).ok_or_else(|| DrawError::AllNan(title.to_string()))?;
    let extreme = lo.abs().max(hi.abs());
    let root_area = BitMapBackend::new(output, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root_area
        .fill(&WHITE)
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    draw_heatmap(
        &root_area,
        image,
        title,
        (-extreme, extreme),
        diverging_colour,
    )?;
    root_area
        .present()
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    info!("Wrote {}", output.display());
    Ok(())
}

/// Plot the seven power maps of a baseline plus the combined fringes as
/// a 2x4 grid of panels, for one source pointing.
pub fn plot_power_combinations(
    combos: &PowerCombinations,
    pointing: usize,
    title: &str,
    output: &Path,
) -> Result<(), DrawError> {
    let fringes = combos.combine();

    let root_area = BitMapBackend::new(output, (2 * X_PIXELS, Y_PIXELS)).into_drawing_area();
    root_area
        .fill(&WHITE)
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    let root_area = root_area
        .titled(title, title_font())
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    let panels = root_area.split_evenly((2, 4));

    for ((pattern, power), panel) in combos.iter().zip(panels.iter()) {
        let image = power.slice(s![.., .., pointing]);
        let limits =
            finite_range(image).ok_or_else(|| DrawError::AllNan(pattern.to_string()))?;
        draw_heatmap(panel, image, &pattern.to_string(), limits, sequential_colour)?;
    }
    // The eighth panel gets the combination.
    let image = fringes.slice(s![.., .., pointing]);
    let (lo, hi) = finite_range(image).ok_or_else(|| DrawError::AllNan("fringes".to_string()))?;
    let extreme = lo.abs().max(hi.abs());
    draw_heatmap(
        &panels[7],
        image,
        "fringes",
        (-extreme, extreme),
        diverging_colour,
    )?;

    root_area
        .present()
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    info!("Wrote {}", output.display());
    Ok(())
}

/// Plot a pixel-pixel covariance or correlation matrix with a diverging
/// colour map symmetric about zero.
pub fn plot_matrix(matrix: ArrayView2<f64>, title: &str, output: &Path) -> Result<(), DrawError> {
    plot_fringe(matrix, title, output)
}

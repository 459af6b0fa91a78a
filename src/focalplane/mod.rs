// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The focal-plane identity table and the mappings between image pixels
//! and (TES, ASIC) readout channels.
//!
//! The focal plane is a 34x34 grid of cells split into four 17x17
//! quadrants; each quadrant is read out by two ASICs of 128 TES channels
//! (256 detectors), leaving 33 cells per quadrant that are not wired to a
//! bolometer. All images here are in the ONAFP frame.

mod error;

pub use error::FocalPlaneError;

use lazy_static::lazy_static;
use ndarray::prelude::*;

use crate::constants::{
    FP_NUM_INDICES, FP_SIDE, NUM_ASICS, NUM_TES, QUADRANT_SIDE, THERMOMETER_TES,
};

/// One cell of the focal-plane identity table, validated once at table
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct FpIdentity {
    /// Row-major index on the 34x34 grid, in \[0, 1155\].
    pub index: u16,
    /// Grid row in \[0, 33\].
    pub row: u8,
    /// Grid column in \[0, 33\].
    pub col: u8,
    /// Quadrant number in \[1, 4\].
    pub quadrant: u8,
    /// TES channel in \[1, 128\], or 0 if this cell has no bolometer.
    pub tes: u8,
    /// ASIC number in \[1, 8\], or 0 if this cell has no bolometer.
    pub asic: u8,
}

impl FpIdentity {
    pub fn is_detector(&self) -> bool {
        self.tes != 0
    }
}

lazy_static! {
    /// The focal-plane identity table, derived once.
    static ref FP_IDENTITY: Vec<FpIdentity> = make_identity_table();

    /// Reverse lookup: (TES - 1, ASIC - 1) -> focal-plane index.
    static ref TES_TO_INDEX: Array2<u16> = {
        let mut map = Array2::zeros((NUM_TES, NUM_ASICS));
        for id in FP_IDENTITY.iter().filter(|id| id.is_detector()) {
            map[(usize::from(id.tes) - 1, usize::from(id.asic) - 1)] = id.index;
        }
        map
    };
}

/// Build the identity table. Quadrants are numbered clockwise from the
/// top-left corner of the image; within a quadrant, the first 256 cells
/// in row-major order are detectors (ASICs `2q-1` and `2q`, 128 TES
/// each) and the remaining 33 cells are gaps and support structure.
fn make_identity_table() -> Vec<FpIdentity> {
    let mut table = Vec::with_capacity(FP_NUM_INDICES);
    // Per-quadrant running count of detector cells.
    let mut counts = [0usize; 4];
    for index in 0..FP_NUM_INDICES {
        let row = index / FP_SIDE;
        let col = index % FP_SIDE;
        let quadrant = match (row < QUADRANT_SIDE, col < QUADRANT_SIDE) {
            (true, true) => 1,
            (true, false) => 2,
            (false, false) => 3,
            (false, true) => 4,
        };
        let count = &mut counts[quadrant - 1];
        let (tes, asic) = if *count < 2 * NUM_TES {
            let tes = (*count % NUM_TES) as u8 + 1;
            let asic = (2 * (quadrant - 1) + *count / NUM_TES) as u8 + 1;
            (tes, asic)
        } else {
            (0, 0)
        };
        *count += 1;
        table.push(FpIdentity {
            index: index as u16,
            row: row as u8,
            col: col as u8,
            quadrant: quadrant as u8,
            tes,
            asic,
        });
    }
    table
}

/// Convert a focal-plane index to the corresponding TES and ASIC
/// numbers. Returns (0, 0) if the cell is not a working detector.
pub fn index_to_tes_asic(index: usize) -> Result<(u8, u8), FocalPlaneError> {
    if index >= FP_NUM_INDICES {
        return Err(FocalPlaneError::InvalidIndex { got: index });
    }
    let id = &FP_IDENTITY[index];
    Ok((id.tes, id.asic))
}

/// Convert a (TES, ASIC) pair to its focal-plane index.
pub fn tes_to_index(tes: u8, asic: u8) -> Result<usize, FocalPlaneError> {
    if tes == 0 || usize::from(tes) > NUM_TES {
        return Err(FocalPlaneError::InvalidTes { got: tes });
    }
    if asic == 0 || usize::from(asic) > NUM_ASICS {
        return Err(FocalPlaneError::InvalidAsic { got: asic });
    }
    Ok(usize::from(
        TES_TO_INDEX[(usize::from(tes) - 1, usize::from(asic) - 1)],
    ))
}

/// Unfold a focal-plane image into per-channel signals, one column per
/// ASIC. Cells that are not detectors contribute nothing; (TES, ASIC)
/// slots never written stay NaN.
pub fn image_to_tes_signal(image: ArrayView2<f64>) -> Result<Array2<f64>, FocalPlaneError> {
    check_image_shape(image)?;
    let mut tes_signal = Array2::from_elem((NUM_TES, NUM_ASICS), f64::NAN);
    for (index, &value) in image.iter().enumerate() {
        let id = &FP_IDENTITY[index];
        if id.is_detector() {
            tes_signal[(usize::from(id.tes) - 1, usize::from(id.asic) - 1)] = value;
        }
    }
    Ok(tes_signal)
}

/// Fold per-channel signals back into a focal-plane image for the given
/// ASICs. Thermometer channels are skipped; every cell not written by a
/// requested ASIC is NaN.
pub fn tes_signal_to_image(
    tes_signal: ArrayView2<f64>,
    asics: &[u8],
) -> Result<Array2<f64>, FocalPlaneError> {
    if tes_signal.dim() != (NUM_TES, NUM_ASICS) {
        return Err(FocalPlaneError::BadSignalShape {
            got: tes_signal.dim(),
        });
    }
    let mut image = Array2::from_elem((FP_SIDE, FP_SIDE), f64::NAN);
    for &asic in asics {
        for tes in 1..=NUM_TES as u8 {
            if THERMOMETER_TES.contains(&tes) {
                continue;
            }
            let index = tes_to_index(tes, asic)?;
            image[(index / FP_SIDE, index % FP_SIDE)] =
                tes_signal[(usize::from(tes) - 1, usize::from(asic) - 1)];
        }
    }
    Ok(image)
}

/// A 34x34 mask of the working detectors: 1.0 on detector cells, NaN
/// elsewhere. Multiply an image by this to blank out gaps and support
/// structure.
pub fn detector_mask() -> Array2<f64> {
    let mut mask = Array2::from_elem((FP_SIDE, FP_SIDE), f64::NAN);
    for id in FP_IDENTITY.iter().filter(|id| id.is_detector()) {
        mask[(usize::from(id.row), usize::from(id.col))] = 1.0;
    }
    mask
}

/// Cut one 17x17 quadrant out of a full focal-plane image.
pub fn quadrant_image(
    image: ArrayView2<f64>,
    quadrant: u8,
) -> Result<Array2<f64>, FocalPlaneError> {
    check_image_shape(image)?;
    if quadrant < 1 || quadrant > 4 {
        return Err(FocalPlaneError::InvalidQuadrant { got: quadrant });
    }
    let mut quart = Array2::from_elem((QUADRANT_SIDE, QUADRANT_SIDE), f64::NAN);
    for id in FP_IDENTITY.iter().filter(|id| id.quadrant == quadrant) {
        let row = usize::from(id.row) % QUADRANT_SIDE;
        let col = usize::from(id.col) % QUADRANT_SIDE;
        quart[(row, col)] = image[(usize::from(id.row), usize::from(id.col))];
    }
    Ok(quart)
}

fn check_image_shape(image: ArrayView2<f64>) -> Result<(), FocalPlaneError> {
    if image.dim() != (FP_SIDE, FP_SIDE) {
        return Err(FocalPlaneError::BadImageShape { got: image.dim() });
    }
    Ok(())
}

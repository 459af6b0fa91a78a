// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FocalPlaneError {
    #[error("Focal-plane indices must be in [0, 1155], but {got} was supplied")]
    InvalidIndex { got: usize },

    #[error("TES numbers must be in [1, 128], but {got} was supplied")]
    InvalidTes { got: u8 },

    #[error("ASIC numbers must be in [1, 8], but {got} was supplied")]
    InvalidAsic { got: u8 },

    #[error("Quadrant numbers must be in [1, 4], but {got} was supplied")]
    InvalidQuadrant { got: u8 },

    #[error("A focal-plane image must have shape (34, 34), but {got:?} was supplied")]
    BadImageShape { got: (usize, usize) },

    #[error("A TES-signal array must have shape (128, 8), but {got:?} was supplied")]
    BadSignalShape { got: (usize, usize) },
}

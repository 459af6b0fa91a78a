// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("No realization files matched {pattern}")]
    NoFiles { pattern: String },

    #[error("An ensemble needs at least one realization file")]
    EmptyEnsemble,

    #[error("Invalid realization index {got}; the ensemble has {nreals} realizations")]
    InvalidRealizationIndex { got: usize, nreals: usize },

    #[error("Realization file {file} has maps of shape {got:?}; the rest of the ensemble has {expected:?}")]
    MismatchedShapes {
        file: PathBuf,
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },

    #[error("Realization file {file} has a different seen mask to the rest of the ensemble")]
    MismatchedSeen { file: PathBuf },

    #[error("The noise RMS must be positive and finite, but {got} was supplied")]
    InvalidNoiseRms { got: f64 },

    #[error(transparent)]
    Fits(#[from] fitsio::errors::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

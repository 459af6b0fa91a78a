// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::instrument::InstrumentError;

#[derive(Error, Debug)]
pub enum FringesError {
    #[error("Expected exactly {expected} aberration sample files, but found {got}")]
    WrongFileCount { expected: usize, got: usize },

    #[error("Aberration sample file {file} has no data rows")]
    EmptyFile { file: PathBuf },

    #[error("Aberration sample file {file} has no {column} column")]
    MissingColumn { column: String, file: PathBuf },

    #[error("Couldn't parse line {line} of aberration sample file {file}")]
    BadRow { file: PathBuf, line: usize },

    #[error("Aberration sample file {file} has {rows} rows; expected a square sample grid matching the other files")]
    BadSampling { file: PathBuf, rows: usize },

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

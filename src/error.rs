// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all selfcal-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelfCalError {
    #[error("Couldn't parse '{0}' as a baseline; expected two comma-separated horn numbers like '25,57'")]
    BadBaseline(String),

    #[error("Couldn't parse the TOML parameter file: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Instrument(#[from] crate::instrument::InstrumentError),

    #[error("{0}")]
    FocalPlane(#[from] crate::focalplane::FocalPlaneError),

    #[error("{0}")]
    Fringes(#[from] crate::fringes::FringesError),

    #[error("{0}")]
    Ensemble(#[from] crate::ensemble::EnsembleError),

    #[error("{0}")]
    Analysis(#[from] crate::analysis::AnalysisError),

    #[cfg(feature = "plotting")]
    #[error("{0}")]
    Draw(#[from] crate::plotting::DrawError),

    #[error("{0}")]
    IO(#[from] std::io::Error),
}

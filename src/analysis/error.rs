// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("At least 2 realizations are needed to estimate noise statistics, but {got} were supplied")]
    NotEnoughRealizations { got: usize },

    #[error("The number of zones must be at least 1")]
    NoZones,

    #[error("The seen mask has {got} pixels, but nside implies {expected}")]
    BadSeenLength { got: usize, expected: usize },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

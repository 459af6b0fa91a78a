// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("Error from the plotters library: {0}")]
    Plotters(Box<dyn std::error::Error + Send + Sync>),

    #[error("While drawing a heatmap panel: {0}")]
    Heatmap(String),

    #[error("All values of '{0}' are NaN; nothing to plot")]
    AllNan(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstrumentError {
    #[error("Horn indices must be in [1, 64], but {got} was supplied")]
    HornIndex { got: usize },

    #[error("A baseline needs two distinct horns, but horn {horn} was supplied twice")]
    DegenerateBaseline { horn: usize },

    #[error("This operation needs the {expected} instrument, but the configuration describes the {got}")]
    ConfigMismatch { expected: String, got: String },
}

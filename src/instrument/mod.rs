// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The horn array and its switch configurations.
//!
//! Horn indices are 1-based in \[1, 64\] everywhere on the public surface,
//! matching the labels printed on the instrument; they are converted to
//! 0-based offsets internally. A [`HornConfig`] is an immutable value: a
//! new one is constructed for every evaluation instead of mutating shared
//! state, so no two evaluations can ever see each other's switch flips.

mod error;

pub use error::InstrumentError;

use std::fmt;

use crate::constants::{HORN_GRID_SIDE, HORN_SPACING, NUM_HORNS};

/// Which instrument are we dealing with? Only the technological
/// demonstrator has aberration simulation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InstrumentKind {
    /// The technological demonstrator: 64 horns, one focal-plane quadrant.
    TD,
    /// The full instrument: 400 horns.
    FI,
}

impl InstrumentKind {
    pub fn num_horns(self) -> usize {
        match self {
            InstrumentKind::TD => NUM_HORNS,
            InstrumentKind::FI => 400,
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InstrumentKind::TD => write!(f, "TD"),
            InstrumentKind::FI => write!(f, "FI"),
        }
    }
}

/// The positions of the 64 TD horns, a regular 8x8 grid centred on the
/// optical axis.
#[derive(Debug, Clone)]
pub struct HornArray {
    /// Horn centres \[m\], indexed 0-based in horn order.
    centers: Vec<[f64; 2]>,
}

impl HornArray {
    pub fn td() -> HornArray {
        let half = (HORN_GRID_SIDE as f64 - 1.0) / 2.0;
        let mut centers = Vec::with_capacity(NUM_HORNS);
        for row in 0..HORN_GRID_SIDE {
            for col in 0..HORN_GRID_SIDE {
                centers.push([
                    (col as f64 - half) * HORN_SPACING,
                    (row as f64 - half) * HORN_SPACING,
                ]);
            }
        }
        HornArray { centers }
    }

    /// The centre of a horn \[m\]. `horn` is 1-based.
    pub fn center(&self, horn: usize) -> Result<[f64; 2], InstrumentError> {
        check_horn_index(horn)?;
        Ok(self.centers[horn - 1])
    }

    /// Distance between a horn's centre and the centre of the array \[m\].
    /// `horn` is 1-based.
    pub fn distance_to_center(&self, horn: usize) -> Result<f64, InstrumentError> {
        let [x, y] = self.center(horn)?;
        Ok((x * x + y * y).sqrt())
    }
}

fn check_horn_index(horn: usize) -> Result<(), InstrumentError> {
    if horn < 1 || horn > NUM_HORNS {
        return Err(InstrumentError::HornIndex { got: horn });
    }
    Ok(())
}

/// A designated pair of distinct horns used for an interference
/// measurement. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    first: usize,
    second: usize,
}

impl Baseline {
    pub fn new(first: usize, second: usize) -> Result<Baseline, InstrumentError> {
        check_horn_index(first)?;
        check_horn_index(second)?;
        if first == second {
            return Err(InstrumentError::DegenerateBaseline { horn: first });
        }
        Ok(Baseline { first, second })
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn second(&self) -> usize {
        self.second
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.second)
    }
}

/// Switches that are permanently stuck closed. Applied before any other
/// open/close delta in every "realistic" configuration.
#[derive(Debug, Clone, Default)]
pub struct DeadSwitchSet {
    horns: Vec<usize>,
}

impl DeadSwitchSet {
    pub fn new(horns: Vec<usize>) -> Result<DeadSwitchSet, InstrumentError> {
        for &horn in &horns {
            check_horn_index(horn)?;
        }
        Ok(DeadSwitchSet { horns })
    }

    pub fn empty() -> DeadSwitchSet {
        DeadSwitchSet { horns: vec![] }
    }

    pub fn horns(&self) -> &[usize] {
        &self.horns
    }
}

/// An immutable open/closed state for all 64 switches.
///
/// All constructors and combinators return new values; nothing here is
/// mutated in place once handed out.
#[derive(Clone, PartialEq, Eq)]
pub struct HornConfig {
    open: [bool; NUM_HORNS],
}

impl HornConfig {
    pub fn all_open() -> HornConfig {
        HornConfig {
            open: [true; NUM_HORNS],
        }
    }

    pub fn all_closed() -> HornConfig {
        HornConfig {
            open: [false; NUM_HORNS],
        }
    }

    /// A copy of this configuration with one switch closed. `horn` is
    /// 1-based and must have been validated beforehand (all public entry
    /// points take [`Baseline`]/[`DeadSwitchSet`] values, which are
    /// validated at construction).
    pub fn closed(mut self, horn: usize) -> HornConfig {
        self.open[horn - 1] = false;
        self
    }

    /// A copy of this configuration with one switch opened. `horn` is
    /// 1-based.
    pub fn opened(mut self, horn: usize) -> HornConfig {
        self.open[horn - 1] = true;
        self
    }

    /// A copy of this configuration with all dead switches forced closed.
    pub fn with_dead(mut self, dead: &DeadSwitchSet) -> HornConfig {
        for &horn in dead.horns() {
            self.open[horn - 1] = false;
        }
        self
    }

    /// Is this (1-based) horn open?
    pub fn is_open(&self, horn: usize) -> bool {
        self.open[horn - 1]
    }

    /// The 1-based indices of all open horns.
    pub fn open_horns(&self) -> Vec<usize> {
        self.open
            .iter()
            .enumerate()
            .filter(|(_, &o)| o)
            .map(|(i, _)| i + 1)
            .collect()
    }

    pub fn num_open(&self) -> usize {
        self.open.iter().filter(|&&o| o).count()
    }
}

impl fmt::Debug for HornConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HornConfig {{ open: {:?} }}", self.open_horns())
    }
}

/// The seven switch patterns that make up one fringe measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPattern {
    /// S: all horns open.
    AllOpen,
    /// C_{-i}: all open except the first baseline horn.
    AllButFirst,
    /// C_{-j}: all open except the second baseline horn.
    AllButSecond,
    /// S_{-ij}: all open except both baseline horns.
    AllButBaseline,
    /// C_i: only the first baseline horn open.
    OnlyFirst,
    /// C_j: only the second baseline horn open.
    OnlySecond,
    /// S_ij: only the two baseline horns open.
    OnlyBaseline,
}

impl SwitchPattern {
    pub const ALL: [SwitchPattern; 7] = [
        SwitchPattern::AllOpen,
        SwitchPattern::AllButFirst,
        SwitchPattern::AllButSecond,
        SwitchPattern::AllButBaseline,
        SwitchPattern::OnlyFirst,
        SwitchPattern::OnlySecond,
        SwitchPattern::OnlyBaseline,
    ];

    /// Build the switch configuration for this pattern.
    ///
    /// Dead switches are forced closed first in the four "realistic"
    /// patterns. The only-first/only-second/only-baseline patterns start
    /// from an all-closed array and open the baseline horn(s) regardless
    /// of the dead-switch set; these patterns are not realistic
    /// observables and deliberately bypass the dead-switch constraint.
    pub fn horn_config(self, baseline: Baseline, dead: &DeadSwitchSet) -> HornConfig {
        let (i, j) = (baseline.first(), baseline.second());
        match self {
            SwitchPattern::AllOpen => HornConfig::all_open().with_dead(dead),
            SwitchPattern::AllButFirst => HornConfig::all_open().with_dead(dead).closed(i),
            SwitchPattern::AllButSecond => HornConfig::all_open().with_dead(dead).closed(j),
            SwitchPattern::AllButBaseline => {
                HornConfig::all_open().with_dead(dead).closed(i).closed(j)
            }
            SwitchPattern::OnlyFirst => HornConfig::all_closed().opened(i),
            SwitchPattern::OnlySecond => HornConfig::all_closed().opened(j),
            SwitchPattern::OnlyBaseline => HornConfig::all_closed().opened(i).opened(j),
        }
    }
}

impl fmt::Display for SwitchPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwitchPattern::AllOpen => write!(f, "S"),
            SwitchPattern::AllButFirst => write!(f, "C_-i"),
            SwitchPattern::AllButSecond => write!(f, "C_-j"),
            SwitchPattern::AllButBaseline => write!(f, "S_-ij"),
            SwitchPattern::OnlyFirst => write!(f, "C_i"),
            SwitchPattern::OnlySecond => write!(f, "C_j"),
            SwitchPattern::OnlyBaseline => write!(f, "S_ij"),
        }
    }
}

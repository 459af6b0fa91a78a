// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fringe synthesis from optics-aberration simulation files.
//!
//! An aberration run produces one tab-separated sample file per horn
//! (64 in total) holding the magnitude and phase of the two field
//! polarization components on a square sample grid. Fringes are formed
//! with the same seven-pattern combination as the model path, except
//! that per-horn fields are summed directly from the files, after a
//! geometric phase correction for the source offset angle.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info};
use ndarray::{azip, prelude::*};

use super::FringesError;
use crate::{
    c64,
    constants::{NUM_HORNS, VEL_C},
    instrument::{Baseline, HornArray, InstrumentError, InstrumentKind},
    math::cexp,
};

/// The per-horn field samples of one aberration simulation run, loaded
/// fully into memory.
pub struct AberrationSet {
    /// Sample count along one side of the (square) grid.
    nn: usize,
    /// One entry per horn, in horn order.
    horns: Vec<HornSamples>,
}

struct HornSamples {
    mag_x: Array2<f64>,
    phase_x: Array2<f64>,
    mag_y: Array2<f64>,
    phase_y: Array2<f64>,
}

impl AberrationSet {
    /// Load all `.dat` files from a directory. There must be exactly
    /// one file per horn; files are associated to horns in sorted
    /// filename order.
    pub fn load(dir: &Path) -> Result<AberrationSet, FringesError> {
        let pattern = dir.join("*.dat");
        let mut files = vec![];
        for entry in glob::glob(&pattern.to_string_lossy())? {
            files.push(entry?);
        }
        files.sort();
        if files.len() != NUM_HORNS {
            return Err(FringesError::WrongFileCount {
                expected: NUM_HORNS,
                got: files.len(),
            });
        }

        let first = read_samples(&files[0], None)?;
        let nn = first.mag_x.nrows();
        info!("Aberration sampling resolution: {nn} x {nn}");

        let mut horns = Vec::with_capacity(NUM_HORNS);
        horns.push(first);
        for file in &files[1..] {
            horns.push(read_samples(file, Some(nn))?);
        }
        Ok(AberrationSet { nn, horns })
    }

    /// Sample count along one side of the grid.
    pub fn sampling(&self) -> usize {
        self.nn
    }

    /// Power on the focal plane at the simulation's sampling
    /// resolution, for a given set of open horns (1-based).
    ///
    /// Each horn's phase is first corrected by the geometric term
    /// `-2 pi / c * nu * d * sin(theta)` for its distance `d` to the
    /// array centre, then the complex fields are summed per
    /// polarization and squared.
    pub fn power_on_focal_plane(
        &self,
        open_horns: &[usize],
        horn_array: &HornArray,
        theta_source_deg: f64,
        freq_source_ghz: f64,
    ) -> Result<Array2<f64>, FringesError> {
        let mut e_x = Array2::<c64>::zeros((self.nn, self.nn));
        let mut e_y = Array2::<c64>::zeros((self.nn, self.nn));
        for &horn in open_horns {
            let d = horn_array.distance_to_center(horn)?;
            let phi = -2.0 * std::f64::consts::PI / VEL_C
                * (freq_source_ghz * 1e9)
                * d
                * theta_source_deg.to_radians().sin();
            let samples = &self.horns[horn - 1];
            azip!((e in &mut e_x, &mag in &samples.mag_x, &phase in &samples.phase_x) {
                *e += mag * cexp(phase + phi);
            });
            azip!((e in &mut e_y, &mag in &samples.mag_y, &phase in &samples.phase_y) {
                *e += mag * cexp(phase + phi);
            });
        }
        Ok(e_x.mapv(|e| e.norm_sqr()) + e_y.mapv(|e| e.norm_sqr()))
    }
}

/// Fringes on the focal plane with optical aberrations, at the
/// simulation's sampling resolution.
///
/// Only the technological demonstrator has aberration files; requesting
/// this for another instrument is a configuration mismatch. The
/// "only horn i" divisor and the other patterns are built from explicit
/// horn lists, so dead switches play no role here.
pub fn combine_fringes_aberration(
    kind: InstrumentKind,
    set: &AberrationSet,
    baseline: Baseline,
    horn_array: &HornArray,
    theta_source_deg: f64,
    freq_source_ghz: f64,
) -> Result<Array2<f64>, FringesError> {
    if kind != InstrumentKind::TD {
        return Err(FringesError::Instrument(InstrumentError::ConfigMismatch {
            expected: InstrumentKind::TD.to_string(),
            got: kind.to_string(),
        }));
    }

    let (i, j) = (baseline.first(), baseline.second());
    let all: Vec<usize> = (1..=NUM_HORNS).collect();
    let minus = |horns: &[usize]| -> Vec<usize> {
        all.iter().copied().filter(|h| !horns.contains(h)).collect()
    };

    let mut power = |label: &str, open: &[usize]| {
        debug!("baseline {baseline}: aberration power for {label} ({} horns open)", open.len());
        set.power_on_focal_plane(open, horn_array, theta_source_deg, freq_source_ghz)
    };

    let s = power("S", &all)?;
    let c_minus_i = power("C_-i", &minus(&[i]))?;
    let c_minus_j = power("C_-j", &minus(&[j]))?;
    let s_minus_ij = power("S_-ij", &minus(&[i, j]))?;
    let c_i = power("C_i", &[i])?;

    Ok((s - c_minus_i - c_minus_j + s_minus_ij) / c_i)
}

/// Parse one horn's sample file. The header line names the columns;
/// `X_Index`, `MagX`, `PhaseX`, `MagY` and `PhaseY` must be present.
/// The grid side is the last row's `X_Index` plus one, and the row
/// count must be its square.
fn read_samples(file: &Path, expected_nn: Option<usize>) -> Result<HornSamples, FringesError> {
    let reader = BufReader::new(File::open(file)?);
    let mut lines = reader.lines();

    let header = lines.next().ok_or_else(|| FringesError::EmptyFile {
        file: file.to_path_buf(),
    })??;
    let columns: Vec<&str> = header.split_whitespace().collect();
    let column = |name: &str| -> Result<usize, FringesError> {
        columns
            .iter()
            .position(|&c| c == name)
            .ok_or_else(|| FringesError::MissingColumn {
                column: name.to_string(),
                file: file.to_path_buf(),
            })
    };
    let i_x_index = column("X_Index")?;
    let i_mag_x = column("MagX")?;
    let i_phase_x = column("PhaseX")?;
    let i_mag_y = column("MagY")?;
    let i_phase_y = column("PhaseY")?;

    let mut rows: Vec<[f64; 5]> = vec![];
    for (i_line, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parse = |i_col: usize| -> Result<f64, FringesError> {
            fields
                .get(i_col)
                .and_then(|f| f.parse().ok())
                .ok_or_else(|| FringesError::BadRow {
                    file: file.to_path_buf(),
                    // +2: 1-based, after the header.
                    line: i_line + 2,
                })
        };
        rows.push([
            parse(i_x_index)?,
            parse(i_mag_x)?,
            parse(i_phase_x)?,
            parse(i_mag_y)?,
            parse(i_phase_y)?,
        ]);
    }

    let nn = match rows.last() {
        Some(last) => last[0] as usize + 1,
        None => {
            return Err(FringesError::EmptyFile {
                file: file.to_path_buf(),
            })
        }
    };
    if rows.len() != nn * nn || expected_nn.is_some_and(|e| e != nn) {
        return Err(FringesError::BadSampling {
            file: file.to_path_buf(),
            rows: rows.len(),
        });
    }

    let grid = |i_col: usize| {
        Array1::from_iter(rows.iter().map(|r| r[i_col]))
            .into_shape_with_order((nn, nn))
            .expect("row count checked above")
    };
    Ok(HornSamples {
        mag_x: grid(1),
        phase_x: grid(2),
        mag_y: grid(3),
        phase_y: grid(4),
    })
}

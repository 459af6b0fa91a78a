// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reconstructed-map noise realizations: FITS persistence, file
//! discovery, and the observed-patch view the statistics run on.
//!
//! One FITS file holds one realization: the reconstructed maps, the
//! input maps convolved to the reconstruction resolution, their
//! difference, and the boolean "seen" mask of observed sky pixels. All
//! map HDUs have shape (subband, pixel, Stokes). Filenames encode a
//! date, an experiment name, a "noiseless" flag and the realization
//! index; ensemble discovery filters on the flag.

mod error;
pub mod synthetic;
#[cfg(test)]
mod tests;

pub use error::EnsembleError;

use std::path::{Path, PathBuf};

use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};
use log::{debug, info};
use ndarray::prelude::*;

/// The number of Stokes components carried in every map (I, Q, U).
pub const NUM_STOKES: usize = 3;

/// Labels for the Stokes axis, in storage order.
pub const STOKES: [&str; NUM_STOKES] = ["I", "Q", "U"];

/// One noise realization, fully loaded in memory.
pub struct MapRealization {
    /// Reconstructed maps, shape (subband, pixel, Stokes).
    pub recon: Array3<f64>,
    /// Input maps convolved to the reconstruction resolution, same
    /// shape.
    pub convolved: Array3<f64>,
    /// `recon - convolved`, same shape.
    pub diff: Array3<f64>,
    /// Which sky pixels were observed.
    pub seen: Vec<bool>,
    /// Healpix nside of the maps.
    pub nside: usize,
}

impl MapRealization {
    /// Write this realization to a new FITS file.
    pub fn write(&self, path: &Path) -> Result<(), EnsembleError> {
        let mut fptr = FitsFile::create(path).open()?;
        let (nsub, npix, _) = self.recon.dim();

        let hdu = fptr.primary_hdu()?;
        hdu.write_key(&mut fptr, "NSUB", nsub as i64)?;
        hdu.write_key(&mut fptr, "NPIX", npix as i64)?;
        hdu.write_key(&mut fptr, "NSIDE", self.nside as i64)?;

        for (extname, map) in [
            ("RECON", &self.recon),
            ("CONVO", &self.convolved),
            ("DIFF", &self.diff),
        ] {
            let description = ImageDescription {
                data_type: ImageType::Double,
                dimensions: &[nsub, npix, NUM_STOKES],
            };
            let hdu = fptr.create_image(extname, &description)?;
            let flat: Vec<f64> = map.iter().copied().collect();
            hdu.write_image(&mut fptr, &flat)?;
        }

        let description = ImageDescription {
            data_type: ImageType::UnsignedByte,
            dimensions: &[self.seen.len()],
        };
        let hdu = fptr.create_image("SEEN", &description)?;
        let flat: Vec<u8> = self.seen.iter().map(|&s| u8::from(s)).collect();
        hdu.write_image(&mut fptr, &flat)?;

        debug!("Wrote realization to {}", path.display());
        Ok(())
    }

    /// Read one realization back.
    pub fn read(path: &Path) -> Result<MapRealization, EnsembleError> {
        let mut fptr = FitsFile::open(path)?;
        let hdu = fptr.primary_hdu()?;
        let nsub: i64 = hdu.read_key(&mut fptr, "NSUB")?;
        let nside: i64 = hdu.read_key(&mut fptr, "NSIDE")?;
        let npix: i64 = hdu.read_key(&mut fptr, "NPIX")?;
        let shape = (nsub as usize, npix as usize, NUM_STOKES);

        let mut read_map = |extname: &str| -> Result<Array3<f64>, EnsembleError> {
            let hdu = fptr.hdu(extname)?;
            let flat: Vec<f64> = hdu.read_image(&mut fptr)?;
            Ok(Array3::from_shape_vec(shape, flat)?)
        };
        let recon = read_map("RECON")?;
        let convolved = read_map("CONVO")?;
        let diff = read_map("DIFF")?;

        let hdu = fptr.hdu("SEEN")?;
        let seen_flat: Vec<u8> = hdu.read_image(&mut fptr)?;
        let seen: Vec<bool> = seen_flat.into_iter().map(|s| s != 0).collect();

        Ok(MapRealization {
            recon,
            convolved,
            diff,
            seen,
            nside: nside as usize,
        })
    }

    /// The reconstructed maps restricted to the observed pixels, shape
    /// (subband, patch pixel, Stokes). Patch pixels keep increasing
    /// sky-pixel order.
    pub fn recon_patch(&self) -> Array3<f64> {
        extract_patch(self.recon.view(), &self.seen)
    }
}

/// Restrict a (subband, pixel, Stokes) map to the pixels flagged in
/// `seen`, preserving the other axes.
pub fn extract_patch(map: ArrayView3<f64>, seen: &[bool]) -> Array3<f64> {
    let indices: Vec<usize> = seen
        .iter()
        .enumerate()
        .filter(|(_, &s)| s)
        .map(|(i, _)| i)
        .collect();
    map.select(Axis(1), &indices)
}

/// The canonical realization filename.
pub fn realization_filename(date: &str, name: &str, noiseless: bool, index: usize) -> String {
    format!(
        "{date}_{name}_noiseless{}_{index:04}.fits",
        if noiseless { "True" } else { "False" }
    )
}

/// Find all realization files of one ensemble under `dir`, in sorted
/// order. Only files whose name carries the matching "noiseless" flag
/// belong to the ensemble.
pub fn discover_realizations(
    dir: &Path,
    name: &str,
    noiseless: bool,
) -> Result<Vec<PathBuf>, EnsembleError> {
    let pattern = dir
        .join(format!(
            "*_{name}_noiseless{}_*.fits",
            if noiseless { "True" } else { "False" }
        ))
        .to_string_lossy()
        .into_owned();
    let mut files = vec![];
    for entry in glob::glob(&pattern)? {
        files.push(entry?);
    }
    files.sort();
    if files.is_empty() {
        return Err(EnsembleError::NoFiles { pattern });
    }
    Ok(files)
}

/// An ensemble of realization patches, loaded fully into memory and
/// never mutated afterwards.
pub struct PatchEnsemble {
    /// The common seen mask.
    pub seen: Vec<bool>,
    /// Healpix nside of the maps.
    pub nside: usize,
    /// Reconstructed patches, shape (realization, subband, patch pixel,
    /// Stokes).
    pub patches: Array4<f64>,
}

impl PatchEnsemble {
    /// Load every file of an ensemble. All files must agree on map
    /// shape and seen mask.
    pub fn load(files: &[PathBuf]) -> Result<PatchEnsemble, EnsembleError> {
        let [first, rest @ ..] = files else {
            return Err(EnsembleError::EmptyEnsemble);
        };

        let real = MapRealization::read(first)?;
        let seen = real.seen.clone();
        let nside = real.nside;
        let first_patch = real.recon_patch();
        let (nsub, npix_patch, _) = first_patch.dim();
        info!(
            "Loading {} realizations of shape ({nsub} subbands, {npix_patch} patch pixels, {NUM_STOKES} Stokes)",
            files.len()
        );

        let mut patches = Array4::zeros((files.len(), nsub, npix_patch, NUM_STOKES));
        patches.index_axis_mut(Axis(0), 0).assign(&first_patch);
        for (i, file) in rest.iter().enumerate() {
            let real = MapRealization::read(file)?;
            if real.recon.dim() != (nsub, seen.len(), NUM_STOKES) {
                return Err(EnsembleError::MismatchedShapes {
                    file: file.clone(),
                    expected: (nsub, seen.len(), NUM_STOKES),
                    got: real.recon.dim(),
                });
            }
            if real.seen != seen {
                return Err(EnsembleError::MismatchedSeen { file: file.clone() });
            }
            patches
                .index_axis_mut(Axis(0), i + 1)
                .assign(&real.recon_patch());
        }
        Ok(PatchEnsemble {
            seen,
            nside,
            patches,
        })
    }

    pub fn num_realizations(&self) -> usize {
        self.patches.dim().0
    }

    pub fn num_subbands(&self) -> usize {
        self.patches.dim().1
    }

    pub fn num_patch_pixels(&self) -> usize {
        self.patches.dim().2
    }

    /// One full realization patch, by index. Fails if fewer files were
    /// discovered than the requested index implies.
    pub fn realization(&self, index: usize) -> Result<ArrayView3<f64>, EnsembleError> {
        if index >= self.num_realizations() {
            return Err(EnsembleError::InvalidRealizationIndex {
                got: index,
                nreals: self.num_realizations(),
            });
        }
        Ok(self.patches.index_axis(Axis(0), index))
    }
}

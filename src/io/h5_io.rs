// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Implementation of functions for reading `vaspout.h5` files.

use std::path::Path;

use hdf5::{Dataset, File};
use ndarray::{Array2, Array3};

use crate::errors::ReadH5Error;
use crate::structures::trajectory::RawTrajectory;

/// Path of the dataset storing the per-step energies (one column per energy component).
pub const ENERGIES: &str = "intermediate/ion_dynamics/energies";
/// Path of the dataset storing the per-step forces acting on the ions.
pub const FORCES: &str = "intermediate/ion_dynamics/forces";
/// Path of the dataset storing the per-step ion positions.
pub const POSITIONS: &str = "intermediate/ion_dynamics/position_ions";
/// Path of the dataset storing the per-step lattice basis vectors.
pub const LATTICE_VECTORS: &str = "intermediate/ion_dynamics/lattice_vectors";
/// Path of the optional dataset storing the selective dynamics flags.
pub const SELECTIVE_DYNAMICS: &str = "input/poscar/selective_dynamics_ions";

impl RawTrajectory {
    /// Read the raw trajectory arrays from a `vaspout.h5` file.
    ///
    /// The file is opened read-only and closed before this function returns.
    /// The selective dynamics mask is only extracted if the file provides it.
    ///
    /// ## Returns
    /// `RawTrajectory` if successful, `ReadH5Error` otherwise:
    /// - `CouldNotOpen` if the file does not exist or is not an hdf5 container,
    /// - `MissingDataset` if any of the four required datasets is absent,
    /// - `CouldNotRead` if a dataset exists but could not be read,
    /// - `InvalidShape` if a dataset does not have the expected number of dimensions.
    ///
    /// ## Notes
    /// - Cross-array shape invariants (matching step and atom counts) are
    ///   **not** checked here; they are checked by
    ///   [`Trajectory::new`](crate::structures::trajectory::Trajectory::new).
    pub fn from_file(filename: impl AsRef<Path>) -> Result<RawTrajectory, ReadH5Error> {
        let file = File::open(&filename)
            .map_err(|e| ReadH5Error::CouldNotOpen(Box::from(filename.as_ref()), e))?;

        let energies = read_matrix(&file, ENERGIES)?;
        let forces = read_stack(&file, FORCES)?;
        let positions = read_stack(&file, POSITIONS)?;
        let lattice_vectors = read_stack(&file, LATTICE_VECTORS)?;

        // the mask is duck-typed on path existence
        let selective_dynamics = if file.link_exists(SELECTIVE_DYNAMICS) {
            Some(read_mask(&file, SELECTIVE_DYNAMICS)?)
        } else {
            None
        };

        Ok(RawTrajectory {
            energies,
            forces,
            positions,
            lattice_vectors,
            selective_dynamics,
        })
    }
}

/// Open a dataset, distinguishing an absent path from an unreadable one.
fn open_dataset(file: &File, name: &str) -> Result<Dataset, ReadH5Error> {
    if !file.link_exists(name) {
        return Err(ReadH5Error::MissingDataset(name.to_owned()));
    }

    file.dataset(name)
        .map_err(|e| ReadH5Error::CouldNotRead(name.to_owned(), e))
}

/// Read a two-dimensional float dataset.
fn read_matrix(file: &File, name: &str) -> Result<Array2<f64>, ReadH5Error> {
    let dataset = open_dataset(file, name)?;
    let shape = dataset.shape();
    if shape.len() != 2 {
        return Err(invalid_rank(name, 2, &shape));
    }

    let values = dataset
        .read_raw::<f64>()
        .map_err(|e| ReadH5Error::CouldNotRead(name.to_owned(), e))?;

    Ok(Array2::from_shape_vec((shape[0], shape[1]), values).expect(
        "FATAL VOPT ERROR | h5_io::read_matrix | Dataset length does not match its shape.",
    ))
}

/// Read a three-dimensional float dataset.
fn read_stack(file: &File, name: &str) -> Result<Array3<f64>, ReadH5Error> {
    let dataset = open_dataset(file, name)?;
    let shape = dataset.shape();
    if shape.len() != 3 {
        return Err(invalid_rank(name, 3, &shape));
    }

    let values = dataset
        .read_raw::<f64>()
        .map_err(|e| ReadH5Error::CouldNotRead(name.to_owned(), e))?;

    Ok(
        Array3::from_shape_vec((shape[0], shape[1], shape[2]), values).expect(
            "FATAL VOPT ERROR | h5_io::read_stack | Dataset length does not match its shape.",
        ),
    )
}

/// Read the selective dynamics mask.
///
/// The mask is read as `i64` so that files storing any integer width load
/// without a narrowing conversion.
fn read_mask(file: &File, name: &str) -> Result<Array2<i64>, ReadH5Error> {
    let dataset = open_dataset(file, name)?;
    let shape = dataset.shape();
    if shape.len() != 2 {
        return Err(invalid_rank(name, 2, &shape));
    }

    let values = dataset
        .read_raw::<i64>()
        .map_err(|e| ReadH5Error::CouldNotRead(name.to_owned(), e))?;

    Ok(Array2::from_shape_vec((shape[0], shape[1]), values).expect(
        "FATAL VOPT ERROR | h5_io::read_mask | Dataset length does not match its shape.",
    ))
}

fn invalid_rank(name: &str, expected: usize, shape: &[usize]) -> ReadH5Error {
    ReadH5Error::InvalidShape {
        dataset: name.to_owned(),
        expected: format!("{} dimensions", expected),
        actual: format!("{} dimensions ({:?})", shape.len(), shape),
    }
}

/******************************/
/*        UNIT TESTS          */
/******************************/

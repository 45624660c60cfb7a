// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Error types that can be returned by the `vopt_rs` library.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading a `vaspout.h5` file.
#[derive(Error, Debug)]
pub enum ReadH5Error {
    /// Used when the file does not exist or cannot be opened as an hdf5 container.
    #[error("file `{}` could not be opened as an hdf5 container", .0.to_str().unwrap_or("unknown"))]
    CouldNotOpen(Box<Path>, #[source] hdf5::Error),
    /// Used when a required dataset is not present in the hdf5 container.
    #[error("dataset `{0}` does not exist in the hdf5 container")]
    MissingDataset(String),
    /// Used when a dataset exists but its contents could not be read.
    #[error("dataset `{0}` could not be read")]
    CouldNotRead(String, #[source] hdf5::Error),
    /// Used when a dataset violates the expected shape of a trajectory.
    #[error("dataset `{dataset}` has an invalid shape (expected {expected}, got {actual})")]
    InvalidShape {
        /// Path of the offending dataset.
        dataset: String,
        /// Description of the expected shape.
        expected: String,
        /// Description of the shape that was actually found.
        actual: String,
    },
    /// Used when the requested energy component does not exist in the energies dataset.
    #[error(
        "energy component `{component}` was requested but the energies dataset only provides {available} components"
    )]
    InvalidEnergyComponent {
        /// The requested (zero-based) energy component.
        component: usize,
        /// The number of components the file actually provides.
        available: usize,
    },
}

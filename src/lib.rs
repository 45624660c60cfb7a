// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! # vopt_rs: VASP Geometry Optimization Analysis Library for Rust
//!
//! Rust library for following the convergence of geometry optimizations and
//! ab-initio molecular dynamics runs performed with VASP. It reads the
//! `vaspout.h5` file written by VASP and reduces the per-step arrays
//! (energies, forces, positions, lattice vectors) into the scalar series a
//! viewer wants to plot or tabulate: energy drift, RMS and maximum force,
//! RMS and maximum displacement, cumulative displacement, lattice vector
//! norms, and cell volumes.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add vopt_rs
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use vopt_rs::prelude::*;
//! ```
//!
//! ## Examples
//!
//! #### Following an optimization
//!
//! Read a `vaspout.h5` file and print the energy convergence.
//!
//! ```no_run
//! use vopt_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     // read the file; forces on frozen degrees of freedom are zeroed
//!     // and all derived series are computed before this returns
//!     let trajectory = Trajectory::from_file("vaspout.h5")?;
//!
//!     let derived = trajectory.derived();
//!     println!("lowest energy: {} eV", derived.min_energy());
//!
//!     for (step, de) in derived.delta_e().iter().enumerate() {
//!         println!("step {:4}: ΔE = {:14.8} eV", step + 1, de);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Feeding a front end
//!
//! Extract plain-data series that a charting or table widget can consume
//! directly.
//!
//! ```no_run
//! use vopt_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let trajectory = Trajectory::from_file("vaspout.h5")?;
//!
//!     // series for the "Energy and forces" page
//!     let energy_view = trajectory.energy_forces_view();
//!     // series for the "Positions and lattice" page
//!     let position_view = trajectory.positions_lattice_view();
//!     // one table row per optimization step
//!     let rows = trajectory.step_rows();
//!
//!     assert_eq!(energy_view.steps.len(), rows.len());
//!     assert_eq!(position_view.cell_volumes.len(), rows.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Loading off the main thread
//!
//! A graphical front end should not block while the file is read. The
//! [`load_in_background`](crate::background::load_in_background) function
//! runs the whole pipeline on a worker thread and delivers exactly one
//! result (the trajectory or a typed error) through a channel.
//!
//! ```no_run
//! use vopt_rs::prelude::*;
//!
//! let pending = load_in_background("vaspout.h5");
//!
//! // ... stay responsive ...
//!
//! match pending.recv().expect("exactly one result is delivered") {
//!     Ok(trajectory) => println!("loaded {} steps", trajectory.n_steps()),
//!     Err(e) => eprintln!("error while opening file: {}", e),
//! }
//! ```
//!
//! ## Error handling
//! Every failure is surfaced as a typed [`ReadH5Error`](crate::errors::ReadH5Error):
//! an unreadable container, a missing dataset (named), or a shape violation
//! (expected vs actual). Errors are never swallowed and a failed load never
//! leaves a partially constructed trajectory behind. The error types are not
//! exported into the `prelude`; include them explicitly when you need to
//! match on them:
//! ```
//! use vopt_rs::errors::ReadH5Error;
//! ```
//!
//! ## Features
//! - [x] reading `vaspout.h5` files
//! - [x] selective dynamics aware force statistics
//! - [x] energy, force, displacement, and lattice convergence series
//! - [x] per-step summary table
//! - [x] background loading with single-shot delivery
//! - [ ] reading OUTCAR/XDATCAR trajectories
//!
//! ## Optional cargo features
//! - `serde`: serialization of the derived series and view structures
//! - `static-hdf5`: build and link a bundled HDF5 instead of the system library
//!
//! ## License
//! This library is released under the MIT License.

/// Current version of the `vopt_rs` library.
pub const VOPT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod background;
pub mod errors;
pub mod io;
pub mod structures;
pub mod views;

/// Reexported basic `vopt_rs` structures and functions.
pub mod prelude {
    pub use crate::background::{load_in_background, load_in_background_with_component};
    pub use crate::structures::derived::DerivedSeries;
    pub use crate::structures::trajectory::{
        RawTrajectory, Trajectory, DEFAULT_ENERGY_COMPONENT,
    };
    pub use crate::views::{EnergyForcesView, PositionsLatticeView, StepRow};
}

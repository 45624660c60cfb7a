// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Implementation of the validated optimization trajectory.

use std::path::Path;

use getset::{CopyGetters, Getters};
use ndarray::{s, Array1, Array2, Array3};

use crate::errors::ReadH5Error;
use crate::io::h5_io;
use crate::structures::derived::DerivedSeries;

/// Energy component that is selected when none is requested explicitly.
///
/// This is the second energy component reported by VASP in the `energies`
/// dataset, matching the convention used by other viewers of `vaspout.h5`
/// files. Which energy definition this corresponds to depends on the
/// calculation that wrote the file; use
/// [`Trajectory::from_file_with_component`] to select a different one.
pub const DEFAULT_ENERGY_COMPONENT: usize = 1;

/// Raw per-step arrays extracted from a `vaspout.h5` file.
///
/// This is the unvalidated form of a trajectory: shape invariants have not
/// been checked yet and the selective dynamics mask (if the file provided
/// one) has not been applied to the forces. Convert it into a [`Trajectory`]
/// with [`Trajectory::new`].
#[derive(Debug, Clone)]
pub struct RawTrajectory {
    /// Per-step energies, one row per step, one column per energy component.
    pub energies: Array2<f64>,
    /// Per-step forces acting on the ions. Shape `(steps, atoms, 3)`.
    pub forces: Array3<f64>,
    /// Per-step ion positions. Shape `(steps, atoms, 3)`.
    pub positions: Array3<f64>,
    /// Per-step lattice basis vectors. Shape `(steps, 3, 3)`.
    pub lattice_vectors: Array3<f64>,
    /// Selective dynamics flags, if the file provides them. Shape `(atoms, 3)`.
    /// A value of zero marks a frozen degree of freedom.
    pub selective_dynamics: Option<Array2<i64>>,
}

/// A validated VASP optimization trajectory with its derived series.
///
/// Once constructed, a `Trajectory` is immutable: forces on frozen degrees
/// of freedom have been zeroed, the requested energy component has been
/// selected, and all [`DerivedSeries`] have been computed. There is no way
/// to observe a partially constructed trajectory.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Trajectory {
    /// The selected per-step energy series (eV).
    #[getset(get = "pub")]
    energies: Array1<f64>,
    /// Zero-based index of the energy component that was selected.
    #[getset(get_copy = "pub")]
    energy_component: usize,
    /// Per-step forces with the selective dynamics mask applied (eV/Å).
    #[getset(get = "pub")]
    forces: Array3<f64>,
    /// Per-step ion positions (Å).
    #[getset(get = "pub")]
    positions: Array3<f64>,
    /// Per-step lattice basis vectors (Å).
    #[getset(get = "pub")]
    lattice_vectors: Array3<f64>,
    /// Series derived from the trajectory, computed eagerly at construction.
    #[getset(get = "pub")]
    derived: DerivedSeries,
}

impl Trajectory {
    /// Load a trajectory from a `vaspout.h5` file using the
    /// [default energy component](DEFAULT_ENERGY_COMPONENT).
    ///
    /// ## Returns
    /// `Trajectory` if successful, `ReadH5Error` otherwise.
    ///
    /// ## Example
    /// ```no_run
    /// use vopt_rs::prelude::*;
    ///
    /// let trajectory = match Trajectory::from_file("vaspout.h5") {
    ///     Ok(x) => x,
    ///     Err(e) => {
    ///         eprintln!("{}", e);
    ///         return;
    ///     }
    /// };
    ///
    /// println!("lowest energy: {} eV", trajectory.derived().min_energy());
    /// ```
    ///
    /// ## Notes
    /// - The file is opened read-only and is closed again before this
    ///   function returns.
    /// - The whole pipeline (reading, validation, masking, derived series)
    ///   runs to completion before the trajectory is handed out; on error,
    ///   no partial value exists.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Trajectory, ReadH5Error> {
        Trajectory::from_file_with_component(filename, DEFAULT_ENERGY_COMPONENT)
    }

    /// Load a trajectory from a `vaspout.h5` file selecting a specific
    /// energy component.
    ///
    /// `energy_component` is the zero-based column of the
    /// `intermediate/ion_dynamics/energies` dataset to use as the energy
    /// series of the trajectory.
    pub fn from_file_with_component(
        filename: impl AsRef<Path>,
        energy_component: usize,
    ) -> Result<Trajectory, ReadH5Error> {
        let raw = RawTrajectory::from_file(filename)?;
        Trajectory::new(raw, energy_component)
    }

    /// Validate a raw trajectory and construct the final trajectory record.
    ///
    /// Checks the shape invariants, applies the selective dynamics mask to
    /// the forces, selects the requested energy component, and eagerly
    /// computes all derived series.
    ///
    /// ## Returns
    /// `Trajectory` if successful, `ReadH5Error::InvalidShape` or
    /// `ReadH5Error::InvalidEnergyComponent` otherwise.
    ///
    /// ## Example
    /// ```
    /// use vopt_rs::prelude::*;
    /// use ndarray::{arr2, Array3};
    ///
    /// let raw = RawTrajectory {
    ///     energies: arr2(&[[0.3, 10.0], [0.1, 9.5]]),
    ///     forces: Array3::zeros((2, 4, 3)),
    ///     positions: Array3::zeros((2, 4, 3)),
    ///     lattice_vectors: Array3::zeros((2, 3, 3)),
    ///     selective_dynamics: None,
    /// };
    ///
    /// let trajectory = Trajectory::new(raw, 1).unwrap();
    /// assert_eq!(trajectory.n_steps(), 2);
    /// assert_eq!(trajectory.n_atoms(), 4);
    /// ```
    pub fn new(raw: RawTrajectory, energy_component: usize) -> Result<Trajectory, ReadH5Error> {
        raw.validate(energy_component)?;

        let RawTrajectory {
            energies,
            mut forces,
            positions,
            lattice_vectors,
            selective_dynamics,
        } = raw;

        if let Some(mask) = &selective_dynamics {
            apply_selective_dynamics(&mut forces, mask);
        }

        let energies = energies.column(energy_component).to_owned();
        let derived = DerivedSeries::compute(&energies, &forces, &positions, &lattice_vectors);

        Ok(Trajectory {
            energies,
            energy_component,
            forces,
            positions,
            lattice_vectors,
            derived,
        })
    }

    /// Get the number of optimization steps in the trajectory.
    #[inline(always)]
    pub fn n_steps(&self) -> usize {
        self.energies.len()
    }

    /// Get the number of ions in the trajectory.
    #[inline(always)]
    pub fn n_atoms(&self) -> usize {
        self.forces.dim().1
    }
}

impl RawTrajectory {
    /// Check the shape invariants that a trajectory must satisfy.
    fn validate(&self, energy_component: usize) -> Result<(), ReadH5Error> {
        let n_steps = self.energies.nrows();
        if n_steps == 0 {
            return Err(ReadH5Error::InvalidShape {
                dataset: h5_io::ENERGIES.to_owned(),
                expected: "at least one optimization step".to_owned(),
                actual: "0 steps".to_owned(),
            });
        }

        let n_components = self.energies.ncols();
        if energy_component >= n_components {
            return Err(ReadH5Error::InvalidEnergyComponent {
                component: energy_component,
                available: n_components,
            });
        }

        let (f_steps, n_atoms, f_spatial) = self.forces.dim();
        if n_atoms == 0 {
            return Err(ReadH5Error::InvalidShape {
                dataset: h5_io::FORCES.to_owned(),
                expected: "at least one atom".to_owned(),
                actual: "0 atoms".to_owned(),
            });
        }

        if f_steps != n_steps || f_spatial != 3 {
            return Err(ReadH5Error::InvalidShape {
                dataset: h5_io::FORCES.to_owned(),
                expected: format!("({}, atoms, 3)", n_steps),
                actual: format!("{:?}", self.forces.dim()),
            });
        }

        if self.positions.dim() != self.forces.dim() {
            return Err(ReadH5Error::InvalidShape {
                dataset: h5_io::POSITIONS.to_owned(),
                expected: format!("{:?}", self.forces.dim()),
                actual: format!("{:?}", self.positions.dim()),
            });
        }

        if self.lattice_vectors.dim() != (n_steps, 3, 3) {
            return Err(ReadH5Error::InvalidShape {
                dataset: h5_io::LATTICE_VECTORS.to_owned(),
                expected: format!("({}, 3, 3)", n_steps),
                actual: format!("{:?}", self.lattice_vectors.dim()),
            });
        }

        if let Some(mask) = &self.selective_dynamics {
            if mask.dim() != (n_atoms, 3) {
                return Err(ReadH5Error::InvalidShape {
                    dataset: h5_io::SELECTIVE_DYNAMICS.to_owned(),
                    expected: format!("({}, 3)", n_atoms),
                    actual: format!("{:?}", mask.dim()),
                });
            }
        }

        Ok(())
    }
}

/// Zero out forces on the degrees of freedom that were frozen during the
/// simulation. Frozen entries may carry large residual forces that must not
/// contaminate the force statistics.
///
/// A mask value of zero marks a frozen (atom, axis) pair; the corresponding
/// force is zeroed for every step. Applying the mask repeatedly has the same
/// effect as applying it once.
pub(crate) fn apply_selective_dynamics(forces: &mut Array3<f64>, mask: &Array2<i64>) {
    for ((atom, axis), &flag) in mask.indexed_iter() {
        if flag == 0 {
            forces.slice_mut(s![.., atom, axis]).fill(0.0);
        }
    }
}

/******************************/
/*        UNIT TESTS          */
/******************************/

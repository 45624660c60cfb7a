// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Implementation of the derived per-step series of an optimization trajectory.

use getset::{CopyGetters, Getters};
use nalgebra::Matrix3;
use ndarray::{s, Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};

/// Scalar and vector series derived from the raw trajectory arrays.
///
/// All series are computed eagerly, exactly once, when the parent
/// [`Trajectory`](crate::structures::trajectory::Trajectory) is constructed
/// and are never modified afterwards.
///
/// Series derived from a single step (forces, lattice) have length `N`,
/// where `N` is the number of optimization steps. Series derived from a step
/// *transition* (energy differences, displacements) have length `N - 1` and
/// are empty for a single-step trajectory. Consumers should treat empty
/// transition series as "nothing to plot", not as an error.
#[derive(Debug, Clone, Getters, CopyGetters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedSeries {
    /// Minimum of the selected energy series (eV).
    #[getset(get_copy = "pub")]
    min_energy: f64,
    /// Energy change between consecutive steps (eV). Length `N - 1`.
    #[getset(get = "pub")]
    delta_e: Array1<f64>,
    /// Norm of the force acting on each ion (eV/Å). Shape `(N, atoms)`.
    #[getset(get = "pub")]
    force_intensities: Array2<f64>,
    /// Root-mean-square of the force intensities over ions. Length `N`.
    #[getset(get = "pub")]
    forces_rms: Array1<f64>,
    /// Largest force intensity over ions. Length `N`.
    #[getset(get = "pub")]
    forces_max: Array1<f64>,
    /// Change of ion positions between consecutive steps (Å). Shape `(N - 1, atoms, 3)`.
    #[getset(get = "pub")]
    displacements: Array3<f64>,
    /// Norm of the displacement of each ion (Å). Shape `(N - 1, atoms)`.
    #[getset(get = "pub")]
    displacement_intensities: Array2<f64>,
    /// Root-mean-square of the displacement intensities over ions. Length `N - 1`.
    #[getset(get = "pub")]
    displacements_rms: Array1<f64>,
    /// Largest displacement intensity over ions. Length `N - 1`.
    #[getset(get = "pub")]
    displacements_max: Array1<f64>,
    /// Sum over ions of the distance traveled since the first step (Å). Length `N - 1`.
    #[getset(get = "pub")]
    cumulative_displacement: Array1<f64>,
    /// Norm of each of the three lattice vectors (Å). Shape `(N, 3)`.
    #[getset(get = "pub")]
    lattice_vectors_norm: Array2<f64>,
    /// Volume of the cell, i.e. the determinant of the lattice matrix (Å³). Length `N`.
    ///
    /// The determinant may legitimately be zero or negative for a poorly
    /// converged relaxation; such values are kept as-is.
    #[getset(get = "pub")]
    cell_volumes: Array1<f64>,
}

impl DerivedSeries {
    /// Compute all derived series from the trajectory arrays.
    ///
    /// This is a pure function of its inputs and cannot fail: degenerate
    /// trajectories (a single step) simply produce empty transition series.
    /// The caller guarantees that the arrays satisfy the shape invariants
    /// (`N ≥ 1`, `atoms ≥ 1`, matching leading dimensions).
    ///
    /// ## Example
    /// ```
    /// # use vopt_rs::prelude::*;
    /// # use ndarray::{arr1, Array3};
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let energies = arr1(&[10.0, 9.5, 9.6]);
    /// let forces = Array3::zeros((3, 2, 3));
    /// let positions = Array3::zeros((3, 2, 3));
    /// let lattice = Array3::from_shape_fn((3, 3, 3), |(_, i, j)| if i == j { 2.0 } else { 0.0 });
    ///
    /// let derived = DerivedSeries::compute(&energies, &forces, &positions, &lattice);
    ///
    /// assert_approx_eq!(f64, derived.min_energy(), 9.5);
    /// assert_approx_eq!(f64, derived.cell_volumes()[0], 8.0);
    /// ```
    pub fn compute(
        energies: &Array1<f64>,
        forces: &Array3<f64>,
        positions: &Array3<f64>,
        lattice_vectors: &Array3<f64>,
    ) -> DerivedSeries {
        let min_energy = energies.fold(f64::INFINITY, |min, &e| min.min(e));
        let delta_e = &energies.slice(s![1..]) - &energies.slice(s![..-1]);

        let force_intensities = intensities(forces.view());
        let forces_rms = rms_over_atoms(&force_intensities);
        let forces_max = max_over_atoms(&force_intensities);

        let displacements = &positions.slice(s![1.., .., ..]) - &positions.slice(s![..-1, .., ..]);
        let displacement_intensities = intensities(displacements.view());
        let displacements_rms = rms_over_atoms(&displacement_intensities);
        let displacements_max = max_over_atoms(&displacement_intensities);

        // displacements relative to the first step, not to the previous one
        let from_start = &positions.slice(s![1.., .., ..]) - &positions.slice(s![0, .., ..]);
        let cumulative_displacement = intensities(from_start.view()).sum_axis(Axis(1));

        let lattice_vectors_norm = intensities(lattice_vectors.view());
        let cell_volumes = lattice_vectors
            .axis_iter(Axis(0))
            .map(determinant)
            .collect::<Array1<f64>>();

        DerivedSeries {
            min_energy,
            delta_e,
            force_intensities,
            forces_rms,
            forces_max,
            displacements,
            displacement_intensities,
            displacements_rms,
            displacements_max,
            cumulative_displacement,
            lattice_vectors_norm,
            cell_volumes,
        }
    }

    /// Get the number of steps covered by the derived series.
    #[inline(always)]
    pub fn n_steps(&self) -> usize {
        self.cell_volumes.len()
    }
}

/// Calculate the Euclidean norm of every vector along the last (spatial) axis.
fn intensities(vectors: ArrayView3<f64>) -> Array2<f64> {
    vectors.map_axis(Axis(2), |v| v.dot(&v).sqrt())
}

/// Calculate the per-step root-mean-square of per-ion intensities.
fn rms_over_atoms(intensities: &Array2<f64>) -> Array1<f64> {
    intensities.map_axis(Axis(1), |step| (step.dot(&step) / step.len() as f64).sqrt())
}

/// Calculate the per-step maximum of per-ion intensities.
fn max_over_atoms(intensities: &Array2<f64>) -> Array1<f64> {
    intensities.map_axis(Axis(1), |step| {
        step.fold(f64::NEG_INFINITY, |max, &x| max.max(x))
    })
}

/// Calculate the determinant of a 3×3 lattice matrix.
fn determinant(matrix: ArrayView2<f64>) -> f64 {
    Matrix3::new(
        matrix[(0, 0)],
        matrix[(0, 1)],
        matrix[(0, 2)],
        matrix[(1, 0)],
        matrix[(1, 1)],
        matrix[(1, 2)],
        matrix[(2, 0)],
        matrix[(2, 1)],
        matrix[(2, 2)],
    )
    .determinant()
}

/******************************/
/*        UNIT TESTS          */
/******************************/

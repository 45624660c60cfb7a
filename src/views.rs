// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Implementation of the data series consumed by plotting and table front ends.
//!
//! The structures in this module are plain values (`Vec<f64>`, `f64`,
//! `Option<f64>`) so that a charting widget or a list view can consume them
//! without depending on `ndarray`. They describe *what* is displayed, never
//! how; axis styling is left entirely to the front end.

use serde::{Deserialize, Serialize};

use crate::structures::trajectory::Trajectory;

/// Series for the "Energy and forces" page.
///
/// Per-step series are indexed by `steps`, transition series by
/// `transition_steps`. `abs_delta_e` and the force series are intended for
/// logarithmic axes; `abs_delta_e` belongs on a secondary axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyForcesView {
    /// Step indices of the per-step series (`0..n_steps`).
    pub steps: Vec<usize>,
    /// Step indices of the transition series (`1..n_steps`).
    pub transition_steps: Vec<usize>,
    /// Energies relative to the lowest energy of the trajectory (eV).
    pub relative_energies: Vec<f64>,
    /// Absolute energy change between consecutive steps (eV).
    pub abs_delta_e: Vec<f64>,
    /// Root-mean-square of the per-ion force norms (eV/Å).
    pub forces_rms: Vec<f64>,
    /// Largest per-ion force norm (eV/Å).
    pub forces_max: Vec<f64>,
}

/// Series for the "Positions and lattice" page.
///
/// The displacement series are intended for a logarithmic axis with the
/// cumulative displacement on a secondary linear axis; the cell volumes
/// belong on a secondary axis next to the lattice vector norms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionsLatticeView {
    /// Step indices of the per-step series (`0..n_steps`).
    pub steps: Vec<usize>,
    /// Step indices of the transition series (`1..n_steps`).
    pub transition_steps: Vec<usize>,
    /// Root-mean-square of the per-ion displacement norms (Å).
    pub displacements_rms: Vec<f64>,
    /// Largest per-ion displacement norm (Å).
    pub displacements_max: Vec<f64>,
    /// Sum over ions of the distance traveled since the first step (Å).
    pub cumulative_displacement: Vec<f64>,
    /// Norm of the first lattice vector (Å).
    pub lattice_a_norm: Vec<f64>,
    /// Norm of the second lattice vector (Å).
    pub lattice_b_norm: Vec<f64>,
    /// Norm of the third lattice vector (Å).
    pub lattice_c_norm: Vec<f64>,
    /// Cell volumes (Å³).
    pub cell_volumes: Vec<f64>,
}

/// One row of the per-step table.
///
/// Transition quantities are `None` for the first step, where no previous
/// step exists to compare against; a table front end should render them as
/// blank cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRow {
    /// Step index.
    pub step: usize,
    /// The selected energy component (eV).
    pub energy: f64,
    /// Energy change with respect to the previous step (eV).
    pub delta_e: Option<f64>,
    /// Largest per-ion force norm (eV/Å).
    pub forces_max: f64,
    /// Root-mean-square of the per-ion force norms (eV/Å).
    pub forces_rms: f64,
    /// Largest per-ion displacement norm (Å).
    pub displacement_max: Option<f64>,
    /// Root-mean-square of the per-ion displacement norms (Å).
    pub displacement_rms: Option<f64>,
    /// Norms of the three lattice vectors (Å).
    pub lattice_norms: [f64; 3],
    /// Cell volume (Å³).
    pub cell_volume: f64,
}

impl Trajectory {
    /// Extract the series displayed on the "Energy and forces" page.
    pub fn energy_forces_view(&self) -> EnergyForcesView {
        let derived = self.derived();
        let min_energy = derived.min_energy();

        EnergyForcesView {
            steps: (0..self.n_steps()).collect(),
            transition_steps: (1..self.n_steps()).collect(),
            relative_energies: self.energies().iter().map(|e| e - min_energy).collect(),
            abs_delta_e: derived.delta_e().mapv(f64::abs).to_vec(),
            forces_rms: derived.forces_rms().to_vec(),
            forces_max: derived.forces_max().to_vec(),
        }
    }

    /// Extract the series displayed on the "Positions and lattice" page.
    pub fn positions_lattice_view(&self) -> PositionsLatticeView {
        let derived = self.derived();
        let norms = derived.lattice_vectors_norm();

        PositionsLatticeView {
            steps: (0..self.n_steps()).collect(),
            transition_steps: (1..self.n_steps()).collect(),
            displacements_rms: derived.displacements_rms().to_vec(),
            displacements_max: derived.displacements_max().to_vec(),
            cumulative_displacement: derived.cumulative_displacement().to_vec(),
            lattice_a_norm: norms.column(0).to_vec(),
            lattice_b_norm: norms.column(1).to_vec(),
            lattice_c_norm: norms.column(2).to_vec(),
            cell_volumes: derived.cell_volumes().to_vec(),
        }
    }

    /// Extract the per-step table, one row per optimization step.
    ///
    /// ## Example
    /// ```no_run
    /// use vopt_rs::prelude::*;
    ///
    /// let trajectory = Trajectory::from_file("vaspout.h5").unwrap();
    ///
    /// for row in trajectory.step_rows() {
    ///     match row.delta_e {
    ///         Some(de) => println!("{:4} {:12.6} {:12.6}", row.step, row.energy, de),
    ///         None => println!("{:4} {:12.6}             ", row.step, row.energy),
    ///     }
    /// }
    /// ```
    pub fn step_rows(&self) -> Vec<StepRow> {
        let derived = self.derived();
        let norms = derived.lattice_vectors_norm();

        (0..self.n_steps())
            .map(|i| StepRow {
                step: i,
                energy: self.energies()[i],
                // transition quantities compare step i to step i - 1
                delta_e: i.checked_sub(1).map(|prev| derived.delta_e()[prev]),
                forces_max: derived.forces_max()[i],
                forces_rms: derived.forces_rms()[i],
                displacement_max: i
                    .checked_sub(1)
                    .map(|prev| derived.displacements_max()[prev]),
                displacement_rms: i
                    .checked_sub(1)
                    .map(|prev| derived.displacements_rms()[prev]),
                lattice_norms: [norms[(i, 0)], norms[(i, 1)], norms[(i, 2)]],
                cell_volume: derived.cell_volumes()[i],
            })
            .collect()
    }
}

/******************************/
/*        UNIT TESTS          */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::trajectory::RawTrajectory;
    use float_cmp::assert_approx_eq;
    use ndarray::{arr2, arr3, Array3};

    fn example_trajectory() -> Trajectory {
        let raw = RawTrajectory {
            energies: arr2(&[[0.0, 10.0], [0.0, 9.5], [0.0, 9.6]]),
            forces: arr3(&[
                [[3.0, 4.0, 0.0], [0.0, 0.0, 1.0]],
                [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
                [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            ]),
            positions: arr3(&[
                [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
                [[1.0, 0.0, 0.0], [1.0, 2.0, 0.0]],
                [[1.0, 0.0, 3.0], [1.0, 2.0, 0.0]],
            ]),
            lattice_vectors: Array3::from_shape_fn(
                (3, 3, 3),
                |(_, i, j)| if i == j { 2.0 } else { 0.0 },
            ),
            selective_dynamics: None,
        };

        Trajectory::new(raw, 1).unwrap()
    }

    #[test]
    fn energy_forces_view() {
        let view = example_trajectory().energy_forces_view();

        assert_eq!(view.steps, vec![0, 1, 2]);
        assert_eq!(view.transition_steps, vec![1, 2]);

        assert_approx_eq!(f64, view.relative_energies[0], 0.5);
        assert_approx_eq!(f64, view.relative_energies[1], 0.0);
        assert_approx_eq!(f64, view.relative_energies[2], 0.1);

        // |ΔE| is always non-negative
        assert_approx_eq!(f64, view.abs_delta_e[0], 0.5);
        assert_approx_eq!(f64, view.abs_delta_e[1], 0.1);

        assert_eq!(view.forces_rms.len(), 3);
        assert_eq!(view.forces_max.len(), 3);
        assert_approx_eq!(f64, view.forces_max[0], 5.0);
    }

    #[test]
    fn positions_lattice_view() {
        let view = example_trajectory().positions_lattice_view();

        assert_eq!(view.transition_steps, vec![1, 2]);
        assert_eq!(view.displacements_rms.len(), 2);
        assert_eq!(view.displacements_max.len(), 2);
        assert_eq!(view.cumulative_displacement.len(), 2);

        assert_approx_eq!(f64, view.displacements_max[0], 2.0);
        assert_approx_eq!(f64, view.cumulative_displacement[0], 3.0);

        for i in 0..3 {
            assert_approx_eq!(f64, view.lattice_a_norm[i], 2.0);
            assert_approx_eq!(f64, view.lattice_b_norm[i], 2.0);
            assert_approx_eq!(f64, view.lattice_c_norm[i], 2.0);
            assert_approx_eq!(f64, view.cell_volumes[i], 8.0);
        }
    }

    #[test]
    fn step_rows() {
        let rows = example_trajectory().step_rows();

        assert_eq!(rows.len(), 3);

        // transition quantities are blank for the first step
        assert_eq!(rows[0].step, 0);
        assert_approx_eq!(f64, rows[0].energy, 10.0);
        assert!(rows[0].delta_e.is_none());
        assert!(rows[0].displacement_max.is_none());
        assert!(rows[0].displacement_rms.is_none());
        assert_approx_eq!(f64, rows[0].forces_max, 5.0);
        assert_approx_eq!(f64, rows[0].cell_volume, 8.0);

        assert_eq!(rows[1].step, 1);
        assert_approx_eq!(f64, rows[1].delta_e.unwrap(), -0.5);
        assert_approx_eq!(f64, rows[1].displacement_max.unwrap(), 2.0);

        assert_approx_eq!(f64, rows[2].delta_e.unwrap(), 0.1);
        assert_approx_eq!(f64, rows[2].lattice_norms[0], 2.0);
    }

    #[test]
    fn single_step_views_are_degenerate_but_valid() {
        let raw = RawTrajectory {
            energies: arr2(&[[0.0, -4.2]]),
            forces: arr3(&[[[1.0, 2.0, 2.0]]]),
            positions: arr3(&[[[0.5, 0.5, 0.5]]]),
            lattice_vectors: arr3(&[[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]]),
            selective_dynamics: None,
        };
        let trajectory = Trajectory::new(raw, 1).unwrap();

        let energy_view = trajectory.energy_forces_view();
        assert_eq!(energy_view.steps, vec![0]);
        assert!(energy_view.transition_steps.is_empty());
        assert!(energy_view.abs_delta_e.is_empty());
        assert_eq!(energy_view.forces_rms.len(), 1);

        let position_view = trajectory.positions_lattice_view();
        assert!(position_view.displacements_rms.is_empty());
        assert!(position_view.cumulative_displacement.is_empty());
        assert_eq!(position_view.cell_volumes.len(), 1);

        let rows = trajectory.step_rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].delta_e.is_none());
    }
}

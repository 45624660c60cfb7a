// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Implementation of loading a trajectory on a background thread.
//!
//! Reading a `vaspout.h5` file is blocking, I/O-bound work. A presentation
//! layer that wants to stay responsive can run the whole pipeline (reading,
//! validation, masking, derived series) on a worker thread and receive the
//! finished result through a channel that delivers exactly one message.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use crate::errors::ReadH5Error;
use crate::structures::trajectory::{Trajectory, DEFAULT_ENERGY_COMPONENT};

/// Load a trajectory on a background thread using the
/// [default energy component](DEFAULT_ENERGY_COMPONENT).
///
/// See [`load_in_background_with_component`] for details.
pub fn load_in_background(
    filename: impl Into<PathBuf>,
) -> Receiver<Result<Trajectory, ReadH5Error>> {
    load_in_background_with_component(filename, DEFAULT_ENERGY_COMPONENT)
}

/// Load a trajectory on a background thread selecting a specific energy
/// component.
///
/// Spawns a worker thread running the full loading pipeline and returns the
/// receiving end of a channel through which exactly one message is
/// delivered: either the finished [`Trajectory`] or the error that ended the
/// load. There is no partial delivery and no cancellation; once started, a
/// load either completes or fails entirely. After the single message, the
/// channel is closed (the sender is dropped with the worker thread).
///
/// ## Example
/// ```no_run
/// use vopt_rs::prelude::*;
///
/// let pending = load_in_background("vaspout.h5");
///
/// // ... keep the user interface responsive ...
///
/// match pending.recv().expect("the worker thread delivers exactly once") {
///     Ok(trajectory) => println!("{} steps", trajectory.n_steps()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
///
/// ## Notes
/// - If the receiver is dropped before the load finishes, the result is
///   discarded and the worker thread ends quietly.
/// - Concurrent loads are independent; each call spawns its own worker and
///   owns its own channel.
pub fn load_in_background_with_component(
    filename: impl Into<PathBuf>,
    energy_component: usize,
) -> Receiver<Result<Trajectory, ReadH5Error>> {
    let path = filename.into();
    let (sender, receiver) = channel();

    thread::spawn(move || {
        let result = Trajectory::from_file_with_component(&path, energy_component);
        // the receiving side may already be gone; that is not an error
        let _ = sender.send(result);
    });

    receiver
}

/******************************/
/*        UNIT TESTS          */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use ndarray::{arr2, arr3};
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("vaspout.h5");
        let file = hdf5::File::create(&path).unwrap();

        let ion_dynamics = file
            .create_group("intermediate")
            .unwrap()
            .create_group("ion_dynamics")
            .unwrap();

        ion_dynamics
            .new_dataset_builder()
            .with_data(&arr2(&[[0.0, 10.0], [0.0, 9.5]]))
            .create("energies")
            .unwrap();
        ion_dynamics
            .new_dataset_builder()
            .with_data(&arr3(&[[[0.0, 3.0, 4.0]], [[0.0, 0.0, 1.0]]]))
            .create("forces")
            .unwrap();
        ion_dynamics
            .new_dataset_builder()
            .with_data(&arr3(&[[[0.0, 0.0, 0.0]], [[1.0, 0.0, 0.0]]]))
            .create("position_ions")
            .unwrap();
        ion_dynamics
            .new_dataset_builder()
            .with_data(&arr3(&[
                [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            ]))
            .create("lattice_vectors")
            .unwrap();

        path
    }

    #[test]
    fn successful_background_load() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let pending = load_in_background(path);
        let trajectory = pending.recv().unwrap().unwrap();

        assert_eq!(trajectory.n_steps(), 2);
        assert_approx_eq!(f64, trajectory.derived().min_energy(), 9.5);
        assert_approx_eq!(f64, trajectory.derived().forces_max()[0], 5.0);

        // the channel delivers exactly once
        assert!(pending.recv().is_err());
    }

    #[test]
    fn failed_background_load() {
        let pending = load_in_background("nonexistent/vaspout.h5");

        let result = pending.recv().unwrap();
        assert!(matches!(result, Err(ReadH5Error::CouldNotOpen(_, _))));

        assert!(pending.recv().is_err());
    }

    #[test]
    fn concurrent_loads_are_independent() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let good = load_in_background(path);
        let bad = load_in_background("nonexistent/vaspout.h5");

        assert!(good.recv().unwrap().is_ok());
        assert!(bad.recv().unwrap().is_err());
    }
}

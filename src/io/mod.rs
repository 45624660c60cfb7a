// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Implementation of functions for reading `vaspout.h5` trajectory files.

pub mod h5_io;

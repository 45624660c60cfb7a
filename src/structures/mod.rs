// Released under MIT License.
// Copyright (c) 2023-2024 Ladislav Bartos

//! Implementation of the structures used in the `vopt_rs` library.

pub mod derived;
pub mod trajectory;

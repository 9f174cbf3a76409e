// Copyright 2017-2020 Peter Williams
// Licensed under the MIT License.

//! Core types and traits shared by the OIFITS crates.
//!
//! This crate is intentionally small. It provides the notification
//! framework used for diagnostics, a few I/O helpers for block-structured
//! files, and some numerical glue for `ndarray`.

pub mod errors;
pub mod io;
#[macro_use]
pub mod notify;
pub mod num;

pub use ndarray::{Array, Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
pub use num_complex::Complex; // convenience re-export

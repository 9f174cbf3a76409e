// Copyright 2017-2020 Peter Williams and collaborators
// Licensed under the MIT License.

/*!
The core error type shared by the OIFITS crates.

Higher-level crates define their own error enums and wrap this one with
`#[from]`.
*/

use thiserror::Error;

/// An error raised by the helpers in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An array did not have the expected dimensionality.
    #[error("expected {expected}-dimensional array but found one that was {actual}-dimensional")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An array did not have the expected number of elements.
    #[error("expected array of {expected} elements but found {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// A convenience result type.
pub type Result<T> = std::result::Result<T, CoreError>;

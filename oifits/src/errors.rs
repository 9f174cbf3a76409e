// Copyright 2018-2020 Peter Williams and collaborators
// Licensed under the MIT License.

/*!
The error type for OIFITS operations.

Failures of the underlying FITS codec are fatal to a read or write and are
wrapped here. Unresolved cross-references between tables are *not* errors;
they are reported through the notification backend instead.
*/

use oifits_core::errors::CoreError;
use oifits_fits::FitsError;
use thiserror::Error;

/// An error arising while building, reading, or writing an OIFITS data set.
#[derive(Error, Debug)]
pub enum OifitsError {
    /// The FITS layer failed.
    #[error(transparent)]
    Fits(#[from] FitsError),

    /// An I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A shaped array could not be built.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A record's per-channel arrays do not match its table's channel count.
    #[error("expected records with {expected} spectral channels but got {actual}")]
    ChannelCount { expected: usize, actual: usize },

    /// A visibility record's optional arrays do not match its table's
    /// feature flags.
    #[error("visibility record does not match table features ({0})")]
    FeatureMismatch(&'static str),

    /// Two arrays that must have the same length do not.
    #[error("column {column} has {actual} entries; expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The mandatory `OI_TARGET` table is absent.
    #[error("no OI_TARGET table in file")]
    MissingTargetTable,
}

/// A convenience result type.
pub type Result<T> = std::result::Result<T, OifitsError>;

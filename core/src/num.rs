// Copyright 2017-2020 Peter Williams
// Licensed under the MIT License.

/*!

General helpers for numerics.

*/

use crate::errors::{CoreError, Result};
use ndarray::{Array, Dimension, IntoDimension, Ix1, Ix2, Ix3};

/// Adapt a slice representing an array shape into an `ndarray::Dimension` type.
///
/// In `ndarray` array dimensionalities are statically typed, but data files
/// describe their array shapes at runtime (the FITS `TDIMn` keyword, for
/// instance). This trait converts a runtime shape into one of the
/// compile-time types, if the two dimensionalities agree.
pub trait DimFromShapeSlice: Sized {
    /// Try to create the implementing type from the specified array shape.
    ///
    /// Returns `CoreError::DimensionMismatch` if the slice size does not
    /// match the expected dimensionality.
    fn from_shape_slice(shape: &[usize]) -> Result<Self>;
}

macro_rules! impl_dim_from_shape_slice {
    ($dimtype:ty; $ndim:expr; $($numbers:expr);*) => {
        impl DimFromShapeSlice for $dimtype {
            fn from_shape_slice(shape: &[usize]) -> Result<Self> {
                if shape.len() == $ndim {
                    Ok([$(shape[$numbers]),*].into_dimension())
                } else {
                    Err(CoreError::DimensionMismatch { expected: $ndim, actual: shape.len() })
                }
            }
        }
    }
}

impl_dim_from_shape_slice! { Ix1; 1; 0 }
impl_dim_from_shape_slice! { Ix2; 2; 0;1 }
impl_dim_from_shape_slice! { Ix3; 3; 0;1;2 }

/// Build an array of dimensionality `D` from flat data and a runtime shape.
///
/// Both the dimensionality and the total element count are checked.
pub fn array_from_shape_vec<T, D>(shape: &[usize], data: Vec<T>) -> Result<Array<T, D>>
where
    D: Dimension + DimFromShapeSlice,
{
    let dim = D::from_shape_slice(shape)?;
    let expected = dim.size();

    if expected != data.len() {
        return Err(CoreError::SizeMismatch {
            expected,
            actual: data.len(),
        });
    }

    Array::from_shape_vec(dim, data).map_err(|_| CoreError::SizeMismatch {
        expected,
        actual: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn shape_slices() {
        assert_eq!(Ix2::from_shape_slice(&[3, 4]).unwrap(), Ix2(3, 4));
        assert_eq!(
            Ix2::from_shape_slice(&[3]),
            Err(CoreError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn shaped_vec() {
        let a: Array2<u8> = array_from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(a[[1, 0]], 3);

        let r: Result<Array2<u8>> = array_from_shape_vec(&[2, 3], vec![0, 1]);
        assert_eq!(
            r.unwrap_err(),
            CoreError::SizeMismatch {
                expected: 6,
                actual: 2
            }
        );
    }
}

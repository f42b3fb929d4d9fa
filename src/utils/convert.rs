// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module converts between the matrices of `qfall-math`, on which keys and
//! noise are sampled and combined, and the `ndarray` matrices of `i64` entries,
//! on which the gadget expansion and the key recovery operate.

use crate::error::AttackError;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};
use qfall_math::{
    integer::{MatZ, Z},
    integer_mod_q::MatZq,
    traits::{GetEntry, GetNumColumns, GetNumRows, SetEntry},
};

/// Checks that a matrix of dimension `rows × cols` can be instantiated,
/// i.e. that neither dimension is zero.
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
///   if `rows` or `cols` is `0`.
pub fn check_dimensions(rows: usize, cols: usize) -> Result<(), AttackError> {
    if rows == 0 || cols == 0 {
        return Err(AttackError::InvalidShape(format!(
            "A matrix needs at least one row and one column, but {rows} × {cols} was requested."
        )));
    }
    Ok(())
}

/// Converts an integer matrix into an `ndarray` matrix of the same dimension.
///
/// Parameters:
/// - `mat`: the matrix to convert
///
/// Returns the entries of `mat` as `i64`.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use pre_key_recovery::utils::convert::matz_to_array;
/// use qfall_math::integer::MatZ;
/// use std::str::FromStr;
///
/// let mat = MatZ::from_str("[[1, -2, 3],[4, 5, -6]]").unwrap();
///
/// assert_eq!(array![[1, -2, 3], [4, 5, -6]], matz_to_array(&mat).unwrap());
/// ```
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`Math`](AttackError::Math)
///   if an entry does not fit into an `i64`.
pub fn matz_to_array(mat: &MatZ) -> Result<Array2<i64>, AttackError> {
    let rows = mat.get_num_rows();
    let cols = mat.get_num_columns();

    let mut entries = Vec::with_capacity((rows * cols) as usize);
    for i in 0..rows {
        for j in 0..cols {
            let entry: Z = mat.get_entry(i, j)?;
            entries.push(i64::try_from(&entry)?);
        }
    }

    Array2::from_shape_vec((rows as usize, cols as usize), entries)
        .map_err(|e| AttackError::InvalidShape(e.to_string()))
}

/// Converts a matrix over `Z_q` into an `ndarray` matrix, whose entries are the
/// representatives in `[0, q)`.
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`Math`](AttackError::Math)
///   if the modulus does not fit into an `i64`.
pub fn matzq_to_array(mat: &MatZq) -> Result<Array2<i64>, AttackError> {
    matz_to_array(&MatZ::from(mat))
}

/// Converts a column vector, i.e. a matrix with a single column, into an
/// `ndarray` vector.
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
///   if `vec` has more than one column.
/// - Returns a [`AttackError`] of type [`Math`](AttackError::Math)
///   if an entry does not fit into an `i64`.
pub fn column_to_array(vec: &MatZ) -> Result<Array1<i64>, AttackError> {
    if vec.get_num_columns() != 1 {
        return Err(AttackError::InvalidShape(format!(
            "A column vector was expected, but the matrix has {} columns.",
            vec.get_num_columns()
        )));
    }
    Ok(matz_to_array(vec)?.column(0).to_owned())
}

/// Converts an `ndarray` matrix into an integer matrix of the same dimension.
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
///   if `mat` has no entries.
pub fn array_to_matz<S>(mat: &ArrayBase<S, Ix2>) -> Result<MatZ, AttackError>
where
    S: Data<Elem = i64>,
{
    let (rows, cols) = mat.dim();
    check_dimensions(rows, cols)?;

    let mut out = MatZ::new(rows, cols);
    for ((i, j), &entry) in mat.indexed_iter() {
        out.set_entry(i, j, Z::from(entry))?;
    }
    Ok(out)
}

/// Converts an `ndarray` vector into an integer column vector.
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
///   if `vec` is empty.
pub fn vector_to_column<S>(vec: &ArrayBase<S, Ix1>) -> Result<MatZ, AttackError>
where
    S: Data<Elem = i64>,
{
    array_to_matz(&vec.view().insert_axis(ndarray::Axis(1)))
}

#[cfg(test)]
mod test_matz_to_array {
    use super::{column_to_array, matz_to_array, matzq_to_array};
    use crate::error::AttackError;
    use ndarray::array;
    use qfall_math::{integer::MatZ, integer_mod_q::MatZq};
    use std::str::FromStr;

    /// Ensure that dimension and entries, including negative ones, are kept.
    #[test]
    fn entries_kept() {
        let mat = MatZ::from_str("[[-7, 0],[3, 1024],[5, -1]]").unwrap();

        assert_eq!(array![[-7, 0], [3, 1024], [5, -1]], matz_to_array(&mat).unwrap());
    }

    /// Ensure that residues are represented in `[0, q)`.
    #[test]
    fn residues_non_negative() {
        let mat = MatZq::from_str("[[-1, 17],[4, -16]] mod 16").unwrap();

        assert_eq!(array![[15, 1], [4, 0]], matzq_to_array(&mat).unwrap());
    }

    /// Ensure that entries exceeding `i64` are reported instead of truncated.
    #[test]
    fn too_large() {
        let mat = MatZ::from_str("[[1, 100000000000000000000000]]").unwrap();

        assert!(matches!(matz_to_array(&mat), Err(AttackError::Math(_))));
    }

    /// Ensure that only column vectors are turned into vectors.
    #[test]
    fn column_only() {
        let column = MatZ::from_str("[[3],[-5]]").unwrap();
        let row = MatZ::from_str("[[3, -5]]").unwrap();

        assert_eq!(array![3, -5], column_to_array(&column).unwrap());
        assert!(matches!(
            column_to_array(&row),
            Err(AttackError::InvalidShape(_))
        ));
    }
}

#[cfg(test)]
mod test_array_to_matz {
    use super::{array_to_matz, check_dimensions, matz_to_array, vector_to_column};
    use crate::error::AttackError;
    use ndarray::{array, Array1, Array2};
    use qfall_math::{integer::MatZ, traits::GetNumColumns};
    use std::str::FromStr;

    /// Ensure that the conversion yields the expected integer matrix.
    #[test]
    fn matrix() {
        let mat = array![[1, -2], [i64::MAX, i64::MIN]];

        let converted = array_to_matz(&mat).unwrap();

        assert_eq!(mat, matz_to_array(&converted).unwrap());
    }

    /// Ensure that vectors become column vectors.
    #[test]
    fn column() {
        let vec = array![3, -5, 0, 511];

        let column = vector_to_column(&vec).unwrap();

        assert_eq!(1, column.get_num_columns());
        assert_eq!(MatZ::from_str("[[3],[-5],[0],[511]]").unwrap(), column);
    }

    /// Ensure that empty input is rejected instead of building an empty matrix.
    #[test]
    fn empty() {
        assert!(matches!(
            array_to_matz(&Array2::<i64>::zeros((0, 3))),
            Err(AttackError::InvalidShape(_))
        ));
        assert!(matches!(
            vector_to_column(&Array1::<i64>::zeros(0)),
            Err(AttackError::InvalidShape(_))
        ));
        assert!(matches!(
            check_dimensions(4, 0),
            Err(AttackError::InvalidShape(_))
        ));
    }
}

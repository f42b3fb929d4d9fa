// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains the power-of-two gadget expansion
//! `P2(x) = (2^0 x, 2^1 x, ..., 2^{k-1} x) mod q`, which is the counterpart of the
//! bit decomposition with respect to the gadget vector `g = (1, 2, ..., 2^{k-1})`,
//! i.e. `<BD(y), P2(x)> = <y, x> mod q`.

use crate::error::AttackError;
use ndarray::{concatenate, ArrayBase, ArrayD, ArrayView, Axis, Data, Dimension, IxDyn};

/// Computes the power-of-two gadget expansion `P2(x)` of a vector or a batch of
/// vectors.
///
/// The input is reduced modulo `q` first. Block `i` of the output is
/// `(2^i mod q) * (x mod q) mod q`, where `2^i mod q` is obtained by repeated
/// doubling modulo `q` and all products are taken in `i128`. The blocks are concatenated along the trailing axis in the
/// order `i = 0, 1, ..., k - 1`.
///
/// Parameters:
/// - `x`: a vector of length `n` or a matrix of dimension `m × n`, where each row
///   is expanded independently
/// - `q`: the modulus
/// - `k`: the number of power-of-two levels
///
/// Returns a vector of length `n * k` or a matrix of dimension `m × (n * k)`
/// with all entries in `[0, q)`.
///
/// # Examples
/// ```
/// use ndarray::{array, Ix1};
/// use pre_key_recovery::primitive::gadget::encode;
///
/// let y = encode(&array![3, -5], 16, 4).unwrap();
///
/// assert_eq!(
///     array![3, 11, 6, 6, 12, 12, 8, 8],
///     y.into_dimensionality::<Ix1>().unwrap()
/// );
/// ```
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
///   if `q <= 0`.
/// - Returns a [`AttackError`] of type [`InvalidLevelCount`](AttackError::InvalidLevelCount)
///   if `k < 1`.
/// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
///   if `x` is neither a vector nor a matrix.
pub fn encode<S, D>(x: &ArrayBase<S, D>, q: i64, k: i64) -> Result<ArrayD<i64>, AttackError>
where
    S: Data<Elem = i64>,
    D: Dimension,
{
    if q <= 0 {
        return Err(AttackError::InvalidModulus(format!(
            "The modulus has to be positive, but it is {q}."
        )));
    }
    if k < 1 {
        return Err(AttackError::InvalidLevelCount(format!(
            "At least one gadget level is required, but {k} were requested."
        )));
    }
    if x.ndim() != 1 && x.ndim() != 2 {
        return Err(AttackError::InvalidShape(format!(
            "Only vectors and matrices can be expanded, but the input has {} axes.",
            x.ndim()
        )));
    }

    let q = i128::from(q);
    let x_mod = x.mapv(|value| i128::from(value).rem_euclid(q)).into_dyn();
    let blocks: Vec<ArrayD<i64>> = (0..k)
        .scan(1 % q, |coeff, _| {
            let current = *coeff;
            *coeff = 2 * current % q;
            Some(current)
        })
        // every entry is reduced into `[0, q)` with `q <= i64::MAX`
        .map(|coeff| x_mod.mapv(|value| (coeff * value % q) as i64))
        .collect();
    let views: Vec<ArrayView<i64, IxDyn>> = blocks.iter().map(|block| block.view()).collect();

    // all blocks share the shape of `x`, hence concatenation can not fail
    concatenate(Axis(x.ndim() - 1), &views)
        .map_err(|e| AttackError::InvalidShape(e.to_string()))
}

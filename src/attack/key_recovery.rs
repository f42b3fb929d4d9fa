// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains the bit-by-bit recovery of a secret from noisy
//! power-of-two gadget levels.
//!
//! Column `p` of the input holds `2^i * s_p + e_{i,p} mod q` in row `i`.
//! Row `k - 1` only depends on the least significant bit of `s_p`, namely
//! `2^{k-1} * s_p = b_0 * 2^{k-1} mod q`. Once `b_0` is known, its contribution
//! can be cancelled from row `k - 2`, which then only depends on `b_1`, and so on.
//! Every bit is decided by rounding, i.e. it is correct as long as the noise of
//! its level lies in `[-2^{k-2}, 2^{k-2})`.

use crate::{error::AttackError, utils::modular::exact_log2};
use ndarray::{ArrayBase, ArrayView1, Data, Ix2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// The outcome of the recovery of a single secret coordinate.
///
/// Attributes:
/// - `bits`: the recovered bits, where `bits[i]` has weight `2^i`
/// - `value`: the recovered value as balanced representative in `[-q/2, q/2)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredCoordinate {
    pub bits: Vec<u8>,
    pub value: i64,
}

impl RecoveredCoordinate {
    /// Returns the recovered bits with the most significant bit first,
    /// i.e. in the order in which a binary number is usually written.
    ///
    /// # Examples
    /// ```
    /// use pre_key_recovery::attack::key_recovery::RecoveredCoordinate;
    ///
    /// let coordinate = RecoveredCoordinate { bits: vec![1, 1, 0, 0], value: 3 };
    ///
    /// assert_eq!(vec![0, 0, 1, 1], coordinate.bits_msb_first());
    /// ```
    pub fn bits_msb_first(&self) -> Vec<u8> {
        self.bits.iter().rev().copied().collect()
    }
}

/// Returns the default decision threshold `2^{k-2}` for `k` gadget levels.
///
/// For `k = 1` the threshold is `1`, which accepts every residue modulo `2^0`.
///
/// # Examples
/// ```
/// use pre_key_recovery::attack::key_recovery::default_threshold;
///
/// assert_eq!(256, default_threshold(10));
/// ```
pub fn default_threshold(k: usize) -> i64 {
    if k >= 2 {
        1 << (k - 2)
    } else {
        1
    }
}

/// Recovers the secret coordinate `p` from the noisy gadget levels in `res`
/// with the default decision threshold `2^{k-2}`.
///
/// Parameters:
/// - `res`: a `k × m` matrix, where row `i` holds `2^i * s + e_i mod q`
///   (entries may be arbitrary representatives modulo `q`)
/// - `p`: the column to recover, i.e. `0 <= p < m`
/// - `q`: the modulus, a power of two with `k = log_2(q)`
///
/// Returns the recovered bits and the recovered balanced value.
/// If the noise of a level leaves `[-2^{k-2}, 2^{k-2})`, the output is silently wrong.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use pre_key_recovery::attack::key_recovery::recover_one;
///
/// // rows hold 2^i * (-3) + e_i mod 16
/// let res = array![[14], [9], [3], [7]];
///
/// let coordinate = recover_one(&res, 0, 16).unwrap();
///
/// assert_eq!(-3, coordinate.value);
/// assert_eq!(vec![1, 0, 1, 1], coordinate.bits);
/// ```
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
///   if `q` is not a power of two larger than `1`.
/// - Returns a [`AttackError`] of type
///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
///   if `res` does not have `log_2(q)` rows.
/// - Returns a [`AttackError`] of type [`OutOfBounds`](AttackError::OutOfBounds)
///   if `p` is not a column of `res`.
pub fn recover_one<S>(
    res: &ArrayBase<S, Ix2>,
    p: usize,
    q: i64,
) -> Result<RecoveredCoordinate, AttackError>
where
    S: Data<Elem = i64>,
{
    let k = exact_log2(q)?;
    recover_one_with_threshold(res, p, q, default_threshold(k))
}

/// Recovers the secret coordinate `p` from the noisy gadget levels in `res`
/// with a custom decision threshold.
///
/// A residue `rp` in `[0, 2^{k-1})` is interpreted as noise `rp` if
/// `rp < threshold` and as noise `rp - 2^{k-1}` otherwise.
/// [`recover_one`] uses `threshold = 2^{k-2}`, which centres the accepted noise
/// around zero.
///
/// Parameters:
/// - `res`: a `k × m` matrix, where row `i` holds `2^i * s + e_i mod q`
/// - `p`: the column to recover, i.e. `0 <= p < m`
/// - `q`: the modulus, a power of two with `k = log_2(q)`
/// - `threshold`: the decision threshold in `(0, 2^{k-1}]`
///
/// Returns the recovered bits and the recovered balanced value.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use pre_key_recovery::attack::key_recovery::recover_one_with_threshold;
///
/// // noise `5` on every level of the secret `0`
/// let res = array![[5], [5], [5], [5]];
///
/// assert_eq!(0, recover_one_with_threshold(&res, 0, 16, 6).unwrap().value);
/// assert_ne!(0, recover_one_with_threshold(&res, 0, 16, 5).unwrap().value);
/// ```
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
///   if `q` is not a power of two larger than `1`.
/// - Returns a [`AttackError`] of type [`InvalidThreshold`](AttackError::InvalidThreshold)
///   if `threshold` does not lie in `(0, 2^{k-1}]`.
/// - Returns a [`AttackError`] of type
///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
///   if `res` does not have `log_2(q)` rows.
/// - Returns a [`AttackError`] of type [`OutOfBounds`](AttackError::OutOfBounds)
///   if `p` is not a column of `res`.
pub fn recover_one_with_threshold<S>(
    res: &ArrayBase<S, Ix2>,
    p: usize,
    q: i64,
    threshold: i64,
) -> Result<RecoveredCoordinate, AttackError>
where
    S: Data<Elem = i64>,
{
    let k = check_input(res, q, threshold)?;
    if p >= res.ncols() {
        return Err(AttackError::OutOfBounds(format!(
            "Column {p} was requested, but the matrix only has {} columns.",
            res.ncols()
        )));
    }
    Ok(decode_column(res.column(p), k, q, threshold))
}

/// Recovers all secret coordinates from the noisy gadget levels in `res`
/// with the default decision threshold `2^{k-2}`.
///
/// The columns are independent of each other and are recovered in parallel.
///
/// Parameters:
/// - `res`: a `k × m` matrix, where column `p` holds the levels of coordinate `p`
/// - `q`: the modulus, a power of two with `k = log_2(q)`
///
/// Returns the `m` recovered coordinates ordered by column.
///
/// # Examples
/// ```
/// use ndarray::{array, Array2};
/// use pre_key_recovery::attack::key_recovery::recover_all;
/// use pre_key_recovery::primitive::gadget::encode;
///
/// let secret = array![3, -5, 0, 511];
/// let (q, k) = (1024, 10);
///
/// let levels = encode(&secret, q, k).unwrap();
/// let res = Array2::from_shape_vec((10, 4), levels.iter().copied().collect()).unwrap();
///
/// let values: Vec<i64> = recover_all(&res, q)
///     .unwrap()
///     .into_iter()
///     .map(|coordinate| coordinate.value)
///     .collect();
///
/// assert_eq!(secret.to_vec(), values);
/// ```
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
///   if `q` is not a power of two larger than `1`.
/// - Returns a [`AttackError`] of type
///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
///   if `res` does not have `log_2(q)` rows.
pub fn recover_all<S>(res: &ArrayBase<S, Ix2>, q: i64) -> Result<Vec<RecoveredCoordinate>, AttackError>
where
    S: Data<Elem = i64>,
{
    let k = exact_log2(q)?;
    recover_all_with_threshold(res, q, default_threshold(k))
}

/// Recovers all secret coordinates from the noisy gadget levels in `res`
/// with a custom decision threshold, see [`recover_one_with_threshold`].
///
/// Parameters:
/// - `res`: a `k × m` matrix, where column `p` holds the levels of coordinate `p`
/// - `q`: the modulus, a power of two with `k = log_2(q)`
/// - `threshold`: the decision threshold in `(0, 2^{k-1}]`
///
/// Returns the `m` recovered coordinates ordered by column.
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
///   if `q` is not a power of two larger than `1`.
/// - Returns a [`AttackError`] of type [`InvalidThreshold`](AttackError::InvalidThreshold)
///   if `threshold` does not lie in `(0, 2^{k-1}]`.
/// - Returns a [`AttackError`] of type
///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
///   if `res` does not have `log_2(q)` rows.
pub fn recover_all_with_threshold<S>(
    res: &ArrayBase<S, Ix2>,
    q: i64,
    threshold: i64,
) -> Result<Vec<RecoveredCoordinate>, AttackError>
where
    S: Data<Elem = i64>,
{
    let k = check_input(res, q, threshold)?;
    tracing::trace!(levels = k, coordinates = res.ncols(), "recovering secret coordinates");

    let res = res.view();
    Ok((0..res.ncols())
        .into_par_iter()
        .map(|p| decode_column(res.column(p), k, q, threshold))
        .collect())
}

/// Checks the modulus, the threshold and the number of rows of `res`.
///
/// Returns `k = log_2(q)` if all of them fit together.
fn check_input<S>(res: &ArrayBase<S, Ix2>, q: i64, threshold: i64) -> Result<usize, AttackError>
where
    S: Data<Elem = i64>,
{
    let k = exact_log2(q)?;
    let half = q >> 1;
    if threshold <= 0 || threshold > half {
        return Err(AttackError::InvalidThreshold(format!(
            "The threshold has to lie in (0, {half}], but it is {threshold}."
        )));
    }
    if res.nrows() != k {
        return Err(AttackError::MismatchingMatrixDimension(format!(
            "A modulus of 2^{k} requires {k} gadget levels, but the matrix has {} rows.",
            res.nrows()
        )));
    }
    Ok(k)
}

/// Decodes the bits of one coordinate from its `k` gadget levels.
///
/// Step `i` reads level `k - 1 - i`, cancels the contribution of the
/// already decided bits `b_0, ..., b_{i-1}` and rounds the remainder.
/// A wrong decision propagates to all subsequent bits.
fn decode_column(
    levels: ArrayView1<i64>,
    k: usize,
    q: i64,
    threshold: i64,
) -> RecoveredCoordinate {
    let half = q >> 1;

    let bits = (0..k).fold(Vec::with_capacity(k), |mut bits: Vec<u8>, i| {
        let shift = k - 1 - i;
        let known: i128 = bits
            .iter()
            .enumerate()
            .map(|(j, &bit)| i128::from(bit) << (shift + j))
            .sum();
        let v = (i128::from(levels[shift]) - known).rem_euclid(i128::from(q)) as i64;

        let rp = v % half;
        let r = if rp < threshold { rp } else { rp - half };

        bits.push(u8::from((v - r).rem_euclid(q) != 0));
        bits
    });

    let value = bits
        .iter()
        .enumerate()
        .fold(0i64, |acc, (i, &bit)| acc | (i64::from(bit) << i));
    let value = if value >= half { value - q } else { value };

    RecoveredCoordinate { bits, value }
}

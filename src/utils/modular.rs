// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains the bit-length computation of a power-of-two modulus.

use crate::error::AttackError;

/// Computes `k = log_2(q)` for a modulus that is a power of two.
///
/// The bit-length is read off the binary representation of `q`,
/// no floating point arithmetic is involved.
///
/// Parameters:
/// - `q`: the modulus
///
/// Returns `k` with `2^k = q` or an error if `q` is not a power of two
/// larger than `1`.
///
/// # Examples
/// ```
/// use pre_key_recovery::utils::modular::exact_log2;
///
/// assert_eq!(10, exact_log2(1024).unwrap());
/// assert!(exact_log2(1000).is_err());
/// ```
///
/// # Errors and Failures
/// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
///   if `q < 2` or `q` is not a power of two.
pub fn exact_log2(q: i64) -> Result<usize, AttackError> {
    if q < 2 {
        return Err(AttackError::InvalidModulus(format!(
            "The modulus has to be a power of two larger than 1, but it is {q}."
        )));
    }
    if q.count_ones() != 1 {
        return Err(AttackError::InvalidModulus(format!(
            "The modulus has to be a power of two, but {q} is not."
        )));
    }
    Ok(q.trailing_zeros() as usize)
}

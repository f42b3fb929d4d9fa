// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains [`BoundedUniform`] noise, which is used to measure how
//! much noise the key recovery tolerates.

use super::{NoiseDistribution, MAX_BOUND};
use crate::{error::AttackError, utils::convert::check_dimensions};
use qfall_math::integer::MatZ;
use serde::{Deserialize, Serialize};

/// The uniform distribution over `[-bound, bound]`.
///
/// Attributes:
/// - `bound`: the largest absolute value a sample can take
///
/// # Examples
/// ```
/// use pre_key_recovery::sample::distribution::{BoundedUniform, NoiseDistribution};
/// use pre_key_recovery::utils::convert::column_to_array;
///
/// let noise = BoundedUniform::new(255).unwrap().sample_vec(100).unwrap();
///
/// assert!(column_to_array(&noise).unwrap().iter().all(|entry| entry.abs() <= 255));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedUniform {
    bound: i64,
}

impl BoundedUniform {
    /// Instantiates a new [`BoundedUniform`] distribution.
    ///
    /// Parameters:
    /// - `bound`: the largest absolute value a sample can take
    ///
    /// Returns the distribution or an error if `bound` is unusable.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if `bound < 0` or `bound > MAX_BOUND`.
    pub fn new(bound: i64) -> Result<Self, AttackError> {
        let out = Self { bound };
        out.check()?;
        Ok(out)
    }

    /// Returns the largest absolute value a sample can take.
    pub fn bound(&self) -> i64 {
        self.bound
    }
}

#[typetag::serde]
impl NoiseDistribution for BoundedUniform {
    /// Samples a `rows × cols` matrix with entries chosen uniformly at random
    /// from `[-bound, bound]`.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
    ///   if `rows` or `cols` is `0`.
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if the bound does not pass [`NoiseDistribution::check`].
    fn sample(&self, rows: usize, cols: usize) -> Result<MatZ, AttackError> {
        check_dimensions(rows, cols)?;
        self.check()?;

        // the upper end of `sample_uniform` is exclusive
        Ok(MatZ::sample_uniform(rows, cols, -self.bound, self.bound + 1)?)
    }

    fn describe(&self) -> String {
        format!("uniform noise in [-{0}, {0}]", self.bound)
    }

    fn check(&self) -> Result<(), AttackError> {
        if !(0..=MAX_BOUND).contains(&self.bound) {
            return Err(AttackError::InvalidDistribution(format!(
                "The bound has to lie in [0, {MAX_BOUND}], but it is {}.",
                self.bound
            )));
        }
        Ok(())
    }
}

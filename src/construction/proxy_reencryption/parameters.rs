// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains the public parameters of a
//! [`GadgetPre`](super::GadgetPre) instance.

use crate::{
    error::AttackError,
    sample::distribution::{DiscreteGauss, NoiseDistribution},
};
use qfall_math::{integer::Z, integer_mod_q::Modulus};
use serde::{Deserialize, Serialize};

/// The largest supported number of gadget levels, such that `q = 2^k` and
/// all residues of the leaked matrix fit into an `i64`.
pub const MAX_LEVELS: usize = 62;

/// Collects all parameters which are necessary to run the gadget-based
/// proxy re-encryption scheme.
/// You can either use [`PreParameters::init_default`] or set all values
/// and the distribution yourself via [`PreParameters::new`].
///
/// Attributes:
/// - `n`: the number of rows of the public matrix `A`
/// - `m`: the length of the secret keys, i.e. the number of columns of `A`
/// - `k`: the number of gadget levels, i.e. `k = log_2(q)`
/// - `q`: the modulus `2^k`
/// - `noise`: the distribution of secret keys and of the masking noise
///   of re-encryption keys
///
/// # Examples
/// ```
/// use pre_key_recovery::construction::proxy_reencryption::PreParameters;
///
/// let params = PreParameters::init_default();
///
/// assert_eq!(1024, params.q);
/// ```
#[derive(Serialize, Deserialize)]
pub struct PreParameters {
    pub n: usize,
    pub m: usize,
    pub k: usize,
    pub q: i64,
    pub noise: Box<dyn NoiseDistribution>,
}

impl PreParameters {
    /// Initializes the default parameters `k = 10`, `q = 1024`, `n = 4`, `m = 8`,
    /// where secrets and noise are drawn from a discrete Gaussian
    /// with `sigma = 3.2` and tail cut `13`.
    ///
    /// # Examples
    /// ```
    /// use pre_key_recovery::construction::proxy_reencryption::PreParameters;
    ///
    /// let params = PreParameters::init_default();
    ///
    /// assert_eq!((4, 8, 10), (params.n, params.m, params.k));
    /// ```
    pub fn init_default() -> Self {
        Self {
            n: 4,
            m: 8,
            k: 10,
            q: 1 << 10,
            noise: Box::new(DiscreteGauss::default()),
        }
    }

    /// Instantiates new [`PreParameters`] with `q = 2^k`.
    ///
    /// Parameters:
    /// - `n`: the number of rows of the public matrix `A`
    /// - `m`: the length of the secret keys
    /// - `k`: the number of gadget levels
    /// - `noise`: the distribution of secret keys and masking noise
    ///
    /// Returns the parameters or an error if they do not describe an instance.
    ///
    /// # Examples
    /// ```
    /// use pre_key_recovery::construction::proxy_reencryption::PreParameters;
    /// use pre_key_recovery::sample::distribution::DiscreteGauss;
    ///
    /// let chi = DiscreteGauss::with_sigma(2.0).unwrap();
    /// let params = PreParameters::new(2, 4, 8, Box::new(chi)).unwrap();
    ///
    /// assert_eq!(256, params.q);
    /// ```
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidParameters`](AttackError::InvalidParameters)
    ///   if `n` or `m` is zero or `k` is not in `[1, 62]`.
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if `noise` does not pass its check.
    pub fn new(
        n: usize,
        m: usize,
        k: usize,
        noise: Box<dyn NoiseDistribution>,
    ) -> Result<Self, AttackError> {
        if !(1..=MAX_LEVELS).contains(&k) {
            return Err(AttackError::InvalidParameters(format!(
                "The number of gadget levels has to be in [1, {MAX_LEVELS}], but it is {k}."
            )));
        }
        let params = Self {
            n,
            m,
            k,
            q: 1 << k,
            noise,
        };
        params.check()?;
        Ok(params)
    }

    /// Checks whether the parameters describe an instance, which is needed
    /// for parameters that were not created by [`PreParameters::new`],
    /// e.g. ones that were deserialized from a file.
    ///
    /// # Examples
    /// ```
    /// use pre_key_recovery::construction::proxy_reencryption::PreParameters;
    ///
    /// let mut params = PreParameters::init_default();
    /// assert!(params.check().is_ok());
    ///
    /// params.q = 1000;
    /// assert!(params.check().is_err());
    /// ```
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidParameters`](AttackError::InvalidParameters)
    ///   if `n` or `m` is zero, `k` is not in `[1, 62]` or `q != 2^k`.
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if the noise distribution can not be sampled from.
    pub fn check(&self) -> Result<(), AttackError> {
        if self.n == 0 || self.m == 0 {
            return Err(AttackError::InvalidParameters(format!(
                "The dimensions have to be positive, but n = {} and m = {}.",
                self.n, self.m
            )));
        }
        if !(1..=MAX_LEVELS).contains(&self.k) {
            return Err(AttackError::InvalidParameters(format!(
                "The number of gadget levels has to be in [1, {MAX_LEVELS}], but it is {}.",
                self.k
            )));
        }
        if self.q != 1 << self.k {
            return Err(AttackError::InvalidParameters(format!(
                "The modulus has to be 2^{}, but it is {}.",
                self.k, self.q
            )));
        }
        self.noise.check()
    }

    /// Returns `q` as [`Modulus`], over which keys are computed.
    ///
    /// Only call this on parameters that passed [`PreParameters::check`],
    /// as a modulus has to be larger than `1`.
    pub fn modulus(&self) -> Modulus {
        Modulus::from(&Z::from(self.q))
    }
}


#[cfg(test)]
mod test_new {
    use super::PreParameters;
    use crate::{error::AttackError, sample::distribution::ZeroNoise};

    /// Ensure that the modulus is derived from the number of levels.
    #[test]
    fn modulus() {
        for k in [1, 10, 32, 62] {
            assert_eq!(1i64 << k, PreParameters::new(1, 1, k, Box::new(ZeroNoise)).unwrap().q);
        }
    }

    /// Ensure that empty dimensions and unsupported level counts are rejected.
    #[test]
    fn invalid() {
        for (n, m, k) in [(0, 4, 10), (4, 0, 10), (4, 4, 0), (4, 4, 63)] {
            assert!(matches!(
                PreParameters::new(n, m, k, Box::new(ZeroNoise)),
                Err(AttackError::InvalidParameters(_))
            ));
        }
    }
}

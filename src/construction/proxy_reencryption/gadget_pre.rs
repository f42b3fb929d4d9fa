// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains an implementation of an LWE-based proxy re-encryption
//! scheme, whose re-encryption key hides the power-of-two gadget expansion
//! `P2(sk_a)` of the delegator's secret only behind small noise.
//!
//! Combining the re-encryption key with the recipient's secret yields
//! `P2(sk_a) - r2 mod q`, from which
//! [`recover_all`](crate::attack::key_recovery::recover_all) reads off `sk_a`.

use super::{PreParameters, ProxyReEncryption};
use crate::{
    error::AttackError,
    primitive::gadget::encode,
    utils::convert::{column_to_array, matzq_to_array, vector_to_column},
};
use ndarray::{Array2, Ix1};
use qfall_math::{
    integer::MatZ,
    integer_mod_q::{MatZq, Modulus},
    traits::{GetNumColumns, GetNumRows},
};
use serde::{Deserialize, Serialize};

/// The public key `(A, u = A * sk mod q)` of a participant.
///
/// Attributes:
/// - `a`: the uniformly random `n × m` matrix over `Z_q`
/// - `u`: the column vector `A * sk mod q` of length `n`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicKey {
    pub a: MatZq,
    pub u: MatZq,
}

/// The re-encryption key `(rk1, rk2)` from a delegator to a recipient.
///
/// Attributes:
/// - `rk1`: the `mk × m` matrix `R1 * A mod q`
/// - `rk2`: the column vector `R1 * u + r2 - P2(sk_a) mod q` of length `mk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReEncryptionKey {
    pub rk1: MatZq,
    pub rk2: MatZq,
}

/// This struct manages and stores the public parameters of a [`GadgetPre`]
/// proxy re-encryption instance.
///
/// Secret keys are integer column vectors of length `m`, all other keys
/// are matrices over `Z_q`.
///
/// Attributes:
/// - `params`: the dimensions, the modulus and the noise distribution
///
/// # Examples
/// ```
/// use pre_key_recovery::construction::proxy_reencryption::{GadgetPre, ProxyReEncryption};
///
/// let pre = GadgetPre::default();
///
/// let sk_a = pre.gen_secret_key().unwrap();
/// let sk_b = pre.gen_secret_key().unwrap();
/// let pk_b = pre.gen_public_key(&sk_b).unwrap();
///
/// let rk = pre.gen_rk(&pk_b, &sk_a).unwrap();
/// let res = pre.decrypt_rk(&rk, &sk_b).unwrap();
///
/// assert_eq!((10, 8), res.dim());
/// ```
#[derive(Serialize, Deserialize)]
pub struct GadgetPre {
    params: PreParameters,
}

/// Ensures that `mat` is of dimension `rows × cols`.
fn check_dimension<M>(name: &str, mat: &M, rows: usize, cols: usize) -> Result<(), AttackError>
where
    M: GetNumRows + GetNumColumns,
{
    let actual = (mat.get_num_rows(), mat.get_num_columns());
    if actual != (rows as i64, cols as i64) {
        return Err(AttackError::MismatchingMatrixDimension(format!(
            "The {name} has to be of dimension {rows} × {cols}, but it is {} × {}.",
            actual.0, actual.1
        )));
    }
    Ok(())
}

/// Ensures that `mat` is defined over `modulus`.
fn check_modulus(name: &str, mat: &MatZq, modulus: &Modulus) -> Result<(), AttackError> {
    if &mat.get_mod() != modulus {
        return Err(AttackError::InvalidModulus(format!(
            "The {name} has to be defined modulo {modulus}, but it is defined modulo {}.",
            mat.get_mod()
        )));
    }
    Ok(())
}

impl GadgetPre {
    /// Instantiates a [`GadgetPre`] instance with the specified parameters.
    ///
    /// Parameters:
    /// - `params`: the public parameters of the instance
    ///
    /// Returns the instance or an error if the parameters are inconsistent.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidParameters`](AttackError::InvalidParameters)
    ///   or [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if [`PreParameters::check`] fails.
    pub fn new(params: PreParameters) -> Result<Self, AttackError> {
        params.check()?;
        Ok(Self { params })
    }

    /// Returns the public parameters of the instance.
    pub fn params(&self) -> &PreParameters {
        &self.params
    }

    /// Ensures that a public key fits the parameters, as the arithmetic
    /// of [`MatZq`] does not accept mismatching operands.
    fn check_public_key(&self, pk: &PublicKey) -> Result<(), AttackError> {
        let PreParameters { n, m, .. } = self.params;
        let modulus = self.params.modulus();

        check_dimension("public matrix", &pk.a, n, m)?;
        check_dimension("public vector", &pk.u, n, 1)?;
        check_modulus("public matrix", &pk.a, &modulus)?;
        check_modulus("public vector", &pk.u, &modulus)
    }

    /// Ensures that a re-encryption key fits the parameters.
    fn check_rk(&self, rk: &ReEncryptionKey) -> Result<(), AttackError> {
        let PreParameters { m, k, .. } = self.params;
        let modulus = self.params.modulus();

        check_dimension("first re-encryption key component", &rk.rk1, m * k, m)?;
        check_dimension("second re-encryption key component", &rk.rk2, m * k, 1)?;
        check_modulus("first re-encryption key component", &rk.rk1, &modulus)?;
        check_modulus("second re-encryption key component", &rk.rk2, &modulus)
    }
}

impl Default for GadgetPre {
    /// Initializes a [`GadgetPre`] instance with [`PreParameters::init_default`].
    fn default() -> Self {
        Self {
            params: PreParameters::init_default(),
        }
    }
}

impl ProxyReEncryption for GadgetPre {
    type SecretKey = MatZ;
    type PublicKey = PublicKey;
    type ReEncryptionKey = ReEncryptionKey;

    /// Samples a secret key `sk` of length `m` from the noise distribution.
    ///
    /// Returns the secret key as column vector with small integer entries.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if the noise distribution can not be sampled from.
    fn gen_secret_key(&self) -> Result<Self::SecretKey, AttackError> {
        self.params.noise.sample_vec(self.params.m)
    }

    /// Generates the public key `(A, u = A * sk mod q)` of `sk`,
    /// where `A` is chosen uniformly at random.
    ///
    /// Parameters:
    /// - `sk`: the secret key of length `m`
    ///
    /// Returns the public key.
    ///
    /// # Examples
    /// ```
    /// use pre_key_recovery::construction::proxy_reencryption::{GadgetPre, ProxyReEncryption};
    /// use qfall_math::traits::{GetNumColumns, GetNumRows};
    ///
    /// let pre = GadgetPre::default();
    /// let sk = pre.gen_secret_key().unwrap();
    ///
    /// let pk = pre.gen_public_key(&sk).unwrap();
    ///
    /// assert_eq!((4, 8), (pk.a.get_num_rows(), pk.a.get_num_columns()));
    /// assert_eq!(4, pk.u.get_num_rows());
    /// ```
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
    ///   if `sk` is not a column vector of length `m`.
    fn gen_public_key(&self, sk: &Self::SecretKey) -> Result<Self::PublicKey, AttackError> {
        let PreParameters { n, m, q, .. } = self.params;
        check_dimension("secret key", sk, m, 1)?;
        let modulus = self.params.modulus();

        // A <- Z_q^{n x m}
        let a = MatZq::sample_uniform(n, m, &modulus);
        // u = A * sk
        let u = &a * &MatZq::from((sk, &modulus));
        tracing::debug!(n, m, q, "generated public key");

        Ok(PublicKey { a, u })
    }

    /// Generates the re-encryption key from the owner of `sk_a` to the owner of `pk_b`.
    ///
    /// The key consists of `rk1 = R1 * A mod q` and
    /// `rk2 = R1 * u + r2 - P2(sk_a) mod q`, where `R1` is an `mk × n` matrix
    /// and `r2` a vector of length `mk` sampled from the noise distribution.
    ///
    /// Parameters:
    /// - `pk_b`: the public key `(A, u)` of the recipient
    /// - `sk_a`: the secret key of the delegator
    ///
    /// Returns the re-encryption key.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
    ///   if `sk_a` is not a column vector of length `m` or `pk_b` does not
    ///   have the dimensions of the parameters.
    /// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
    ///   if `pk_b` is not defined modulo `q`.
    /// - Returns a [`AttackError`] of type [`Math`](AttackError::Math)
    ///   if an entry of `sk_a` does not fit into an `i64`.
    fn gen_rk(
        &self,
        pk_b: &Self::PublicKey,
        sk_a: &Self::SecretKey,
    ) -> Result<Self::ReEncryptionKey, AttackError> {
        let PreParameters { n, m, k, q, .. } = self.params;
        check_dimension("secret key", sk_a, m, 1)?;
        self.check_public_key(pk_b)?;
        let modulus = self.params.modulus();

        // R1 <- χ^{mk x n}, r2 <- χ^{mk}
        let r1 = MatZq::from((&self.params.noise.sample(m * k, n)?, &modulus));
        let r2 = MatZq::from((&self.params.noise.sample_vec(m * k)?, &modulus));
        // P2(sk_a) as column vector
        let gadget = encode(&column_to_array(sk_a)?, q, k as i64)?
            .into_dimensionality::<Ix1>()
            .map_err(|e| AttackError::InvalidShape(e.to_string()))?;
        let gadget = MatZq::from((&vector_to_column(&gadget)?, &modulus));

        let rk1 = &r1 * &pk_b.a;
        let rk2 = &r1 * &pk_b.u + r2 - gadget;
        tracing::debug!(rows = m * k, cols = m, "generated re-encryption key");

        Ok(ReEncryptionKey { rk1, rk2 })
    }

    /// Combines the re-encryption key with the recipient's secret key, i.e.
    /// computes `rk1 * sk_b - rk2 = P2(sk_a) - r2 mod q`.
    ///
    /// Parameters:
    /// - `rk`: the re-encryption key
    /// - `sk_b`: the secret key of the recipient
    ///
    /// Returns the result as `k × m` matrix with entries in `[0, q)`,
    /// whose row `i` is `2^i * sk_a - r2_i mod q`.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
    ///   if the dimensions of `rk` or `sk_b` do not fit the parameters.
    /// - Returns a [`AttackError`] of type [`InvalidModulus`](AttackError::InvalidModulus)
    ///   if `rk` is not defined modulo `q`.
    fn decrypt_rk(
        &self,
        rk: &Self::ReEncryptionKey,
        sk_b: &Self::SecretKey,
    ) -> Result<Array2<i64>, AttackError> {
        let PreParameters { m, k, .. } = self.params;
        check_dimension("secret key", sk_b, m, 1)?;
        self.check_rk(rk)?;
        let modulus = self.params.modulus();

        let res = &rk.rk1 * &MatZq::from((sk_b, &modulus)) - &rk.rk2;
        let res = matzq_to_array(&res)?;

        // the i-th block of `m` entries belongs to level i
        Array2::from_shape_vec((k, m), res.into_iter().collect())
            .map_err(|e| AttackError::MismatchingMatrixDimension(e.to_string()))
    }
}

// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module collects the distributions from which secrets and masking noise
//! of the proxy re-encryption scheme are sampled.
//!
//! The key recovery itself never samples anything, it only consumes the
//! resulting integer matrices. The distributions here serve the construction
//! and the experiments that feed the attack.

pub mod discrete_gauss;
pub mod uniform;

pub use discrete_gauss::{DiscreteGauss, DEFAULT_TAILCUT};
pub use uniform::BoundedUniform;

use crate::{error::AttackError, utils::convert::check_dimensions};
use qfall_math::integer::MatZ;
use serde::{Deserialize, Serialize};

/// The largest absolute value a configured noise bound or center may take.
/// Larger values would not leave any room for the secret in a modulus of at
/// most `2^62` and would overflow the `i64` entries of the attacked matrix.
pub const MAX_BOUND: i64 = 1 << 40;

/// This trait should be implemented by all distributions that can be used
/// to sample secrets and noise for a
/// [`GadgetPre`](crate::construction::proxy_reencryption::GadgetPre) instance.
/// The [`PreParameters`](crate::construction::proxy_reencryption::PreParameters)
/// store such a distribution as a trait object, which remains serializable.
#[typetag::serde]
pub trait NoiseDistribution {
    /// Samples a `rows × cols` matrix with independent entries.
    fn sample(&self, rows: usize, cols: usize) -> Result<MatZ, AttackError>;

    /// Returns a short human readable description of the distribution.
    fn describe(&self) -> String;

    /// Checks that the distribution can be sampled from, which matters for
    /// distributions that were deserialized instead of constructed.
    fn check(&self) -> Result<(), AttackError>;

    /// Samples a column vector of length `len` with independent entries.
    fn sample_vec(&self, len: usize) -> Result<MatZ, AttackError> {
        self.sample(len, 1)
    }
}

/// The distribution that always outputs `0`.
/// It is used to run experiments without any masking noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroNoise;

#[typetag::serde]
impl NoiseDistribution for ZeroNoise {
    /// Returns the zero matrix of dimension `rows × cols`.
    ///
    /// # Examples
    /// ```
    /// use pre_key_recovery::sample::distribution::{NoiseDistribution, ZeroNoise};
    /// use qfall_math::integer::MatZ;
    ///
    /// let mat = ZeroNoise.sample(3, 2).unwrap();
    ///
    /// assert_eq!(MatZ::new(3, 2), mat);
    /// ```
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
    ///   if `rows` or `cols` is `0`.
    fn sample(&self, rows: usize, cols: usize) -> Result<MatZ, AttackError> {
        check_dimensions(rows, cols)?;
        Ok(MatZ::new(rows, cols))
    }

    fn describe(&self) -> String {
        String::from("zero noise")
    }

    fn check(&self) -> Result<(), AttackError> {
        Ok(())
    }
}

#[cfg(test)]
mod test_noise_distribution {
    use super::{BoundedUniform, DiscreteGauss, NoiseDistribution, ZeroNoise};
    use crate::error::AttackError;
    use qfall_math::traits::{GetNumColumns, GetNumRows};

    /// Ensure that a distribution stored as trait object survives serialization.
    #[test]
    fn serialize_trait_object() {
        let noise: Box<dyn NoiseDistribution> = Box::new(DiscreteGauss::new(3.2, 13.0).unwrap());

        let json = serde_json::to_string(&noise).unwrap();
        let noise: Box<dyn NoiseDistribution> = serde_json::from_str(&json).unwrap();

        assert!(json.contains("DiscreteGauss"));
        assert_eq!(noise.describe(), DiscreteGauss::new(3.2, 13.0).unwrap().describe());
    }

    /// Ensure that `sample_vec` returns a column vector of the requested length
    /// for every distribution.
    #[test]
    fn sample_vec_length() {
        let distributions: Vec<Box<dyn NoiseDistribution>> = vec![
            Box::new(ZeroNoise),
            Box::new(BoundedUniform::new(5).unwrap()),
            Box::new(DiscreteGauss::new(1.5, 6.0).unwrap()),
        ];

        for distribution in distributions {
            let vec = distribution.sample_vec(17).unwrap();
            assert_eq!(17, vec.get_num_rows());
            assert_eq!(1, vec.get_num_columns());
        }
    }

    /// Ensure that every distribution refuses to build a matrix without entries.
    #[test]
    fn empty_dimension() {
        let distributions: Vec<Box<dyn NoiseDistribution>> = vec![
            Box::new(ZeroNoise),
            Box::new(BoundedUniform::new(5).unwrap()),
            Box::new(DiscreteGauss::default()),
        ];

        for distribution in distributions {
            assert!(matches!(
                distribution.sample(0, 4),
                Err(AttackError::InvalidShape(_))
            ));
            assert!(matches!(
                distribution.sample_vec(0),
                Err(AttackError::InvalidShape(_))
            ));
        }
    }

    /// Ensure that deserialized distributions with unusable parameters are
    /// caught by `check` instead of failing while sampling.
    #[test]
    fn check_deserialized() {
        for json in [
            r#"{"DiscreteGauss":{"sigma":-1.0,"tailcut":13.0}}"#,
            r#"{"DiscreteGauss":{"sigma":1e300,"tailcut":13.0}}"#,
            r#"{"DiscreteGauss":{"sigma":3.2,"tailcut":1.0}}"#,
            r#"{"BoundedUniform":{"bound":-4}}"#,
            r#"{"BoundedUniform":{"bound":9223372036854775807}}"#,
        ] {
            let noise: Box<dyn NoiseDistribution> = serde_json::from_str(json).unwrap();

            assert!(matches!(
                noise.check(),
                Err(AttackError::InvalidDistribution(_))
            ));
        }
        let zero: Box<dyn NoiseDistribution> = serde_json::from_str(r#"{"ZeroNoise":null}"#).unwrap();
        assert!(zero.check().is_ok());
    }
}

// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains the [`AttackError`] type, which is returned by every
//! fallible function of this crate.

use qfall_math::error::MathError;
use thiserror::Error;

/// Errors that can occur while encoding, sampling, building a re-encryption key
/// or recovering a secret.
///
/// All variants apart from [`AttackError::Math`] are input validation failures.
/// They are raised immediately and never depend on randomness, i.e. retrying
/// with the same input fails again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttackError {
    /// The modulus is not positive or not an exact power of two where a
    /// bit-length `k = log_2(q)` is required.
    #[error("invalid modulus: {0}")]
    InvalidModulus(String),

    /// Less than one gadget level was requested.
    #[error("invalid number of gadget levels: {0}")]
    InvalidLevelCount(String),

    /// The input of the gadget encoder is neither a vector nor a matrix.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Two matrices can not be combined because of their dimensions.
    #[error("mismatching matrix dimension: {0}")]
    MismatchingMatrixDimension(String),

    /// An index is not inside the matrix.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// A tuned decision threshold does not lie in `(0, 2^(k-1)]`.
    #[error("invalid decision threshold: {0}")]
    InvalidThreshold(String),

    /// A noise distribution was configured with unusable parameters.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A parameter set does not describe a proxy re-encryption instance.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The underlying lattice arithmetic reported a failure.
    #[error("math error: {0}")]
    Math(String),
}

impl From<MathError> for AttackError {
    fn from(value: MathError) -> Self {
        AttackError::Math(value.to_string())
    }
}

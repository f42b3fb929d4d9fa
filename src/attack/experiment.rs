// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module runs the key recovery against freshly generated instances of
//! [`GadgetPre`] and collects the outcome in serializable reports.

use super::key_recovery::recover_all;
use crate::{
    construction::proxy_reencryption::{GadgetPre, PreParameters, ProxyReEncryption},
    error::AttackError,
    utils::convert::{column_to_array, vector_to_column},
};
use ndarray::{Array1, Array2};
use qfall_math::traits::{GetNumColumns, GetNumRows};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The parameters of an attacked instance in a printable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub n: usize,
    pub m: usize,
    pub k: usize,
    pub q: i64,
    pub noise: String,
}

impl From<&PreParameters> for ParameterSummary {
    fn from(params: &PreParameters) -> Self {
        Self {
            n: params.n,
            m: params.m,
            k: params.k,
            q: params.q,
            noise: params.noise.describe(),
        }
    }
}

/// The outcome for a single coordinate of the delegator's secret.
///
/// Attributes:
/// - `index`: the position of the coordinate in the secret
/// - `bits`: the recovered bits, most significant bit first
/// - `recovered`: the recovered value
/// - `expected`: the actual value of the secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateReport {
    pub index: usize,
    pub bits: Vec<u8>,
    pub recovered: i64,
    pub expected: i64,
}

impl CoordinateReport {
    /// Returns `true` if the coordinate was recovered correctly.
    pub fn is_correct(&self) -> bool {
        self.recovered == self.expected
    }
}

/// The outcome of a single attack.
///
/// Attributes:
/// - `parameters`: the parameters of the attacked instance
/// - `secret_a`: the delegator's secret, which the attack aims for
/// - `secret_b`: the recipient's secret, which the attacker holds
/// - `rk1_shape`: the dimension of `rk1`
/// - `rk2_len`: the length of `rk2`
/// - `result`: the `k × m` matrix `rk1 * sk_b - rk2 mod q`
/// - `coordinates`: the recovery of each coordinate of `secret_a`
/// - `success`: `true` if all coordinates were recovered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub parameters: ParameterSummary,
    pub secret_a: Array1<i64>,
    pub secret_b: Array1<i64>,
    pub rk1_shape: (usize, usize),
    pub rk2_len: usize,
    pub result: Array2<i64>,
    pub coordinates: Vec<CoordinateReport>,
    pub success: bool,
}

impl AttackReport {
    /// Returns the number of wrongly recovered coordinates.
    pub fn coordinate_errors(&self) -> usize {
        self.coordinates
            .iter()
            .filter(|coordinate| !coordinate.is_correct())
            .count()
    }
}

impl fmt::Display for AttackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(30);
        writeln!(f, "{rule} Before Attack {rule}")?;
        writeln!(f)?;
        writeln!(f, "Alice's secret key: {}", self.secret_a)?;
        writeln!(f, "Bob's secret key: {}", self.secret_b)?;
        writeln!(
            f,
            "Re-encryption key rk1 shape: {:?}, rk2 shape: ({},)",
            self.rk1_shape, self.rk2_len
        )?;
        writeln!(f)?;
        writeln!(f, "{rule} After Attack {rule}")?;
        writeln!(f)?;
        writeln!(
            f,
            "Result after applying the recipient's secret key to (rk1, rk2):"
        )?;
        writeln!(f, "{}", self.result)?;
        writeln!(f)?;
        writeln!(f, "Recovered secrets:")?;
        for coordinate in &self.coordinates {
            writeln!(
                f,
                "Secret {}: bits = {:?}, value = {}, ska{} = {}",
                coordinate.index,
                coordinate.bits,
                coordinate.recovered,
                coordinate.index,
                coordinate.expected
            )?;
        }
        writeln!(f)?;
        write!(f, "Attack success: {}", self.success)
    }
}

/// The aggregated outcome of repeated attacks.
///
/// Attributes:
/// - `parameters`: the parameters of the attacked instances
/// - `trials`: the number of attacks
/// - `successes`: the number of attacks recovering the whole secret
/// - `coordinate_errors`: the number of wrongly recovered coordinates over all attacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub parameters: ParameterSummary,
    pub trials: usize,
    pub successes: usize,
    pub coordinate_errors: usize,
}

impl TrialSummary {
    /// Returns the fraction of successful attacks.
    pub fn success_rate(&self) -> f64 {
        self.successes as f64 / self.trials as f64
    }
}

impl fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} attacks succeeded ({:.2}%), {} coordinates were recovered wrongly",
            self.successes,
            self.trials,
            100.0 * self.success_rate(),
            self.coordinate_errors
        )
    }
}

/// Attacks instances of [`GadgetPre`] by recovering the delegator's secret
/// from a re-encryption key and the recipient's secret.
///
/// # Examples
/// ```
/// use pre_key_recovery::attack::experiment::KeyRecoveryExperiment;
/// use pre_key_recovery::construction::proxy_reencryption::PreParameters;
///
/// let experiment = KeyRecoveryExperiment::new(PreParameters::init_default()).unwrap();
///
/// let report = experiment.run_fresh().unwrap();
///
/// assert!(report.success);
/// ```
pub struct KeyRecoveryExperiment {
    pre: GadgetPre,
}

impl KeyRecoveryExperiment {
    /// Instantiates an experiment against [`GadgetPre`] with the given parameters.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidParameters`](AttackError::InvalidParameters)
    ///   or [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if the parameters are inconsistent.
    pub fn new(params: PreParameters) -> Result<Self, AttackError> {
        Ok(Self {
            pre: GadgetPre::new(params)?,
        })
    }

    /// Returns the attacked scheme.
    pub fn scheme(&self) -> &GadgetPre {
        &self.pre
    }

    /// Attacks a re-encryption key for the delegator's secret `secret_a`.
    ///
    /// The recipient's keys and the re-encryption key are generated freshly.
    /// Afterwards, the recipient combines the re-encryption key with its secret
    /// and recovers every coordinate of `secret_a` from the result.
    ///
    /// Parameters:
    /// - `secret_a`: the delegator's secret of length `m`
    ///
    /// Returns a report of the attack.
    ///
    /// # Examples
    /// ```
    /// use ndarray::array;
    /// use pre_key_recovery::attack::experiment::KeyRecoveryExperiment;
    /// use pre_key_recovery::construction::proxy_reencryption::PreParameters;
    /// use pre_key_recovery::sample::distribution::DiscreteGauss;
    ///
    /// let params = PreParameters::new(4, 4, 10, Box::new(DiscreteGauss::default())).unwrap();
    /// let experiment = KeyRecoveryExperiment::new(params).unwrap();
    ///
    /// let report = experiment.run(&array![3, -5, 0, 511]).unwrap();
    ///
    /// assert_eq!(vec![0, 0, 0, 0, 0, 0, 0, 0, 1, 1], report.coordinates[0].bits);
    /// ```
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`MismatchingMatrixDimension`](AttackError::MismatchingMatrixDimension)
    ///   if `secret_a` does not have length `m`.
    /// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
    ///   if `secret_a` is empty.
    pub fn run(&self, secret_a: &Array1<i64>) -> Result<AttackReport, AttackError> {
        let params = self.pre.params();

        let secret_b = self.pre.gen_secret_key()?;
        let pk_b = self.pre.gen_public_key(&secret_b)?;
        let rk = self.pre.gen_rk(&pk_b, &vector_to_column(secret_a)?)?;
        let result = self.pre.decrypt_rk(&rk, &secret_b)?;

        let coordinates: Vec<CoordinateReport> = recover_all(&result, params.q)?
            .into_iter()
            .zip(secret_a.iter())
            .enumerate()
            .map(|(index, (coordinate, &expected))| CoordinateReport {
                index,
                bits: coordinate.bits_msb_first(),
                recovered: coordinate.value,
                expected,
            })
            .collect();

        for coordinate in coordinates.iter().filter(|c| !c.is_correct()) {
            tracing::warn!(
                index = coordinate.index,
                recovered = coordinate.recovered,
                expected = coordinate.expected,
                "coordinate recovered wrongly"
            );
        }
        let success = coordinates.iter().all(CoordinateReport::is_correct);
        tracing::info!(success, m = params.m, k = params.k, "key recovery finished");

        Ok(AttackReport {
            parameters: ParameterSummary::from(params),
            secret_a: secret_a.clone(),
            secret_b: column_to_array(&secret_b)?,
            rk1_shape: (
                rk.rk1.get_num_rows() as usize,
                rk.rk1.get_num_columns() as usize,
            ),
            rk2_len: rk.rk2.get_num_rows() as usize,
            result,
            coordinates,
            success,
        })
    }

    /// Attacks a re-encryption key for a freshly sampled delegator's secret,
    /// see [`KeyRecoveryExperiment::run`].
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] if the underlying scheme fails,
    ///   which does not happen for checked parameters.
    pub fn run_fresh(&self) -> Result<AttackReport, AttackError> {
        let secret_a = column_to_array(&self.pre.gen_secret_key()?)?;
        self.run(&secret_a)
    }

    /// Repeats [`KeyRecoveryExperiment::run_fresh`] `trials` times
    /// and counts the successes.
    ///
    /// Parameters:
    /// - `trials`: the number of attacks
    ///
    /// Returns the aggregated outcome.
    ///
    /// # Examples
    /// ```
    /// use pre_key_recovery::attack::experiment::KeyRecoveryExperiment;
    /// use pre_key_recovery::construction::proxy_reencryption::PreParameters;
    ///
    /// let experiment = KeyRecoveryExperiment::new(PreParameters::init_default()).unwrap();
    ///
    /// let summary = experiment.run_trials(10).unwrap();
    ///
    /// assert_eq!(10, summary.successes);
    /// ```
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidParameters`](AttackError::InvalidParameters)
    ///   if `trials == 0`.
    pub fn run_trials(&self, trials: usize) -> Result<TrialSummary, AttackError> {
        if trials == 0 {
            return Err(AttackError::InvalidParameters(String::from(
                "At least one trial is required.",
            )));
        }

        let mut successes = 0;
        let mut coordinate_errors = 0;
        for trial in 0..trials {
            let report = self.run_fresh()?;
            tracing::debug!(trial, success = report.success, "trial finished");
            successes += usize::from(report.success);
            coordinate_errors += report.coordinate_errors();
        }

        let summary = TrialSummary {
            parameters: ParameterSummary::from(self.pre.params()),
            trials,
            successes,
            coordinate_errors,
        };
        tracing::info!(trials, successes, coordinate_errors, "all trials finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod test_run {
    use super::KeyRecoveryExperiment;
    use crate::{
        construction::proxy_reencryption::PreParameters,
        error::AttackError,
        primitive::gadget::encode,
        sample::distribution::{BoundedUniform, DiscreteGauss},
    };
    use ndarray::{array, Array2};

    /// Ensure that the report of the demo instance is complete and successful.
    #[test]
    fn demo_instance() {
        let params = PreParameters::new(4, 4, 10, Box::new(DiscreteGauss::default())).unwrap();
        let experiment = KeyRecoveryExperiment::new(params).unwrap();
        let secret_a = array![3, -5, 0, 511];

        let report = experiment.run(&secret_a).unwrap();

        assert!(report.success);
        assert_eq!(0, report.coordinate_errors());
        assert_eq!((40, 4), report.rk1_shape);
        assert_eq!(40, report.rk2_len);
        assert_eq!((10, 4), report.result.dim());
        assert_eq!(secret_a, report.secret_a);
        assert_eq!(
            vec![1, 1, 1, 1, 1, 1, 1, 0, 1, 1],
            report.coordinates[1].bits
        );
        assert_eq!(vec![0, 1, 1, 1, 1, 1, 1, 1, 1, 1], report.coordinates[3].bits);
    }

    /// Ensure that too much noise is reported as failure with a count of
    /// wrong coordinates.
    #[test]
    fn failure_is_reported() {
        let params = PreParameters::new(2, 8, 8, Box::new(BoundedUniform::new(128).unwrap())).unwrap();
        let experiment = KeyRecoveryExperiment::new(params).unwrap();

        let report = experiment.run(&array![0, 0, 0, 0, 0, 0, 0, 0]).unwrap();

        assert!(!report.success);
        assert!(report.coordinate_errors() > 0);
        assert_eq!(
            report.coordinate_errors(),
            report.coordinates.iter().filter(|c| c.recovered != c.expected).count()
        );
    }

    /// Ensure that wrongly recovered coordinates only occur where the noise of
    /// some level left `[-2^{k-2}, 2^{k-2})` and that all other coordinates
    /// are recovered, by comparing the result against `P2(secret_a)`.
    #[test]
    fn mismatch_confined_to_noisy_levels() {
        let (k, m, q) = (8usize, 8, 256i64);
        let threshold = 1 << (k - 2);
        let params = PreParameters::new(
            2,
            m,
            k,
            Box::new(BoundedUniform::new(threshold + threshold / 8).unwrap()),
        )
        .unwrap();
        let experiment = KeyRecoveryExperiment::new(params).unwrap();
        let secret_a = array![0, 1, -1, 17, -64, 100, 127, -128];
        let expanded = encode(&secret_a, q, k as i64).unwrap();
        let gadget = Array2::from_shape_vec((k, m), expanded.iter().copied().collect()).unwrap();
        let (mut clean_coordinates, mut noisy_coordinates) = (0, 0);

        for _ in 0..10 {
            let report = experiment.run(&secret_a).unwrap();
            let noise = (&report.result - &gadget).mapv(|e| (e + q / 2).rem_euclid(q) - q / 2);

            for coordinate in &report.coordinates {
                let clean = noise
                    .column(coordinate.index)
                    .iter()
                    .all(|e| (-threshold..threshold).contains(e));
                if clean {
                    clean_coordinates += 1;
                    assert_eq!(coordinate.expected, coordinate.recovered);
                } else {
                    noisy_coordinates += 1;
                }
                if !coordinate.is_correct() {
                    assert!(noise
                        .column(coordinate.index)
                        .iter()
                        .any(|e| !(-threshold..threshold).contains(e)));
                }
            }
        }

        assert!(clean_coordinates > 0);
        assert!(noisy_coordinates > 0);
    }

    /// Ensure that the text output names the outcome of every coordinate.
    #[test]
    fn display() {
        let experiment = KeyRecoveryExperiment::new(PreParameters::init_default()).unwrap();

        let text = experiment.run_fresh().unwrap().to_string();

        assert!(text.contains("Before Attack"));
        assert!(text.contains("Secret 7: bits = "));
        assert!(text.ends_with("Attack success: true"));
    }

    /// Ensure that a secret of the wrong length is rejected.
    #[test]
    fn wrong_length() {
        let experiment = KeyRecoveryExperiment::new(PreParameters::init_default()).unwrap();

        assert!(matches!(
            experiment.run(&array![1, 2, 3]),
            Err(AttackError::MismatchingMatrixDimension(_))
        ));
    }
}

// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains a sampler for the discrete Gaussian distribution
//! `D_{Z, sigma, c}` truncated at `tailcut * sigma` around its center `c`.

use super::{NoiseDistribution, MAX_BOUND};
use crate::{error::AttackError, utils::convert::check_dimensions};
use qfall_math::{
    integer::{MatZ, Z},
    rational::Q,
    traits::SetEntry,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The default tail cut, i.e. samples are bounded by `ceil(13 * sigma)`.
pub const DEFAULT_TAILCUT: f64 = 13.0;

/// The discrete Gaussian distribution over `Z` centred at `center` with
/// standard deviation `sigma`, whose samples deviate from `center` by at most
/// `ceil(tailcut * sigma)`.
///
/// Samples are drawn with [`Z::sample_discrete_gauss`], where `x` has weight
/// `exp(-(x - center)^2 / (2 sigma^2))`. That sampler takes the Gaussian
/// parameter `s = sigma * sqrt(2 pi)` and truncates its support at `s * log(n)`,
/// hence `n` is the largest power of two with `log_2(n) <= tailcut / sqrt(2 pi)`.
///
/// Attributes:
/// - `sigma`: the standard deviation
/// - `tailcut`: the multiple of `sigma` at which the support is truncated
/// - `center`: the center of the distribution, `0` if omitted in a parameter file
///
/// # Examples
/// ```
/// use pre_key_recovery::sample::distribution::{DiscreteGauss, NoiseDistribution};
/// use pre_key_recovery::utils::convert::matz_to_array;
///
/// let chi = DiscreteGauss::new(3.2, 13.0).unwrap();
/// let mat = matz_to_array(&chi.sample(4, 4).unwrap()).unwrap();
///
/// assert!(mat.iter().all(|entry| entry.abs() <= chi.bound()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscreteGauss {
    sigma: f64,
    tailcut: f64,
    #[serde(default)]
    center: i64,
}

impl DiscreteGauss {
    /// Instantiates a new [`DiscreteGauss`] distribution centred at `0`.
    ///
    /// Parameters:
    /// - `sigma`: the standard deviation
    /// - `tailcut`: the multiple of `sigma` at which the support is truncated
    ///
    /// Returns the distribution or an error if a parameter is unusable.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if `sigma` is not a positive finite number, if `tailcut` is smaller
    ///   than `sqrt(2 pi)` or not finite, or if `tailcut * sigma` exceeds [`MAX_BOUND`].
    pub fn new(sigma: f64, tailcut: f64) -> Result<Self, AttackError> {
        Self::with_center(sigma, tailcut, 0)
    }

    /// Instantiates a new [`DiscreteGauss`] distribution centred at `center`.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   under the conditions of [`DiscreteGauss::new`] or if `|center|`
    ///   exceeds [`MAX_BOUND`].
    pub fn with_center(sigma: f64, tailcut: f64, center: i64) -> Result<Self, AttackError> {
        let out = Self {
            sigma,
            tailcut,
            center,
        };
        out.check()?;
        Ok(out)
    }

    /// Instantiates a new [`DiscreteGauss`] distribution with [`DEFAULT_TAILCUT`].
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if `sigma` is not a positive finite number or too large.
    pub fn with_sigma(sigma: f64) -> Result<Self, AttackError> {
        Self::new(sigma, DEFAULT_TAILCUT)
    }

    /// Returns the standard deviation.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Returns the center.
    pub fn center(&self) -> i64 {
        self.center
    }

    /// Returns the largest distance from the center a sample can take,
    /// i.e. `ceil(tailcut * sigma)`.
    pub fn bound(&self) -> i64 {
        (self.tailcut * self.sigma).ceil() as i64
    }

    /// Returns the parameter `n` of [`Z::sample_discrete_gauss`], which
    /// truncates the support at `s * log(n) <= tailcut * sigma`.
    fn tail_parameter(&self) -> Z {
        let exponent = (self.tailcut / (2.0 * PI).sqrt()).floor().clamp(1.0, 62.0) as u32;
        Z::from(1i64 << exponent)
    }
}

impl Default for DiscreteGauss {
    /// Returns the discrete Gaussian with `sigma = 3.2`, [`DEFAULT_TAILCUT`]
    /// and center `0`.
    fn default() -> Self {
        Self {
            sigma: 3.2,
            tailcut: DEFAULT_TAILCUT,
            center: 0,
        }
    }
}

#[typetag::serde]
impl NoiseDistribution for DiscreteGauss {
    /// Samples a `rows × cols` matrix with entries drawn independently from
    /// the truncated discrete Gaussian distribution.
    ///
    /// Parameters:
    /// - `rows`: number of rows of the sampled matrix
    /// - `cols`: number of columns of the sampled matrix
    ///
    /// Returns a matrix with entries in `[center - bound, center + bound]`.
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type [`InvalidShape`](AttackError::InvalidShape)
    ///   if `rows` or `cols` is `0`.
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if the parameters do not pass [`NoiseDistribution::check`].
    fn sample(&self, rows: usize, cols: usize) -> Result<MatZ, AttackError> {
        check_dimensions(rows, cols)?;
        self.check()?;

        // `Z::sample_discrete_gauss` expects the Gaussian parameter instead of
        // the standard deviation
        let s = Q::from(self.sigma) * (Q::from(2) * Q::PI).sqrt();
        let n = self.tail_parameter();
        let center = Z::from(self.center);

        let mut out = MatZ::new(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                let sample = Z::sample_discrete_gauss(&n, &center, &s)?;
                out.set_entry(i, j, sample)?;
            }
        }
        Ok(out)
    }

    fn describe(&self) -> String {
        format!(
            "discrete Gaussian (sigma = {}, tail cut = {}, center = {})",
            self.sigma, self.tailcut, self.center
        )
    }

    /// Checks that `sigma` is positive and finite, that `tailcut` is finite and
    /// at least `sqrt(2 pi)`, and that neither `tailcut * sigma` nor `|center|`
    /// exceeds [`MAX_BOUND`].
    ///
    /// # Errors and Failures
    /// - Returns a [`AttackError`] of type
    ///   [`InvalidDistribution`](AttackError::InvalidDistribution)
    ///   if one of these conditions is violated.
    fn check(&self) -> Result<(), AttackError> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(AttackError::InvalidDistribution(format!(
                "The standard deviation has to be positive, but it is {}.",
                self.sigma
            )));
        }
        if !(self.tailcut.is_finite() && self.tailcut >= (2.0 * PI).sqrt()) {
            return Err(AttackError::InvalidDistribution(format!(
                "The tail cut has to be at least sqrt(2 pi), but it is {}.",
                self.tailcut
            )));
        }
        if self.tailcut * self.sigma > MAX_BOUND as f64 {
            return Err(AttackError::InvalidDistribution(format!(
                "The samples may deviate by up to {} from the center, but at most {MAX_BOUND} is supported.",
                self.tailcut * self.sigma
            )));
        }
        if self.center.unsigned_abs() > MAX_BOUND as u64 {
            return Err(AttackError::InvalidDistribution(format!(
                "The center has to lie in [-{MAX_BOUND}, {MAX_BOUND}], but it is {}.",
                self.center
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_new {
    use super::DiscreteGauss;
    use crate::{error::AttackError, sample::distribution::MAX_BOUND};

    /// Ensure that unusable parameters are rejected.
    #[test]
    fn invalid_parameters() {
        for (sigma, tailcut) in [
            (0.0, 13.0),
            (-1.0, 13.0),
            (f64::NAN, 13.0),
            (3.2, 0.0),
            (3.2, 2.0),
            (3.2, f64::INFINITY),
        ] {
            assert!(matches!(
                DiscreteGauss::new(sigma, tailcut),
                Err(AttackError::InvalidDistribution(_))
            ));
        }
    }

    /// Ensure that huge standard deviations are rejected instead of producing
    /// a saturated bound.
    #[test]
    fn too_large() {
        assert!(matches!(
            DiscreteGauss::new(1e10, 13.0),
            Err(AttackError::InvalidDistribution(_))
        ));
        assert!(matches!(
            DiscreteGauss::with_sigma(f64::MAX),
            Err(AttackError::InvalidDistribution(_))
        ));
        assert!(DiscreteGauss::new(MAX_BOUND as f64 / 16.0, 16.0).is_ok());
    }

    /// Ensure that centers beyond [`MAX_BOUND`] are rejected.
    #[test]
    fn center_out_of_range() {
        assert!(DiscreteGauss::with_center(3.2, 13.0, -MAX_BOUND).is_ok());
        for center in [MAX_BOUND + 1, i64::MIN] {
            assert!(matches!(
                DiscreteGauss::with_center(3.2, 13.0, center),
                Err(AttackError::InvalidDistribution(_))
            ));
        }
    }

    /// Ensure that the bound is computed as `ceil(tailcut * sigma)`.
    #[test]
    fn bound() {
        assert_eq!(42, DiscreteGauss::new(3.2, 13.0).unwrap().bound());
        assert_eq!(6, DiscreteGauss::new(1.0, 6.0).unwrap().bound());
        assert_eq!(42, DiscreteGauss::with_sigma(3.2).unwrap().bound());
        assert_eq!(42, DiscreteGauss::default().bound());
    }

    /// Ensure that the center defaults to `0` and is kept otherwise.
    #[test]
    fn center() {
        assert_eq!(0, DiscreteGauss::default().center());
        assert_eq!(0, DiscreteGauss::new(3.2, 13.0).unwrap().center());
        assert_eq!(-17, DiscreteGauss::with_center(3.2, 13.0, -17).unwrap().center());
    }
}

#[cfg(test)]
mod test_sample {
    use super::DiscreteGauss;
    use crate::{
        error::AttackError,
        sample::distribution::NoiseDistribution,
        utils::convert::{column_to_array, matz_to_array},
    };

    /// Ensure that all samples lie within the truncated support.
    #[test]
    fn within_bound() {
        let chi = DiscreteGauss::new(2.0, 3.0).unwrap();
        let mat = matz_to_array(&chi.sample(50, 40).unwrap()).unwrap();

        assert_eq!((50, 40), mat.dim());
        assert!(mat.iter().all(|entry| entry.abs() <= 6));
    }

    /// Ensure that the empirical mean and standard deviation are close to `0`
    /// and `sigma`.
    #[test]
    fn moments() {
        let chi = DiscreteGauss::new(3.2, 13.0).unwrap();
        let samples = matz_to_array(&chi.sample(100, 100).unwrap()).unwrap();

        let count = samples.len() as f64;
        let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / count;
        let variance = samples
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / count;

        assert!(mean.abs() < 0.2);
        assert!((variance.sqrt() - 3.2).abs() < 0.2);
    }

    /// Ensure that samples are shifted by the center and stay within
    /// `bound` of it.
    #[test]
    fn shifted_center() {
        let chi = DiscreteGauss::with_center(1.0, 6.0, 100).unwrap();
        let samples = matz_to_array(&chi.sample(40, 40).unwrap()).unwrap();

        let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / samples.len() as f64;

        assert!((mean - 100.0).abs() < 0.2);
        assert!(samples.iter().all(|&x| (x - 100).abs() <= chi.bound()));
    }

    /// Ensure that a tiny standard deviation almost always yields `0`.
    #[test]
    fn tiny_sigma() {
        let chi = DiscreteGauss::new(0.1, 13.0).unwrap();
        let samples = column_to_array(&chi.sample_vec(1000).unwrap()).unwrap();

        assert!(samples.iter().filter(|&&x| x == 0).count() > 990);
    }

    /// Ensure that parameters read from a file without a center are accepted
    /// and that unusable ones are refused while sampling.
    #[test]
    fn deserialized() {
        let chi: DiscreteGauss = serde_json::from_str(r#"{"sigma":3.2,"tailcut":13.0}"#).unwrap();
        let broken: DiscreteGauss =
            serde_json::from_str(r#"{"sigma":-1.0,"tailcut":13.0,"center":0}"#).unwrap();

        assert_eq!(DiscreteGauss::default(), chi);
        assert!(matches!(
            broken.sample(2, 2),
            Err(AttackError::InvalidDistribution(_))
        ));
    }
}

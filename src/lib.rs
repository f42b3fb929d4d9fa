// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This crate demonstrates a key recovery against a lattice-based proxy
//! re-encryption scheme, whose re-encryption key hides the power-of-two gadget
//! expansion of the delegator's secret only behind small noise.
//!
//! - [`primitive::gadget`] computes the gadget expansion `P2`.
//! - [`attack::key_recovery`] recovers a secret bit by bit from a noisy `P2`.
//! - [`construction::proxy_reencryption`] generates keys of the attacked scheme.
//! - [`attack::experiment`] runs the attack end to end and reports its outcome.
//!
//! # Examples
//! ```
//! use pre_key_recovery::attack::KeyRecoveryExperiment;
//! use pre_key_recovery::construction::proxy_reencryption::PreParameters;
//!
//! let experiment = KeyRecoveryExperiment::new(PreParameters::init_default()).unwrap();
//! let report = experiment.run_fresh().unwrap();
//!
//! assert!(report.success);
//! ```

pub mod attack;
pub mod construction;
pub mod error;
pub mod primitive;
pub mod sample;
pub mod utils;

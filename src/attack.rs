// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains the key recovery against gadget-based proxy
//! re-encryption keys.
//!
//! - [`key_recovery`] decodes the secret bit by bit from a noisy
//!   power-of-two gadget expansion.
//! - [`experiment`] generates instances of the attacked scheme, runs the
//!   recovery against them and reports the outcome.

pub mod experiment;
pub mod key_recovery;

pub use experiment::{AttackReport, KeyRecoveryExperiment, TrialSummary};
pub use key_recovery::{recover_all, recover_one, RecoveredCoordinate};

// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module provides the trait a struct should implement if it is an
//! instance of a proxy re-encryption scheme, whose re-encryption keys are
//! handed to the recipient. Furthermore, it contains the gadget-based scheme
//! [`GadgetPre`], whose re-encryption keys leak the secret of the delegator.
//!
//! A re-encryption key from Alice to Bob is computed from Bob's public key and
//! Alice's secret key. Bob can combine it with his own secret key, which is
//! modelled by [`ProxyReEncryption::decrypt_rk`].

mod gadget_pre;
mod parameters;

pub use gadget_pre::{GadgetPre, PublicKey, ReEncryptionKey};
pub use parameters::{PreParameters, MAX_LEVELS};

use crate::error::AttackError;
use ndarray::Array2;

pub trait ProxyReEncryption {
    type SecretKey;
    type PublicKey;
    type ReEncryptionKey;

    fn gen_secret_key(&self) -> Result<Self::SecretKey, AttackError>;
    fn gen_public_key(&self, sk: &Self::SecretKey) -> Result<Self::PublicKey, AttackError>;
    fn gen_rk(
        &self,
        pk_b: &Self::PublicKey,
        sk_a: &Self::SecretKey,
    ) -> Result<Self::ReEncryptionKey, AttackError>;
    fn decrypt_rk(
        &self,
        rk: &Self::ReEncryptionKey,
        sk_b: &Self::SecretKey,
    ) -> Result<Array2<i64>, AttackError>;
}

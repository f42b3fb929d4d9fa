// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! This module contains the cryptographic constructions that are attacked.
//! A construction is build the same way:
//!
//! 1. A trait that combines the common feature, e.g.
//! [`proxy re-encryption`](proxy_reencryption::ProxyReEncryption).
//! 2. Explicit implementations of the trait, e.g.
//! [`GadgetPre`](proxy_reencryption::GadgetPre).

pub mod proxy_reencryption;

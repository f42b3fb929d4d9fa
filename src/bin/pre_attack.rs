// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

//! Command line driver, which attacks a freshly generated instance of the
//! gadget-based proxy re-encryption scheme and prints the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::Array1;
use pre_key_recovery::{
    attack::KeyRecoveryExperiment,
    construction::proxy_reencryption::PreParameters,
    sample::distribution::{DiscreteGauss, DEFAULT_TAILCUT},
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "pre-attack")]
#[command(about = "Recover a delegator's secret from a gadget-based re-encryption key")]
#[command(version)]
struct Cli {
    /// JSON file with the parameters `n`, `m`, `k`, `q` and `noise`
    #[arg(long, conflicts_with_all = ["k", "n", "m", "sigma", "tailcut", "center"])]
    params: Option<PathBuf>,

    /// Number of gadget levels, the modulus is `2^k`
    #[arg(short, default_value_t = 10)]
    k: usize,

    /// Number of rows of the public matrix
    #[arg(short, default_value_t = 4)]
    n: usize,

    /// Length of the secret keys
    #[arg(short, default_value_t = 8)]
    m: usize,

    /// Standard deviation of secrets and noise
    #[arg(long, default_value_t = 3.2)]
    sigma: f64,

    /// Tail cut of the discrete Gaussian in multiples of `sigma`
    #[arg(long, default_value_t = DEFAULT_TAILCUT)]
    tailcut: f64,

    /// Center of the discrete Gaussian
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    center: i64,

    /// Delegator's secret as comma separated list, sampled if omitted
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, conflicts_with = "trials")]
    secret: Option<Vec<i64>>,

    /// Repeat the attack and only print the success statistics
    #[arg(long)]
    trials: Option<usize>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Log key generation and every trial
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Loads the parameters from `--params` or assembles them from the flags.
    fn parameters(&self) -> Result<PreParameters> {
        match &self.params {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let params: PreParameters = serde_json::from_str(&content)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                params.check()?;
                Ok(params)
            }
            None => {
                let noise = DiscreteGauss::with_center(self.sigma, self.tailcut, self.center)?;
                Ok(PreParameters::new(self.n, self.m, self.k, Box::new(noise))?)
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pre_attack=debug,pre_key_recovery=debug"
    } else {
        "pre_attack=info,pre_key_recovery=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let params = cli.parameters()?;
    tracing::info!(
        n = params.n,
        m = params.m,
        k = params.k,
        noise = %params.noise.describe(),
        "attacking proxy re-encryption instance"
    );
    let experiment = KeyRecoveryExperiment::new(params)?;

    if let Some(trials) = cli.trials {
        let summary = experiment.run_trials(trials)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{summary}");
        }
        return Ok(());
    }

    let report = match &cli.secret {
        Some(secret) => experiment.run(&Array1::from(secret.clone()))?,
        None => experiment.run_fresh()?,
    };
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-uat-config project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_uat_config::auth::keygen::{KeyPairGenerator, MIN_KEY_BITS};

/// Generate an RSA key pair for UAT JWT signing
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Output directory for private_key.pem and public_key.pem
    #[clap(long, default_value = "./keys")]
    out_dir: PathBuf,

    /// RSA key length in bits
    #[clap(long, default_value_t = MIN_KEY_BITS)]
    length: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Generating RSA key pair with {} bits...", args.length);

    let key_pair = KeyPairGenerator::new(&args.out_dir)
        .with_key_size(args.length)?
        .generate()
        .context("Failed to generate RSA key pair")?;

    println!("Private key written to: {:?}", key_pair.paths().private_key_path);
    println!("Public key written to: {:?}", key_pair.paths().public_key_path);
    println!();
    println!("The public key is registered with Cloud Manager as part of the UAT configuration.");
    println!("Keep the private key to yourself, it signs the JWTs.");

    Ok(())
}

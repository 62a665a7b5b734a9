//! Offline tooling: trusted setup, secrets, commitments and proofs.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use ark_std::rand::{rngs::StdRng, SeedableRng};
use clap::{Parser, Subcommand};
use zkvault_circuits::{commitment_params, create_commitment, Address, Secret};
use zkvault_prover::export::export_verifying_key_json;
use zkvault_prover::setup::{setup_default, setup_withdrawal, CircuitKeys};
use zkvault_prover::{prove_withdrawal, verify::verify_envelope};

#[derive(Parser)]
#[command(name = "vault-tool", about = "ZK vault offline tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the trusted setup and write keys to a directory
    Setup {
        #[arg(long, default_value = "keys")]
        keys_dir: PathBuf,
        /// Deterministic seed; for tests and local development only
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate a random secret and print its commitment
    Secret,
    /// Print the commitment for a secret
    Commit {
        #[arg(long, env = "VAULT_SECRET")]
        secret: Secret,
    },
    /// Prove a withdrawal and write the proof envelope as JSON
    Prove {
        #[arg(long, default_value = "keys")]
        keys_dir: PathBuf,
        #[arg(long, env = "VAULT_SECRET")]
        secret: Secret,
        #[arg(long)]
        recipient: Address,
        /// Output file; stdout if absent
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the verifying key as snarkjs JSON
    ExportVk {
        #[arg(long, default_value = "keys")]
        keys_dir: PathBuf,
        #[arg(long, default_value = "verification_key.json")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Setup { keys_dir, seed } => {
            println!("Running trusted setup...");
            let start = Instant::now();
            let keys = match seed {
                Some(seed) => setup_withdrawal(
                    &mut StdRng::seed_from_u64(seed),
                    Arc::new(commitment_params()),
                )?,
                None => setup_default()?,
            };
            keys.save_to_directory(&keys_dir)
                .with_context(|| format!("saving keys to {}", keys_dir.display()))?;
            println!("Setup completed in {:?}", start.elapsed());
            println!("Keys written to {}", keys_dir.display());
        }
        Command::Secret => {
            let secret = Secret::random(&mut rand::rngs::OsRng);
            let commitment = create_commitment(&secret, &commitment_params())?;
            println!("secret:     {}", secret.to_decimal_string());
            println!("commitment: {commitment}");
        }
        Command::Commit { secret } => {
            let commitment = create_commitment(&secret, &commitment_params())?;
            println!("{commitment}");
            println!("{}", commitment.to_decimal_string());
        }
        Command::Prove {
            keys_dir,
            secret,
            recipient,
            out,
        } => {
            let keys = CircuitKeys::load_from_directory(&keys_dir)
                .with_context(|| format!("loading keys from {}", keys_dir.display()))?;

            let start = Instant::now();
            let result = prove_withdrawal(&keys.proving_key, &keys.params, &secret, &recipient)?;
            let envelope = result.envelope();
            eprintln!("Proof generated in {:?}", start.elapsed());

            if !verify_envelope(&keys.verifying_key, &envelope)? {
                anyhow::bail!("generated proof does not verify");
            }

            let json = serde_json::to_string_pretty(&envelope)?;
            match out {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::ExportVk { keys_dir, out } => {
            let keys = CircuitKeys::load_from_directory(&keys_dir)
                .with_context(|| format!("loading keys from {}", keys_dir.display()))?;
            let json = export_verifying_key_json(&keys.verifying_key);
            fs::write(&out, serde_json::to_string_pretty(&json)?)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Verifying key written to {}", out.display());
        }
    }

    Ok(())
}

//! HTTP node hosting a single-denomination ZK vault.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zkvault_circuits::Address;
use zkvault_ledger::VaultLedger;
use zkvault_prover::setup::{setup_default, CircuitKeys};
use zkvault_prover::Groth16Gateway;

mod config;
mod deployment;
mod error;
mod handlers;
mod routes;
#[cfg(test)]
mod test_support;

use config::Args;
use deployment::Deployment;

/// Application state shared across handlers
pub struct AppState {
    pub keys: Arc<CircuitKeys>,
    pub ledger: VaultLedger,
    /// Snapshot rewritten after every accepted transition
    pub ledger_path: PathBuf,
    pub deployment: Deployment,
    pub network: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!(network = %args.network, "Starting vault node...");

    let keys = Arc::new(load_or_setup_keys(&args.keys_dir).await?);

    let gateway = Groth16Gateway::new(&keys.verifying_key)
        .context("verifying key does not match the withdrawal circuit")?;
    let deployer = args
        .deployer
        .unwrap_or_else(|| Address::random(&mut rand::thread_rng()));
    let deployment = deployment::resolve_or_create(
        &args.deployments_dir,
        &args.network,
        deployer,
        args.denomination,
        &mut rand::thread_rng(),
    )?;
    deployment::save_interface(&args.deployments_dir, &routes::interface())?;

    let ledger_path = deployment::ledger_path(&args.deployments_dir, &args.network);
    let ledger = deployment::open_ledger(&ledger_path, args.denomination, Arc::new(gateway))?;
    tracing::info!(
        address = %deployment.address,
        denomination = %deployment.denomination,
        "Vault ready"
    );

    let state = Arc::new(RwLock::new(AppState {
        keys,
        ledger,
        ledger_path,
        deployment,
        network: args.network.clone(),
    }));
    let app = routes::app(state);

    let addr = args.socket_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn load_or_setup_keys(keys_dir: &Path) -> anyhow::Result<CircuitKeys> {
    if keys_dir.exists() {
        tracing::info!("Loading existing circuit keys from {:?}", keys_dir);
        return CircuitKeys::load_from_directory(keys_dir)
            .with_context(|| format!("failed to load circuit keys from {keys_dir:?}"));
    }

    tracing::info!("Running trusted setup (this may take a while)...");
    let keys = tokio::task::spawn_blocking(setup_default).await??;
    keys.save_to_directory(keys_dir)
        .context("failed to save circuit keys")?;
    tracing::info!("Circuit keys saved to {:?}", keys_dir);
    Ok(keys)
}

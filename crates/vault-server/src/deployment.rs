//! Per-network deployment records.
//!
//! ```text
//! deployments/
//!   <network>/ZkVault.json          address, deployer, denomination, timestamp
//!   <network>/ZkVault.ledger.json   ledger snapshot, rewritten after every transition
//!   abis/ZkVault.json               route list served by the node
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkvault_circuits::Address;
use zkvault_ledger::{unix_now, Amount, LedgerError, LedgerSnapshot, VaultLedger};
use zkvault_prover::VerifierGateway;

pub const VAULT_NAME: &str = "ZkVault";
pub const INTERFACE_DIR: &str = "abis";

#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid deployment record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stored ledger rejected: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Deployment on {network} uses denomination {recorded}, configured {configured}")]
    DenominationMismatch {
        network: String,
        recorded: Amount,
        configured: Amount,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub deployer: Address,
    #[serde(with = "zkvault_ledger::amount")]
    pub denomination: Amount,
    pub timestamp: u64,
}

/// One entry in the interface description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub method: String,
    pub path: String,
}

pub fn deployment_path(dir: &Path, network: &str) -> PathBuf {
    dir.join(network).join(format!("{VAULT_NAME}.json"))
}

pub fn ledger_path(dir: &Path, network: &str) -> PathBuf {
    dir.join(network).join(format!("{VAULT_NAME}.ledger.json"))
}

pub fn interface_path(dir: &Path) -> PathBuf {
    dir.join(INTERFACE_DIR).join(format!("{VAULT_NAME}.json"))
}

pub fn load(dir: &Path, network: &str) -> Result<Option<Deployment>, DeploymentError> {
    let path = deployment_path(dir, network);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&fs::read_to_string(path)?)?))
}

pub fn save(dir: &Path, network: &str, deployment: &Deployment) -> Result<(), DeploymentError> {
    write_json(&deployment_path(dir, network), deployment)
}

pub fn save_interface(dir: &Path, routes: &[RouteSpec]) -> Result<(), DeploymentError> {
    write_json(&interface_path(dir), routes)
}

/// Return the recorded deployment for `network`, or mint a fresh vault
/// address and record it.
pub fn resolve_or_create<R: RngCore>(
    dir: &Path,
    network: &str,
    deployer: Address,
    denomination: Amount,
    rng: &mut R,
) -> Result<Deployment, DeploymentError> {
    if let Some(existing) = load(dir, network)? {
        if existing.denomination != denomination {
            return Err(DeploymentError::DenominationMismatch {
                network: network.to_string(),
                recorded: existing.denomination,
                configured: denomination,
            });
        }
        return Ok(existing);
    }

    let deployment = Deployment {
        address: Address::random(rng),
        deployer,
        denomination,
        timestamp: unix_now(),
    };
    save(dir, network, &deployment)?;
    tracing::info!(
        network,
        address = %deployment.address,
        "recorded new vault deployment"
    );
    Ok(deployment)
}

/// Persist a ledger snapshot. The file is replaced atomically.
pub fn save_ledger(path: &Path, snapshot: &LedgerSnapshot) -> Result<(), DeploymentError> {
    write_json(path, snapshot)
}

/// Restore the ledger stored at `path`, or start an empty one when the vault
/// has no history yet.
pub fn open_ledger(
    path: &Path,
    denomination: Amount,
    verifier: Arc<dyn VerifierGateway>,
) -> Result<VaultLedger, DeploymentError> {
    if !path.exists() {
        return Ok(VaultLedger::new(denomination, verifier)?);
    }

    let snapshot: LedgerSnapshot = serde_json::from_str(&fs::read_to_string(path)?)?;
    if snapshot.denomination != denomination {
        return Err(LedgerError::InvalidSnapshot(format!(
            "stored denomination {} differs from configured {denomination}",
            snapshot.denomination
        ))
        .into());
    }
    let ledger = VaultLedger::restore(snapshot, verifier)?;
    tracing::info!(
        path = %path.display(),
        deposits = ledger.deposit_count(),
        withdrawals = ledger.withdrawal_count(),
        "restored vault ledger"
    );
    Ok(ledger)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DeploymentError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, serde_json::to_string_pretty(value)?)?;
    fs::rename(&staging, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gateway, read_json};
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use zkvault_circuits::Commitment;

    #[test]
    fn test_resolve_creates_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let deployer = Address::from_u64(1);

        let first = resolve_or_create(dir.path(), "localhost", deployer, 100, &mut rng).unwrap();
        assert!(deployment_path(dir.path(), "localhost").exists());

        let second = resolve_or_create(dir.path(), "localhost", deployer, 100, &mut rng).unwrap();
        assert_eq!(first, second);

        // other networks are independent
        let other = resolve_or_create(dir.path(), "sepolia", deployer, 100, &mut rng).unwrap();
        assert_ne!(other.address, first.address);
    }

    #[test]
    fn test_denomination_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        resolve_or_create(dir.path(), "localhost", Address::from_u64(1), 100, &mut rng).unwrap();

        assert!(matches!(
            resolve_or_create(dir.path(), "localhost", Address::from_u64(1), 200, &mut rng),
            Err(DeploymentError::DenominationMismatch {
                recorded: 100,
                configured: 200,
                ..
            })
        ));
    }

    #[test]
    fn test_interface_written() {
        let dir = tempfile::tempdir().unwrap();
        let routes = vec![RouteSpec {
            method: "GET".into(),
            path: "/health".into(),
        }];
        save_interface(dir.path(), &routes).unwrap();

        let saved: Vec<RouteSpec> =
            serde_json::from_str(&fs::read_to_string(interface_path(dir.path())).unwrap())
                .unwrap();
        assert_eq!(saved, routes);
    }

    #[test]
    fn test_denomination_written_as_string() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let denomination = 100_000_000_000_000_000;
        resolve_or_create(dir.path(), "localhost", Address::from_u64(1), denomination, &mut rng)
            .unwrap();

        let json = read_json(&deployment_path(dir.path(), "localhost"));
        assert_eq!(json["denomination"], "100000000000000000");
    }

    #[test]
    fn test_ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = ledger_path(dir.path(), "localhost");
        let c: Commitment = "0x1234".parse().unwrap();

        let mut ledger = open_ledger(&path, 100, gateway()).unwrap();
        assert_eq!(ledger.deposit_count(), 0);
        ledger.deposit(c, 100).unwrap();
        save_ledger(&path, &ledger.snapshot()).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let mut reopened = open_ledger(&path, 100, gateway()).unwrap();
        assert_eq!(reopened.balance(), 100);
        assert_eq!(
            reopened.deposit(c, 100),
            Err(LedgerError::CommitmentReused(c))
        );
    }

    #[test]
    fn test_ledger_denomination_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = ledger_path(dir.path(), "localhost");
        let ledger = open_ledger(&path, 100, gateway()).unwrap();
        save_ledger(&path, &ledger.snapshot()).unwrap();

        assert!(matches!(
            open_ledger(&path, 200, gateway()),
            Err(DeploymentError::Ledger(LedgerError::InvalidSnapshot(_)))
        ));
    }

    #[test]
    fn test_tampered_ledger_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = ledger_path(dir.path(), "localhost");
        let mut ledger = open_ledger(&path, 100, gateway()).unwrap();
        ledger.deposit("0x1234".parse().unwrap(), 100).unwrap();

        let mut snapshot = ledger.snapshot();
        snapshot.balance = 0;
        save_ledger(&path, &snapshot).unwrap();

        assert!(matches!(
            open_ledger(&path, 100, gateway()),
            Err(DeploymentError::Ledger(LedgerError::InvalidSnapshot(_)))
        ));
    }
}

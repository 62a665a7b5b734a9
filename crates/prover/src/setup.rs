//! Trusted setup and key artifacts.
//!
//! A key directory holds exactly one ceremony's output:
//!
//! ```text
//! keys/
//!   withdraw.pk     compressed ProvingKey<Bn254>
//!   withdraw.vk     compressed VerifyingKey<Bn254>
//!   manifest.json   circuit id, arity and SHA-256 fingerprints
//! ```
//!
//! Loading checks the files against the manifest and against each other.
//! Any disagreement is fatal: a proving key from one ceremony and a verifying
//! key from another would produce proofs that never verify.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_relations::r1cs::SynthesisError;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zkvault_circuits::{commitment_params, PedersenParameters, WithdrawalCircuit, NUM_PUBLIC_SIGNALS};

/// Identifies the constraint system the keys were generated for.
pub const CIRCUIT_ID: &str = "zkvault-withdraw-v1";

pub const PROVING_KEY_FILE: &str = "withdraw.pk";
pub const VERIFYING_KEY_FILE: &str = "withdraw.vk";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors during setup and key handling
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Circuit setup failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Key artifacts do not match: {0}")]
    Mismatch(String),
}

/// Description of a key directory, written alongside the keys.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyManifest {
    pub circuit: String,
    pub num_public_inputs: usize,
    pub proving_key_sha256: String,
    pub verifying_key_sha256: String,
}

/// Proving and verifying keys for the withdrawal circuit.
#[derive(Clone)]
pub struct CircuitKeys {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
    pub params: Arc<PedersenParameters>,
}

/// Run a circuit-specific setup for the withdrawal circuit.
pub fn setup_withdrawal<R: RngCore + CryptoRng>(
    rng: &mut R,
    params: Arc<PedersenParameters>,
) -> Result<CircuitKeys, SetupError> {
    let circuit = WithdrawalCircuit::empty(params.clone());
    let (proving_key, verifying_key) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)?;

    let keys = CircuitKeys {
        proving_key,
        verifying_key,
        params,
    };
    keys.validate()?;
    Ok(keys)
}

/// Setup with fresh OS randomness and the standard commitment parameters.
pub fn setup_default() -> Result<CircuitKeys, SetupError> {
    setup_withdrawal(&mut rand::rngs::OsRng, Arc::new(commitment_params()))
}

impl CircuitKeys {
    /// Structural checks shared by setup and load.
    pub fn validate(&self) -> Result<(), SetupError> {
        let inputs = self.verifying_key.gamma_abc_g1.len().saturating_sub(1);
        if inputs != NUM_PUBLIC_SIGNALS {
            return Err(SetupError::Mismatch(format!(
                "verifying key has {inputs} public inputs, circuit has {NUM_PUBLIC_SIGNALS}"
            )));
        }
        if self.proving_key.vk != self.verifying_key {
            return Err(SetupError::Mismatch(
                "proving key embeds a different verifying key".into(),
            ));
        }
        Ok(())
    }

    pub fn manifest(&self) -> Result<KeyManifest, SetupError> {
        Ok(KeyManifest {
            circuit: CIRCUIT_ID.to_string(),
            num_public_inputs: NUM_PUBLIC_SIGNALS,
            proving_key_sha256: fingerprint(&serialize(&self.proving_key)?),
            verifying_key_sha256: fingerprint(&serialize(&self.verifying_key)?),
        })
    }

    /// Save keys and manifest to a directory, creating it if needed.
    pub fn save_to_directory(&self, dir: &Path) -> Result<(), SetupError> {
        fs::create_dir_all(dir)?;

        let pk_bytes = serialize(&self.proving_key)?;
        let vk_bytes = serialize(&self.verifying_key)?;
        let manifest = KeyManifest {
            circuit: CIRCUIT_ID.to_string(),
            num_public_inputs: NUM_PUBLIC_SIGNALS,
            proving_key_sha256: fingerprint(&pk_bytes),
            verifying_key_sha256: fingerprint(&vk_bytes),
        };

        fs::write(dir.join(PROVING_KEY_FILE), pk_bytes)?;
        fs::write(dir.join(VERIFYING_KEY_FILE), vk_bytes)?;
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;
        Ok(())
    }

    /// Load keys from a directory written by `save_to_directory`.
    pub fn load_from_directory(dir: &Path) -> Result<Self, SetupError> {
        let manifest: KeyManifest =
            serde_json::from_str(&fs::read_to_string(dir.join(MANIFEST_FILE))?)?;
        if manifest.circuit != CIRCUIT_ID {
            return Err(SetupError::Mismatch(format!(
                "keys are for circuit {}, expected {CIRCUIT_ID}",
                manifest.circuit
            )));
        }
        if manifest.num_public_inputs != NUM_PUBLIC_SIGNALS {
            return Err(SetupError::Mismatch(format!(
                "manifest declares {} public inputs, circuit has {NUM_PUBLIC_SIGNALS}",
                manifest.num_public_inputs
            )));
        }

        let pk_bytes = fs::read(dir.join(PROVING_KEY_FILE))?;
        let vk_bytes = fs::read(dir.join(VERIFYING_KEY_FILE))?;
        check_fingerprint(PROVING_KEY_FILE, &pk_bytes, &manifest.proving_key_sha256)?;
        check_fingerprint(VERIFYING_KEY_FILE, &vk_bytes, &manifest.verifying_key_sha256)?;

        // The fingerprint already pins the proving key bytes; point validation
        // on every element of it is slow, so only the verifying key is checked.
        let proving_key = ProvingKey::<Bn254>::deserialize_compressed_unchecked(&pk_bytes[..])
            .map_err(|e| SetupError::Serialization(e.to_string()))?;
        let verifying_key = VerifyingKey::<Bn254>::deserialize_compressed(&vk_bytes[..])
            .map_err(|e| SetupError::Serialization(e.to_string()))?;

        let keys = Self {
            proving_key,
            verifying_key,
            params: Arc::new(commitment_params()),
        };
        keys.validate()?;
        Ok(keys)
    }
}

fn serialize<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>, SetupError> {
    let mut bytes = Vec::new();
    value
        .serialize_compressed(&mut bytes)
        .map_err(|e| SetupError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn check_fingerprint(name: &str, bytes: &[u8], expected: &str) -> Result<(), SetupError> {
    let actual = fingerprint(bytes);
    if actual != expected {
        return Err(SetupError::Mismatch(format!(
            "{name} fingerprint {actual} does not match manifest {expected}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    fn keys(seed: u64) -> CircuitKeys {
        let mut rng = StdRng::seed_from_u64(seed);
        setup_withdrawal(&mut rng, Arc::new(commitment_params())).unwrap()
    }

    #[test]
    fn test_setup_arity() {
        let keys = keys(42);
        assert_eq!(keys.verifying_key.gamma_abc_g1.len(), NUM_PUBLIC_SIGNALS + 1);
        assert_eq!(keys.manifest().unwrap().circuit, CIRCUIT_ID);
    }

    #[test]
    fn test_save_load_keys() {
        let keys = keys(42);
        let dir = tempfile::tempdir().unwrap();

        keys.save_to_directory(dir.path()).unwrap();
        let loaded = CircuitKeys::load_from_directory(dir.path()).unwrap();

        assert_eq!(loaded.verifying_key, keys.verifying_key);
        assert_eq!(loaded.proving_key.vk, keys.proving_key.vk);
        assert_eq!(loaded.manifest().unwrap(), keys.manifest().unwrap());
    }

    #[test]
    fn test_tampered_key_rejected() {
        let keys = keys(42);
        let dir = tempfile::tempdir().unwrap();
        keys.save_to_directory(dir.path()).unwrap();

        let path = dir.path().join(VERIFYING_KEY_FILE);
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            CircuitKeys::load_from_directory(dir.path()),
            Err(SetupError::Mismatch(_))
        ));
    }

    #[test]
    fn test_keys_from_different_ceremonies_rejected() {
        let first = keys(1);
        let second = keys(2);

        // Swap in the other ceremony's verifying key and re-fingerprint it so
        // only the cross-check can catch it.
        let mixed = CircuitKeys {
            proving_key: first.proving_key.clone(),
            verifying_key: second.verifying_key.clone(),
            params: first.params.clone(),
        };
        assert!(matches!(mixed.validate(), Err(SetupError::Mismatch(_))));

        let dir = tempfile::tempdir().unwrap();
        first.save_to_directory(dir.path()).unwrap();
        let vk_bytes = serialize(&second.verifying_key).unwrap();
        let mut manifest = first.manifest().unwrap();
        manifest.verifying_key_sha256 = fingerprint(&vk_bytes);
        fs::write(dir.path().join(VERIFYING_KEY_FILE), vk_bytes).unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_string(&manifest).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            CircuitKeys::load_from_directory(dir.path()),
            Err(SetupError::Mismatch(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CircuitKeys::load_from_directory(&dir.path().join("absent")),
            Err(SetupError::Io(_))
        ));
    }
}

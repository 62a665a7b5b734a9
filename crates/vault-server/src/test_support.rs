//! Fixtures shared by the router and deployment tests.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use ark_std::rand::{rngs::StdRng, SeedableRng};
use zkvault_circuits::commitment_params;
use zkvault_prover::setup::{setup_withdrawal, CircuitKeys};
use zkvault_prover::{Groth16Gateway, VerifierGateway};

/// One seeded setup per test binary.
pub fn keys() -> Arc<CircuitKeys> {
    static KEYS: OnceLock<Arc<CircuitKeys>> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(42);
        Arc::new(setup_withdrawal(&mut rng, Arc::new(commitment_params())).unwrap())
    })
    .clone()
}

pub fn gateway() -> Arc<dyn VerifierGateway> {
    Arc::new(Groth16Gateway::new(&keys().verifying_key).unwrap())
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

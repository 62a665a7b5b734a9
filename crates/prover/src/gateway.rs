//! The verifier boundary.
//!
//! The ledger never touches pairing arithmetic directly. It asks a
//! `VerifierGateway` whether a proof is valid for a set of public signals,
//! and gets one of three outcomes:
//!
//! - `Ok(true)`: the proof verifies
//! - `Ok(false)`: a well-formed proof that fails the verification equation
//! - `Err(_)`: malformed input, or a misconfigured verifier
//!
//! Rejections are expected adversarial outcomes. Configuration errors are
//! operator problems and are never reported as a rejected proof.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_snark::SNARK;
use thiserror::Error;
use zkvault_circuits::{PublicSignals, NUM_PUBLIC_SIGNALS};

use crate::envelope::{EnvelopeError, ProofEnvelope};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Verifier misconfigured: {0}")]
    Configuration(String),
    #[error("Malformed proof: {0}")]
    Malformed(#[from] EnvelopeError),
}

pub trait VerifierGateway: Send + Sync {
    /// Check `proof` against `signals`. Pure and deterministic.
    fn verify(&self, proof: &Proof<Bn254>, signals: &PublicSignals) -> Result<bool, GatewayError>;

    /// Decode a submitted envelope, then verify it.
    fn verify_envelope(&self, envelope: &ProofEnvelope) -> Result<bool, GatewayError> {
        let (proof, signals) = envelope.decode()?;
        self.verify(&proof, &signals)
    }
}

/// Groth16 verifier over BN254 with a prepared verifying key.
pub struct Groth16Gateway {
    pvk: PreparedVerifyingKey<Bn254>,
}

impl Groth16Gateway {
    /// Prepare `vk`, refusing a key built for a different circuit shape.
    pub fn new(vk: &VerifyingKey<Bn254>) -> Result<Self, GatewayError> {
        let inputs = vk.gamma_abc_g1.len().saturating_sub(1);
        if inputs != NUM_PUBLIC_SIGNALS {
            return Err(GatewayError::Configuration(format!(
                "verifying key expects {inputs} public inputs, circuit has {NUM_PUBLIC_SIGNALS}"
            )));
        }
        let pvk = Groth16::<Bn254>::process_vk(vk)
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        Ok(Self { pvk })
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.pvk.vk
    }
}

impl VerifierGateway for Groth16Gateway {
    fn verify(&self, proof: &Proof<Bn254>, signals: &PublicSignals) -> Result<bool, GatewayError> {
        let inputs: Vec<Fr> = signals.to_vec();
        Groth16::<Bn254>::verify_with_processed_vk(&self.pvk, &inputs, proof)
            .map_err(|e| GatewayError::Configuration(e.to_string()))
    }
}

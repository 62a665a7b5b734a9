//! Local proof verification for testing and tooling.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;
use thiserror::Error;
use zkvault_circuits::PublicSignals;

use crate::envelope::{EnvelopeError, ProofEnvelope};

/// Errors during verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Verification failed: {0}")]
    Verification(String),
    #[error("Invalid public inputs: {0}")]
    InvalidInputs(#[from] EnvelopeError),
}

/// Verify a withdrawal proof against its commitment and recipient
pub fn verify_withdrawal(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    commitment: Fr,
    recipient: Fr,
) -> Result<bool, VerifyError> {
    let public_inputs = PublicSignals::new(commitment, recipient).to_vec();

    Groth16::<Bn254>::verify(vk, &public_inputs, proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}

/// Verify a proof envelope as submitted
pub fn verify_envelope(
    vk: &VerifyingKey<Bn254>,
    envelope: &ProofEnvelope,
) -> Result<bool, VerifyError> {
    let (proof, signals) = envelope.decode()?;

    Groth16::<Bn254>::verify(vk, &signals.to_vec(), &proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}

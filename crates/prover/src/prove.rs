//! Proof generation.
//!
//! Every witness is synthesised into a scratch constraint system before
//! Groth16 runs. An unsatisfied witness is refused outright, so no proof
//! object ever exists for it.

use std::sync::Arc;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, SynthesisError};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use thiserror::Error;
use zkvault_circuits::{
    Address, CommitmentError, PedersenParameters, PublicSignals, Secret, WithdrawalCircuit,
    WithdrawalWitness,
};

use crate::envelope::ProofEnvelope;

/// Errors during proof generation
#[derive(Error, Debug)]
pub enum ProveError {
    #[error("Witness does not satisfy the withdrawal circuit (first failing constraint: {0})")]
    Unsatisfiable(String),
    #[error("Commitment error: {0}")]
    Commitment(#[from] CommitmentError),
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// Result of proof generation
#[derive(Clone, Debug)]
pub struct ProofResult {
    pub proof: Proof<Bn254>,
    pub signals: PublicSignals,
    pub public_inputs: Vec<Fr>,
}

impl ProofResult {
    /// The proof in submission form.
    pub fn envelope(&self) -> ProofEnvelope {
        ProofEnvelope::encode(&self.proof, &self.signals)
    }
}

/// Refuse a circuit whose witness does not satisfy its constraints.
pub fn check_witness(circuit: &WithdrawalCircuit) -> Result<(), ProveError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.clone().generate_constraints(cs.clone())?;

    if !cs.is_satisfied()? {
        let failing = cs
            .which_is_unsatisfied()?
            .unwrap_or_else(|| "unknown".to_string());
        return Err(ProveError::Unsatisfiable(failing));
    }
    Ok(())
}

/// Prove a fully assigned withdrawal circuit.
pub fn prove_circuit<R: RngCore + CryptoRng>(
    pk: &ProvingKey<Bn254>,
    circuit: WithdrawalCircuit,
    rng: &mut R,
) -> Result<ProofResult, ProveError> {
    let signals = circuit
        .public_signals()
        .ok_or(SynthesisError::AssignmentMissing)?;
    check_witness(&circuit)?;

    let proof = Groth16::<Bn254>::prove(pk, circuit, rng)?;

    Ok(ProofResult {
        proof,
        signals,
        public_inputs: signals.to_vec(),
    })
}

/// Generate a withdrawal proof with a caller-supplied RNG.
pub fn prove_withdrawal_with_rng<R: RngCore + CryptoRng>(
    pk: &ProvingKey<Bn254>,
    params: &Arc<PedersenParameters>,
    secret: &Secret,
    recipient: &Address,
    rng: &mut R,
) -> Result<ProofResult, ProveError> {
    let witness = WithdrawalWitness::from_secret(secret, recipient, params)?;
    prove_circuit(
        pk,
        WithdrawalCircuit::from_witness(&witness, params.clone()),
        rng,
    )
}

/// Generate a proof that the caller knows `secret`, bound to `recipient`.
pub fn prove_withdrawal(
    pk: &ProvingKey<Bn254>,
    params: &Arc<PedersenParameters>,
    secret: &Secret,
    recipient: &Address,
) -> Result<ProofResult, ProveError> {
    prove_withdrawal_with_rng(pk, params, secret, recipient, &mut rand::thread_rng())
}

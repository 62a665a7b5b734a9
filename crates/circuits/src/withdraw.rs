//! WithdrawalCircuit: Proves knowledge of the secret behind a commitment,
//! bound to a recipient.

use std::sync::Arc;

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, eq::EqGadget, fields::fp::FpVar};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use zeroize::Zeroize;

use crate::commitment::{create_commitment, CommitmentError, PedersenGadget, PedersenParameters};
use crate::gadgets::{enforce_nonzero, to_bounded_bytes_le};
use crate::signals::PublicSignals;
use crate::types::{Address, Commitment, Secret, SECRET_BYTES};

/// Circuit that proves: "I know a nonzero secret whose commitment is public,
/// and this proof is for this recipient"
///
/// Public inputs, in order:
/// - commitment_out: Copy of the commitment
/// - recipient_out: Copy of the recipient
/// - commitment: The commitment being withdrawn
/// - recipient: Address receiving the funds
///
/// Private witnesses:
/// - secret: The depositor's secret
///
/// The recipient is not otherwise used in the computation. Exposing it as a
/// constrained public input binds the proof to it, so a proof lifted from the
/// mempool cannot be replayed for another recipient.
///
/// The secret assignment is wiped when the circuit is dropped, including
/// after `generate_constraints` consumes it.
#[derive(Clone)]
pub struct WithdrawalCircuit {
    /// Private: Depositor's secret
    pub secret: Option<Fr>,
    /// Public: Commitment
    pub commitment: Option<Fr>,
    /// Public: Recipient address as a field element
    pub recipient: Option<Fr>,

    /// Pedersen generators
    pub params: Arc<PedersenParameters>,
}

impl WithdrawalCircuit {
    /// Create a new circuit instance for proving.
    pub fn new(secret: Fr, commitment: Fr, recipient: Fr, params: Arc<PedersenParameters>) -> Self {
        Self {
            secret: Some(secret),
            commitment: Some(commitment),
            recipient: Some(recipient),
            params,
        }
    }

    /// Create an empty circuit for setup.
    pub fn empty(params: Arc<PedersenParameters>) -> Self {
        Self {
            secret: None,
            commitment: None,
            recipient: None,
            params,
        }
    }

    pub fn from_witness(witness: &WithdrawalWitness, params: Arc<PedersenParameters>) -> Self {
        Self::new(
            witness.secret,
            witness.commitment,
            witness.recipient,
            params,
        )
    }

    /// Public signals this instance claims, if fully assigned.
    pub fn public_signals(&self) -> Option<PublicSignals> {
        Some(PublicSignals::new(self.commitment?, self.recipient?))
    }
}

impl Drop for WithdrawalCircuit {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl ConstraintSynthesizer<Fr> for WithdrawalCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // 1. Allocate public inputs
        let commitment_out_var = FpVar::new_input(cs.clone(), || {
            self.commitment.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let recipient_out_var = FpVar::new_input(cs.clone(), || {
            self.recipient.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let commitment_var = FpVar::new_input(cs.clone(), || {
            self.commitment.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let recipient_var = FpVar::new_input(cs.clone(), || {
            self.recipient.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // 2. Allocate private witness
        let secret_var = FpVar::new_witness(cs.clone(), || {
            self.secret.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // 3. Secret and recipient must be nonzero
        enforce_nonzero(cs.clone(), &secret_var)?;
        enforce_nonzero(cs.clone(), &recipient_var)?;

        // 4. Recompute the commitment from the 31-byte encoding
        let secret_bytes = to_bounded_bytes_le(&secret_var, SECRET_BYTES)?;
        let computed = PedersenGadget::new(&self.params).commit(cs.clone(), &secret_bytes)?;
        computed.enforce_equal(&commitment_var)?;

        // 5. Outputs mirror inputs
        commitment_out_var.enforce_equal(&commitment_var)?;
        recipient_out_var.enforce_equal(&recipient_var)?;

        Ok(())
    }
}

/// Fully assigned witness for one withdrawal. The secret is wiped on drop.
#[derive(Clone)]
pub struct WithdrawalWitness {
    pub commitment: Fr,
    pub recipient: Fr,
    pub secret: Fr,
}

impl WithdrawalWitness {
    /// Derive the witness for withdrawing `secret`'s deposit to `recipient`.
    pub fn from_secret(
        secret: &Secret,
        recipient: &Address,
        params: &PedersenParameters,
    ) -> Result<Self, CommitmentError> {
        let commitment = create_commitment(secret, params)?;
        Ok(Self {
            commitment: commitment.to_field(),
            recipient: recipient.to_field(),
            secret: secret.to_field(),
        })
    }

    pub fn commitment(&self) -> Commitment {
        Commitment::from_field(self.commitment)
    }

    pub fn public_signals(&self) -> PublicSignals {
        PublicSignals::new(self.commitment, self.recipient)
    }
}

impl Drop for WithdrawalWitness {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl std::fmt::Debug for WithdrawalWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WithdrawalWitness")
            .field("commitment", &self.commitment())
            .field("recipient", &self.recipient)
            .field("secret", &"<redacted>")
            .finish()
    }
}

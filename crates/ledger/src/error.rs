//! Ledger errors.

use thiserror::Error;
use zkvault_circuits::{Commitment, SignalError};
use zkvault_prover::EnvelopeError;

use crate::{Amount, CommitmentStatus};

/// Coarse classification of a ledger error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input
    Validation,
    /// Input conflicts with ledger state
    Conflict,
    /// Well-formed proof that fails verification
    Rejected,
    /// Misconfiguration or broken invariant; not retryable
    Fatal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Denomination must be nonzero")]
    ZeroDenomination,

    #[error("Invalid deposit amount: expected {expected}, got {actual}")]
    InvalidAmount { expected: Amount, actual: Amount },

    #[error("Commitment must be nonzero")]
    ZeroCommitment,

    #[error("Commitment already used: {0}")]
    CommitmentReused(Commitment),

    #[error("Malformed proof: {0}")]
    MalformedProof(EnvelopeError),

    #[error("Public signals rejected: {0}")]
    SignalMismatch(SignalError),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Unknown or already-spent commitment {commitment} ({status:?})")]
    UnknownOrSpent {
        commitment: Commitment,
        status: CommitmentStatus,
    },

    #[error("Invalid withdraw proof")]
    ProofRejected,

    #[error("Verifier error: {0}")]
    Verifier(String),

    #[error("Ledger accounting invariant violated: {0}")]
    Insolvent(String),

    #[error("Invalid ledger snapshot: {0}")]
    InvalidSnapshot(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount { .. }
            | Self::ZeroCommitment
            | Self::MalformedProof(_)
            | Self::SignalMismatch(_)
            | Self::InvalidRecipient(_) => ErrorKind::Validation,
            Self::CommitmentReused(_) | Self::UnknownOrSpent { .. } => ErrorKind::Conflict,
            Self::ProofRejected => ErrorKind::Rejected,
            Self::ZeroDenomination
            | Self::Verifier(_)
            | Self::Insolvent(_)
            | Self::InvalidSnapshot(_) => ErrorKind::Fatal,
        }
    }
}

impl From<EnvelopeError> for LedgerError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Signals(signals) => Self::SignalMismatch(signals),
            other => Self::MalformedProof(other),
        }
    }
}

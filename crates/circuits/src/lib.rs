//! ZK circuits for a single-denomination vault.
//!
//! This crate provides:
//! - `commitment`: Pedersen commitments to depositor secrets over Baby Jubjub
//! - `WithdrawalCircuit`: Prove knowledge of the secret behind a commitment,
//!   bound to a recipient
//! - `PublicSignals`: The ordered public inputs the verifier checks

pub mod commitment;
pub mod gadgets;
pub mod signals;
pub mod types;
pub mod withdraw;


pub use commitment::{commitment_params, create_commitment, CommitmentError, PedersenParameters};
pub use signals::{PublicSignals, SignalError, NUM_PUBLIC_SIGNALS};
pub use types::{Address, Commitment, ScalarError, Secret};
pub use withdraw::{WithdrawalCircuit, WithdrawalWitness};

use ark_bn254::Fr;

/// Common type aliases
pub type ConstraintF = Fr;

//! Proof generation library for the ZK vault.
//!
//! - `setup`: Groth16 trusted setup and key artifacts on disk
//! - `prove`: Fail-closed proof generation for withdrawals
//! - `verify`: Local verification helpers
//! - `envelope`: Wire format for proofs and public signals
//! - `gateway`: The verifier boundary the ledger consumes
//! - `export`: Verifying key export for external verifiers

pub mod envelope;
pub mod export;
pub mod gateway;
pub mod prove;
pub mod setup;
pub mod verify;

pub use envelope::{EnvelopeError, ProofEnvelope};
pub use gateway::{GatewayError, Groth16Gateway, VerifierGateway};
pub use prove::{prove_withdrawal, ProofResult, ProveError};
pub use setup::{CircuitKeys, SetupError};

//! Accept/reject state machine for a single-denomination ZK vault.
//!
//! A `VaultLedger` tracks which commitments have been deposited and which
//! have been spent. Each transition either applies in full or leaves the
//! ledger untouched.

pub mod amount;
pub mod error;
pub mod event;
pub mod ledger;

pub use error::{ErrorKind, LedgerError};
pub use event::{unix_now, VaultEvent};
pub use ledger::{CommitmentStatus, Credit, LedgerSnapshot, VaultLedger, VaultSummary};

/// Value in the smallest unit of account.
pub type Amount = u128;

//! Events emitted by accepted transitions. Secrets never appear here.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use zkvault_circuits::{Address, Commitment};

use crate::Amount;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VaultEvent {
    Deposit {
        commitment: Commitment,
        #[serde(with = "crate::amount")]
        amount: Amount,
        sequence: u64,
        timestamp: u64,
    },
    Withdraw {
        commitment: Commitment,
        recipient: Address,
        #[serde(with = "crate::amount")]
        amount: Amount,
        sequence: u64,
        timestamp: u64,
    },
}

impl VaultEvent {
    pub fn commitment(&self) -> &Commitment {
        match self {
            Self::Deposit { commitment, .. } | Self::Withdraw { commitment, .. } => commitment,
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            Self::Deposit { sequence, .. } | Self::Withdraw { sequence, .. } => *sequence,
        }
    }
}

/// Seconds since the unix epoch; zero if the clock is before it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

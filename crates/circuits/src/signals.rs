//! Public signals of the withdrawal circuit.
//!
//! The verifier checks signals positionally, so the order here is a wire
//! contract: `[commitment_out, recipient_out, commitment, recipient]`.

use ark_bn254::Fr;
use thiserror::Error;

use crate::types::{Address, Commitment, ScalarError};

/// Number of public signals the withdrawal circuit exposes.
pub const NUM_PUBLIC_SIGNALS: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Expected {expected} public signals, got {actual}")]
    WrongArity { expected: usize, actual: usize },
    #[error("Output signal {0} does not match its input")]
    OrderMismatch(&'static str),
}

/// Ordered public signals. Outputs always mirror inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicSignals {
    commitment: Fr,
    recipient: Fr,
}

impl PublicSignals {
    pub fn new(commitment: Fr, recipient: Fr) -> Self {
        Self {
            commitment,
            recipient,
        }
    }

    pub fn from_parts(commitment: &Commitment, recipient: &Address) -> Self {
        Self::new(commitment.to_field(), recipient.to_field())
    }

    /// Parse signals in wire order, rejecting wrong arity and any output
    /// that disagrees with its input.
    pub fn from_slice(signals: &[Fr]) -> Result<Self, SignalError> {
        let [commitment_out, recipient_out, commitment, recipient]: [Fr; NUM_PUBLIC_SIGNALS] =
            signals.try_into().map_err(|_| SignalError::WrongArity {
                expected: NUM_PUBLIC_SIGNALS,
                actual: signals.len(),
            })?;

        if commitment_out != commitment {
            return Err(SignalError::OrderMismatch("commitment"));
        }
        if recipient_out != recipient {
            return Err(SignalError::OrderMismatch("recipient"));
        }

        Ok(Self::new(commitment, recipient))
    }

    /// Signals in the order the verifying key expects them.
    pub fn to_vec(&self) -> Vec<Fr> {
        vec![
            self.commitment,
            self.recipient,
            self.commitment,
            self.recipient,
        ]
    }

    pub fn commitment(&self) -> Commitment {
        Commitment::from_field(self.commitment)
    }

    /// The recipient as an address; fails if the value is wider than 160 bits.
    pub fn recipient(&self) -> Result<Address, ScalarError> {
        Address::from_field(&self.recipient)
    }

    pub fn recipient_field(&self) -> Fr {
        self.recipient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_order() {
        let signals = PublicSignals::new(Fr::from(1u64), Fr::from(2u64));
        assert_eq!(
            signals.to_vec(),
            vec![Fr::from(1u64), Fr::from(2u64), Fr::from(1u64), Fr::from(2u64)]
        );
        assert_eq!(PublicSignals::from_slice(&signals.to_vec()), Ok(signals));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let err = PublicSignals::from_slice(&[Fr::from(1u64), Fr::from(2u64)]).unwrap_err();
        assert_eq!(
            err,
            SignalError::WrongArity {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_reordered_signals_rejected() {
        // inputs first, outputs last, with distinct values
        let reordered = [
            Fr::from(1u64),
            Fr::from(1u64),
            Fr::from(2u64),
            Fr::from(2u64),
        ];
        assert_eq!(
            PublicSignals::from_slice(&reordered),
            Err(SignalError::OrderMismatch("commitment"))
        );

        let swapped_recipient = [
            Fr::from(1u64),
            Fr::from(3u64),
            Fr::from(1u64),
            Fr::from(2u64),
        ];
        assert_eq!(
            PublicSignals::from_slice(&swapped_recipient),
            Err(SignalError::OrderMismatch("recipient"))
        );
    }

    #[test]
    fn test_recipient_width_checked() {
        use ark_ff::Field;

        let wide = Fr::from(2u64).pow([200u64]);
        let signals = PublicSignals::new(Fr::from(1u64), wide);
        assert_eq!(signals.recipient(), Err(ScalarError::AddressTooWide));
    }
}

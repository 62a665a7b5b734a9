//! VaultLedger: deposited/spent commitment sets and the value they hold.
//!
//! Invariants after every transition:
//! - `spent` is a subset of `deposited`
//! - `balance == denomination * (|deposited| - |spent|)`
//!
//! A commitment is deposited once and spent once. After that it is terminal.
//! Transitions validate and stage every arithmetic result before touching
//! state, so a rejected call is never partially applied. Callers sharing a
//! ledger serialise transitions with a lock around `&mut self`.

use std::collections::HashMap;
use std::sync::Arc;

use ark_bn254::Bn254;
use ark_groth16::Proof;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use zkvault_circuits::{Address, Commitment, PublicSignals};
use zkvault_prover::{GatewayError, ProofEnvelope, VerifierGateway};

use crate::error::LedgerError;
use crate::event::{unix_now, VaultEvent};
use crate::Amount;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentStatus {
    Unknown,
    Deposited,
    Spent,
}

/// Point-in-time view of the ledger's counters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VaultSummary {
    #[serde(with = "crate::amount")]
    pub denomination: Amount,
    #[serde(with = "crate::amount")]
    pub balance: Amount,
    pub deposits: usize,
    pub withdrawals: usize,
}

/// Total released to one recipient.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub recipient: Address,
    #[serde(with = "crate::amount")]
    pub amount: Amount,
}

/// Everything a ledger holds except its verifier, in persistable form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    #[serde(with = "crate::amount")]
    pub denomination: Amount,
    #[serde(with = "crate::amount")]
    pub balance: Amount,
    pub deposited: Vec<Commitment>,
    pub spent: Vec<Commitment>,
    pub credits: Vec<Credit>,
    pub events: Vec<VaultEvent>,
    pub next_sequence: u64,
}

#[derive(Clone)]
pub struct VaultLedger {
    denomination: Amount,
    verifier: Arc<dyn VerifierGateway>,
    deposited: IndexSet<Commitment>,
    spent: IndexSet<Commitment>,
    balance: Amount,
    credits: HashMap<Address, Amount>,
    events: Vec<VaultEvent>,
    next_sequence: u64,
}

impl VaultLedger {
    pub fn new(
        denomination: Amount,
        verifier: Arc<dyn VerifierGateway>,
    ) -> Result<Self, LedgerError> {
        if denomination == 0 {
            return Err(LedgerError::ZeroDenomination);
        }
        Ok(Self {
            denomination,
            verifier,
            deposited: IndexSet::new(),
            spent: IndexSet::new(),
            balance: 0,
            credits: HashMap::new(),
            events: Vec::new(),
            next_sequence: 0,
        })
    }

    /// Rebuild a ledger from a snapshot, refusing any snapshot that breaks
    /// the accounting invariants or the event numbering.
    pub fn restore(
        snapshot: LedgerSnapshot,
        verifier: Arc<dyn VerifierGateway>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(snapshot.denomination, verifier)?;

        let deposited: IndexSet<Commitment> = snapshot.deposited.iter().copied().collect();
        if deposited.len() != snapshot.deposited.len() {
            return Err(LedgerError::InvalidSnapshot(
                "duplicate deposited commitment".into(),
            ));
        }
        let spent: IndexSet<Commitment> = snapshot.spent.iter().copied().collect();
        if spent.len() != snapshot.spent.len() {
            return Err(LedgerError::InvalidSnapshot(
                "duplicate spent commitment".into(),
            ));
        }

        let mut credits = HashMap::with_capacity(snapshot.credits.len());
        for credit in &snapshot.credits {
            if credits.insert(credit.recipient, credit.amount).is_some() {
                return Err(LedgerError::InvalidSnapshot(format!(
                    "duplicate credit for {}",
                    credit.recipient
                )));
            }
        }

        if snapshot.events.len() != deposited.len() + spent.len() {
            return Err(LedgerError::InvalidSnapshot(format!(
                "{} events for {} deposits and {} withdrawals",
                snapshot.events.len(),
                deposited.len(),
                spent.len()
            )));
        }
        let numbered = snapshot
            .events
            .iter()
            .enumerate()
            .all(|(i, event)| event.sequence() == i as u64);
        if !numbered || snapshot.next_sequence != snapshot.events.len() as u64 {
            return Err(LedgerError::InvalidSnapshot(
                "event sequence is not contiguous".into(),
            ));
        }

        ledger.deposited = deposited;
        ledger.spent = spent;
        ledger.balance = snapshot.balance;
        ledger.credits = credits;
        ledger.events = snapshot.events;
        ledger.next_sequence = snapshot.next_sequence;

        ledger
            .check_invariants()
            .map_err(|e| LedgerError::InvalidSnapshot(e.to_string()))?;
        Ok(ledger)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut credits: Vec<Credit> = self
            .credits
            .iter()
            .map(|(recipient, amount)| Credit {
                recipient: *recipient,
                amount: *amount,
            })
            .collect();
        credits.sort_by_key(|credit| credit.recipient);

        LedgerSnapshot {
            denomination: self.denomination,
            balance: self.balance,
            deposited: self.deposited.iter().copied().collect(),
            spent: self.spent.iter().copied().collect(),
            credits,
            events: self.events.clone(),
            next_sequence: self.next_sequence,
        }
    }

    pub fn denomination(&self) -> Amount {
        self.denomination
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn deposit_count(&self) -> usize {
        self.deposited.len()
    }

    pub fn withdrawal_count(&self) -> usize {
        self.spent.len()
    }

    pub fn is_deposited(&self, commitment: &Commitment) -> bool {
        self.deposited.contains(commitment)
    }

    pub fn is_spent(&self, commitment: &Commitment) -> bool {
        self.spent.contains(commitment)
    }

    pub fn status(&self, commitment: &Commitment) -> CommitmentStatus {
        if self.spent.contains(commitment) {
            CommitmentStatus::Spent
        } else if self.deposited.contains(commitment) {
            CommitmentStatus::Deposited
        } else {
            CommitmentStatus::Unknown
        }
    }

    /// Total value released to `recipient` so far.
    pub fn credited(&self, recipient: &Address) -> Amount {
        self.credits.get(recipient).copied().unwrap_or(0)
    }

    /// Events in the order they were emitted.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    pub fn summary(&self) -> VaultSummary {
        VaultSummary {
            denomination: self.denomination,
            balance: self.balance,
            deposits: self.deposit_count(),
            withdrawals: self.withdrawal_count(),
        }
    }

    /// Accept a deposit of exactly one denomination under `commitment`.
    pub fn deposit(
        &mut self,
        commitment: Commitment,
        value: Amount,
    ) -> Result<VaultEvent, LedgerError> {
        let result = self.apply_deposit(commitment, value);
        match &result {
            Ok(event) => tracing::info!(
                %commitment,
                sequence = event.sequence(),
                "deposit accepted"
            ),
            Err(err) => tracing::warn!(%commitment, reason = %err, "deposit rejected"),
        }
        result
    }

    fn apply_deposit(
        &mut self,
        commitment: Commitment,
        value: Amount,
    ) -> Result<VaultEvent, LedgerError> {
        if value != self.denomination {
            return Err(LedgerError::InvalidAmount {
                expected: self.denomination,
                actual: value,
            });
        }
        if commitment.is_zero() {
            return Err(LedgerError::ZeroCommitment);
        }
        if self.deposited.contains(&commitment) {
            return Err(LedgerError::CommitmentReused(commitment));
        }

        let balance = self
            .balance
            .checked_add(value)
            .ok_or_else(|| LedgerError::Insolvent("balance overflow".into()))?;
        let sequence = self.stage_sequence()?;

        let event = VaultEvent::Deposit {
            commitment,
            amount: value,
            sequence,
            timestamp: unix_now(),
        };

        self.deposited.insert(commitment);
        self.balance = balance;
        self.commit_event(event.clone());
        Ok(event)
    }

    /// Withdraw one denomination to the recipient named in the envelope.
    pub fn withdraw(&mut self, envelope: &ProofEnvelope) -> Result<VaultEvent, LedgerError> {
        let result = envelope
            .decode()
            .map_err(LedgerError::from)
            .and_then(|(proof, signals)| self.apply_withdraw(&proof, &signals));
        log_withdraw(&result);
        result
    }

    /// Withdraw with an already decoded proof.
    pub fn withdraw_decoded(
        &mut self,
        proof: &Proof<Bn254>,
        signals: &PublicSignals,
    ) -> Result<VaultEvent, LedgerError> {
        let result = self.apply_withdraw(proof, signals);
        log_withdraw(&result);
        result
    }

    fn apply_withdraw(
        &mut self,
        proof: &Proof<Bn254>,
        signals: &PublicSignals,
    ) -> Result<VaultEvent, LedgerError> {
        let commitment = signals.commitment();
        let recipient = signals
            .recipient()
            .map_err(|e| LedgerError::InvalidRecipient(e.to_string()))?;
        if recipient.is_zero() {
            return Err(LedgerError::InvalidRecipient(
                "recipient must be nonzero".into(),
            ));
        }

        let status = self.status(&commitment);
        if status != CommitmentStatus::Deposited {
            return Err(LedgerError::UnknownOrSpent { commitment, status });
        }

        match self.verifier.verify(proof, signals) {
            Ok(true) => {}
            Ok(false) => return Err(LedgerError::ProofRejected),
            Err(GatewayError::Malformed(err)) => return Err(err.into()),
            Err(GatewayError::Configuration(msg)) => return Err(LedgerError::Verifier(msg)),
        }

        let balance = self
            .balance
            .checked_sub(self.denomination)
            .ok_or_else(|| LedgerError::Insolvent("balance below one denomination".into()))?;
        let credit = self
            .credited(&recipient)
            .checked_add(self.denomination)
            .ok_or_else(|| LedgerError::Insolvent("recipient credit overflow".into()))?;
        let sequence = self.stage_sequence()?;

        let event = VaultEvent::Withdraw {
            commitment,
            recipient,
            amount: self.denomination,
            sequence,
            timestamp: unix_now(),
        };

        self.spent.insert(commitment);
        self.balance = balance;
        self.credits.insert(recipient, credit);
        self.commit_event(event.clone());
        Ok(event)
    }

    fn stage_sequence(&self) -> Result<u64, LedgerError> {
        if self.next_sequence == u64::MAX {
            return Err(LedgerError::Insolvent("event sequence exhausted".into()));
        }
        Ok(self.next_sequence)
    }

    fn commit_event(&mut self, event: VaultEvent) {
        self.next_sequence = event.sequence() + 1;
        self.events.push(event);
    }

    /// Check the accounting invariants.
    pub fn check_invariants(&self) -> Result<(), LedgerError> {
        if let Some(orphan) = self.spent.iter().find(|c| !self.deposited.contains(*c)) {
            return Err(LedgerError::Insolvent(format!(
                "spent commitment {orphan} was never deposited"
            )));
        }

        let outstanding = (self.deposited.len() - self.spent.len()) as Amount;
        let expected = self
            .denomination
            .checked_mul(outstanding)
            .ok_or_else(|| LedgerError::Insolvent("expected balance overflows".into()))?;
        if self.balance != expected {
            return Err(LedgerError::Insolvent(format!(
                "balance {} != {} * {outstanding}",
                self.balance, self.denomination
            )));
        }

        let released = self
            .credits
            .values()
            .try_fold(0 as Amount, |total, credit| total.checked_add(*credit))
            .ok_or_else(|| LedgerError::Insolvent("credit total overflows".into()))?;
        let withdrawn = self
            .denomination
            .checked_mul(self.spent.len() as Amount)
            .ok_or_else(|| LedgerError::Insolvent("withdrawn total overflows".into()))?;
        if released != withdrawn {
            return Err(LedgerError::Insolvent(format!(
                "released {released} != withdrawn {withdrawn}"
            )));
        }
        Ok(())
    }
}

fn log_withdraw(result: &Result<VaultEvent, LedgerError>) {
    match result {
        Ok(VaultEvent::Withdraw {
            commitment,
            recipient,
            sequence,
            ..
        }) => tracing::info!(%commitment, %recipient, sequence, "withdrawal accepted"),
        Ok(_) => {}
        Err(err) => tracing::warn!(kind = ?err.kind(), reason = %err, "withdrawal rejected"),
    }
}

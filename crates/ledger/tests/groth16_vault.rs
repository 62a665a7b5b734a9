//! Full deposit/withdraw flow against real Groth16 keys.

use std::sync::Arc;

use ark_std::rand::{rngs::StdRng, SeedableRng};
use zkvault_circuits::types::field_to_decimal;
use zkvault_circuits::{commitment_params, create_commitment, Address, Secret};
use zkvault_ledger::{CommitmentStatus, ErrorKind, LedgerError, VaultLedger};
use zkvault_prover::prove::prove_withdrawal_with_rng;
use zkvault_prover::setup::{setup_withdrawal, CircuitKeys};
use zkvault_prover::Groth16Gateway;

const DENOMINATION: u128 = 100_000_000_000_000_000;

fn setup(seed: u64) -> (CircuitKeys, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let keys = setup_withdrawal(&mut rng, Arc::new(commitment_params())).unwrap();
    (keys, rng)
}

fn vault(keys: &CircuitKeys) -> VaultLedger {
    let gateway = Groth16Gateway::new(&keys.verifying_key).unwrap();
    VaultLedger::new(DENOMINATION, Arc::new(gateway)).unwrap()
}

#[test]
fn test_deposit_then_withdraw() {
    let (keys, mut rng) = setup(42);
    let mut ledger = vault(&keys);

    let secret = Secret::from_u64(1234).unwrap();
    let recipient = Address::from_u64(5678);
    let commitment = create_commitment(&secret, &keys.params).unwrap();

    ledger.deposit(commitment, DENOMINATION).unwrap();

    let proof =
        prove_withdrawal_with_rng(&keys.proving_key, &keys.params, &secret, &recipient, &mut rng)
            .unwrap();
    ledger.withdraw(&proof.envelope()).unwrap();

    assert_eq!(ledger.status(&commitment), CommitmentStatus::Spent);
    assert_eq!(ledger.credited(&recipient), DENOMINATION);
    assert_eq!(ledger.balance(), 0);
    ledger.check_invariants().unwrap();

    // A freshly generated valid proof cannot spend it again
    let again =
        prove_withdrawal_with_rng(&keys.proving_key, &keys.params, &secret, &recipient, &mut rng)
            .unwrap();
    let err = ledger.withdraw(&again.envelope()).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::UnknownOrSpent {
            status: CommitmentStatus::Spent,
            ..
        }
    ));
}

#[test]
fn test_front_run_with_other_recipient_rejected() {
    let (keys, mut rng) = setup(43);
    let mut ledger = vault(&keys);

    let secret = Secret::from_u64(1234).unwrap();
    let recipient = Address::from_u64(5678);
    let thief = Address::from_u64(6666);
    let commitment = create_commitment(&secret, &keys.params).unwrap();
    ledger.deposit(commitment, DENOMINATION).unwrap();

    let proof =
        prove_withdrawal_with_rng(&keys.proving_key, &keys.params, &secret, &recipient, &mut rng)
            .unwrap();

    // Lift the proof and rewrite both recipient signals
    let mut stolen = proof.envelope();
    let thief_signal = field_to_decimal(&thief.to_field());
    stolen.public_signals[1] = thief_signal.clone();
    stolen.public_signals[3] = thief_signal;

    let err = ledger.withdraw(&stolen).unwrap_err();
    assert_eq!(err, LedgerError::ProofRejected);
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(ledger.status(&commitment), CommitmentStatus::Deposited);
    assert_eq!(ledger.credited(&thief), 0);

    // The honest withdrawal still goes through
    ledger.withdraw(&proof.envelope()).unwrap();
    assert_eq!(ledger.credited(&recipient), DENOMINATION);
}

#[test]
fn test_proof_from_other_ceremony_rejected() {
    let (keys, _) = setup(44);
    let (foreign, mut rng) = setup(45);
    let mut ledger = vault(&keys);

    let secret = Secret::from_u64(1234).unwrap();
    let commitment = create_commitment(&secret, &keys.params).unwrap();
    ledger.deposit(commitment, DENOMINATION).unwrap();

    let proof = prove_withdrawal_with_rng(
        &foreign.proving_key,
        &foreign.params,
        &secret,
        &Address::from_u64(5678),
        &mut rng,
    )
    .unwrap();

    assert_eq!(
        ledger.withdraw(&proof.envelope()),
        Err(LedgerError::ProofRejected)
    );
    ledger.check_invariants().unwrap();
}

#[test]
fn test_many_deposits_partial_withdrawals() {
    let (keys, mut rng) = setup(46);
    let mut ledger = vault(&keys);

    let secrets: Vec<Secret> = (0..4).map(|_| Secret::random(&mut rng)).collect();
    for secret in &secrets {
        let commitment = create_commitment(secret, &keys.params).unwrap();
        ledger.deposit(commitment, DENOMINATION).unwrap();
    }

    for (i, secret) in secrets.iter().take(2).enumerate() {
        let recipient = Address::from_u64(1000 + i as u64);
        let proof =
            prove_withdrawal_with_rng(&keys.proving_key, &keys.params, secret, &recipient, &mut rng)
                .unwrap();
        ledger.withdraw(&proof.envelope()).unwrap();
    }

    assert_eq!(ledger.balance(), DENOMINATION * 2);
    assert_eq!(ledger.deposit_count(), 4);
    assert_eq!(ledger.withdrawal_count(), 2);
    ledger.check_invariants().unwrap();
}

//! Pedersen commitment scheme over Baby Jubjub.
//!
//! `Commit(secret) = x(PedersenHash(le_bytes_31(secret)))`. The hash runs over
//! the twisted Edwards curve embedded in BN254's scalar field, so the same
//! computation is cheap to re-execute inside the withdrawal circuit.

use ark_bn254::Fr;
use ark_crypto_primitives::crh::{
    pedersen::{
        self,
        constraints::{CRHGadget, CRHParametersVar},
        Window,
    },
    CRHScheme, CRHSchemeGadget,
};
use ark_ec::{twisted_edwards::TECurveConfig, AffineRepr, Group};
use ark_ed_on_bn254::{constraints::EdwardsVar, EdwardsAffine, EdwardsConfig, EdwardsProjective, Fq};
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use ark_r1cs_std::{alloc::AllocVar, bits::uint8::UInt8, fields::fp::FpVar};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

use crate::types::{Commitment, Secret, SECRET_BYTES};

/// Domain separator for deriving window generators.
pub const GENERATOR_DOMAIN: &[u8] = b"zkvault.pedersen.generator";

/// 4 windows of 62 bits cover exactly the 248-bit secret encoding.
#[derive(Clone)]
pub struct CommitmentWindow;

impl Window for CommitmentWindow {
    const WINDOW_SIZE: usize = 62;
    const NUM_WINDOWS: usize = 4;
}

pub type PedersenHash = pedersen::CRH<EdwardsProjective, CommitmentWindow>;
pub type PedersenParameters = pedersen::Parameters<EdwardsProjective>;
pub type PedersenHashGadget = CRHGadget<EdwardsProjective, EdwardsVar, CommitmentWindow>;

/// Errors from the off-circuit commitment computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("Input is {len} bytes, at most {max} can be committed")]
    InputTooLong { len: usize, max: usize },
    #[error("Pedersen hash failed: {0}")]
    Hash(String),
}

/// Deterministic Pedersen parameters.
///
/// Each window base is the first point found by hashing
/// `GENERATOR_DOMAIN || window || counter` to a y-coordinate, recovering the
/// smaller of the two x-coordinates and clearing the cofactor. Window powers
/// are successive doublings of the base.
pub fn commitment_params() -> PedersenParameters {
    let generators = (0..CommitmentWindow::NUM_WINDOWS)
        .map(|window| {
            let mut base = window_base(window as u32);
            let mut powers = Vec::with_capacity(CommitmentWindow::WINDOW_SIZE);
            for _ in 0..CommitmentWindow::WINDOW_SIZE {
                powers.push(base);
                base.double_in_place();
            }
            powers
        })
        .collect();

    PedersenParameters { generators }
}

fn window_base(window: u32) -> EdwardsProjective {
    let mut counter = 0u32;
    loop {
        let digest = Sha256::new()
            .chain_update(GENERATOR_DOMAIN)
            .chain_update(window.to_le_bytes())
            .chain_update(counter.to_le_bytes())
            .finalize();
        if let Some(point) = point_from_y(Fq::from_le_bytes_mod_order(&digest)) {
            return point;
        }
        counter += 1;
    }
}

/// Lift a y-coordinate to a prime-order point, if one exists.
fn point_from_y(y: Fq) -> Option<EdwardsProjective> {
    // a*x^2 + y^2 = 1 + d*x^2*y^2  =>  x^2 = (1 - y^2) / (a - d*y^2)
    let y2 = y.square();
    let denominator = EdwardsConfig::COEFF_A - EdwardsConfig::COEFF_D * y2;
    let x = ((Fq::one() - y2) * denominator.inverse()?).sqrt()?;
    let neg_x = -x;
    let x = if x.into_bigint() <= neg_x.into_bigint() {
        x
    } else {
        neg_x
    };

    // cofactor is 8
    let point = EdwardsAffine::new_unchecked(x, y)
        .into_group()
        .double()
        .double()
        .double();
    (!point.is_zero()).then_some(point)
}

/// Encode a field element as the fixed 31-byte little-endian hash input.
pub fn encode_scalar(value: &Fr) -> Result<[u8; SECRET_BYTES], CommitmentError> {
    let le = value.into_bigint().to_bytes_le();
    let (head, tail) = le.split_at(SECRET_BYTES);
    if tail.iter().any(|b| *b != 0) {
        return Err(CommitmentError::InputTooLong {
            len: (value.into_bigint().num_bits() as usize + 7) / 8,
            max: SECRET_BYTES,
        });
    }
    let mut bytes = [0u8; SECRET_BYTES];
    bytes.copy_from_slice(head);
    Ok(bytes)
}

/// Hash up to 31 bytes and return the x-coordinate of the resulting point.
pub fn commit_bytes(input: &[u8], params: &PedersenParameters) -> Result<Fr, CommitmentError> {
    if input.len() > SECRET_BYTES {
        return Err(CommitmentError::InputTooLong {
            len: input.len(),
            max: SECRET_BYTES,
        });
    }
    let point =
        PedersenHash::evaluate(params, input).map_err(|e| CommitmentError::Hash(e.to_string()))?;
    Ok(point.x)
}

/// Commit to a raw field element. Does not enforce the nonzero rule, so the
/// circuit tests can build commitments for degenerate witnesses.
pub fn commit_scalar(value: &Fr, params: &PedersenParameters) -> Result<Fr, CommitmentError> {
    commit_bytes(&encode_scalar(value)?, params)
}

/// Create the public commitment for a depositor's secret.
pub fn create_commitment(
    secret: &Secret,
    params: &PedersenParameters,
) -> Result<Commitment, CommitmentError> {
    let mut encoded = secret.to_bytes();
    let result = commit_bytes(&encoded, params).map(Commitment::from_field);
    encoded.zeroize();
    result
}

/// Pedersen gadget for in-circuit commitment computation.
pub struct PedersenGadget<'a> {
    params: &'a PedersenParameters,
}

impl<'a> PedersenGadget<'a> {
    pub fn new(params: &'a PedersenParameters) -> Self {
        Self { params }
    }

    /// Compute the commitment in-circuit from the encoded input bytes.
    pub fn commit(
        &self,
        cs: ConstraintSystemRef<Fr>,
        input: &[UInt8<Fr>],
    ) -> Result<FpVar<Fr>, SynthesisError> {
        let params =
            CRHParametersVar::<EdwardsProjective, EdwardsVar>::new_constant(cs, self.params)?;
        let point = PedersenHashGadget::evaluate(&params, input)?;
        Ok(point.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::CurveGroup;
    use ark_r1cs_std::{eq::EqGadget, R1CSVar};
    use ark_relations::r1cs::ConstraintSystem;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    /// `Commit(1234)` under the parameters above.
    const COMMIT_1234: &str =
        "10956357744062117451436895212862587791170695939169496420311253634007223245719";

    #[test]
    fn test_commitment_deterministic() {
        let params = commitment_params();
        let secret = Secret::from_u64(1234).unwrap();

        let commitment1 = create_commitment(&secret, &params).unwrap();
        let commitment2 = create_commitment(&secret, &commitment_params()).unwrap();

        assert_eq!(commitment1, commitment2);
    }

    #[test]
    fn test_recorded_commitment_vector() {
        let params = commitment_params();
        let secret = Secret::from_u64(1234).unwrap();
        let commitment = create_commitment(&secret, &params).unwrap();

        assert_eq!(commitment.to_decimal_string(), COMMIT_1234);
    }

    #[test]
    fn test_generators_are_in_prime_subgroup() {
        let params = commitment_params();
        assert_eq!(params.generators.len(), CommitmentWindow::NUM_WINDOWS);
        for powers in &params.generators {
            assert_eq!(powers.len(), CommitmentWindow::WINDOW_SIZE);
            let base = powers[0].into_affine();
            assert!(base.is_on_curve());
            assert!(base.is_in_correct_subgroup_assuming_on_curve());
        }
    }

    #[test]
    fn test_different_secrets_different_commitments() {
        let params = commitment_params();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..256 {
            let secret = Secret::random(&mut rng);
            let commitment = create_commitment(&secret, &params).unwrap();
            assert!(seen.insert(commitment), "commitment collision");
        }
    }

    #[test]
    fn test_input_too_long_rejected() {
        let params = commitment_params();
        let err = commit_bytes(&[1u8; SECRET_BYTES + 1], &params).unwrap_err();
        assert_eq!(
            err,
            CommitmentError::InputTooLong {
                len: SECRET_BYTES + 1,
                max: SECRET_BYTES
            }
        );

        let wide = Fr::from(2u64).pow([250u64]);
        assert!(matches!(
            encode_scalar(&wide),
            Err(CommitmentError::InputTooLong { .. })
        ));
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let params = commitment_params();
        let short = commit_bytes(&[0xd2, 0x04], &params).unwrap();
        let full = commit_scalar(&Fr::from(1234u64), &params).unwrap();
        assert_eq!(short, full);
    }

    #[test]
    fn test_zero_scalar_commits_to_identity() {
        let params = commitment_params();
        assert_eq!(commit_scalar(&Fr::from(0u64), &params).unwrap(), Fr::from(0u64));
    }

    #[test]
    fn test_in_circuit_commitment() {
        let params = commitment_params();
        let secret = Secret::from_u64(1234).unwrap();

        // Compute out-of-circuit
        let expected = create_commitment(&secret, &params).unwrap();

        // Compute in-circuit
        let cs = ConstraintSystem::<Fr>::new_ref();
        let bytes = UInt8::new_witness_vec(cs.clone(), &secret.to_bytes()).unwrap();
        let computed = PedersenGadget::new(&params)
            .commit(cs.clone(), &bytes)
            .unwrap();

        // Verify they match
        let expected_var = FpVar::new_input(cs.clone(), || Ok(expected.to_field())).unwrap();
        computed.enforce_equal(&expected_var).unwrap();

        assert_eq!(computed.value().unwrap(), expected.to_field());
        assert!(cs.is_satisfied().unwrap());
    }
}

//! Proof envelope: a Groth16 proof plus its public signals in the decimal
//! JSON shape an EVM verifier consumes.
//!
//! G2 coordinates are written as `[c1, c0]`, the order the precompile-based
//! verifier expects. Decoding is strict: every number must be a canonical
//! field element, every point must be on its curve and in the prime-order
//! subgroup, and the signals must have the exact arity and order of the
//! withdrawal circuit.

use ark_bn254::{Bn254, Fq, Fq2, G1Affine, G2Affine};
use ark_ec::short_weierstrass::{Affine, SWCurveConfig};
use ark_ec::AffineRepr;
use ark_ff::{PrimeField, Zero};
use ark_groth16::Proof;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkvault_circuits::types::{field_to_decimal, parse_field};
use zkvault_circuits::{PublicSignals, ScalarError, SignalError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Invalid number in {field}: {source}")]
    Scalar {
        field: &'static str,
        source: ScalarError,
    },
    #[error("Point {0} is not on the curve")]
    NotOnCurve(&'static str),
    #[error("Point {0} is not in the prime-order subgroup")]
    NotInSubgroup(&'static str),
    #[error(transparent)]
    Signals(#[from] SignalError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofEnvelope {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
    pub public_signals: Vec<String>,
}

impl ProofEnvelope {
    pub fn encode(proof: &Proof<Bn254>, signals: &PublicSignals) -> Self {
        Self {
            a: encode_g1(&proof.a),
            b: encode_g2(&proof.b),
            c: encode_g1(&proof.c),
            public_signals: signals.to_vec().iter().map(field_to_decimal).collect(),
        }
    }

    /// Decode and validate the proof and its signals.
    pub fn decode(&self) -> Result<(Proof<Bn254>, PublicSignals), EnvelopeError> {
        let proof = self.decode_proof()?;
        let signals = self.decode_signals()?;
        Ok((proof, signals))
    }

    pub fn decode_proof(&self) -> Result<Proof<Bn254>, EnvelopeError> {
        Ok(Proof {
            a: decode_g1("a", &self.a)?,
            b: decode_g2("b", &self.b)?,
            c: decode_g1("c", &self.c)?,
        })
    }

    pub fn decode_signals(&self) -> Result<PublicSignals, EnvelopeError> {
        let values = self
            .public_signals
            .iter()
            .map(|s| scalar("publicSignals", s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PublicSignals::from_slice(&values)?)
    }
}

fn scalar<F: PrimeField>(field: &'static str, value: &str) -> Result<F, EnvelopeError> {
    parse_field(value).map_err(|source| EnvelopeError::Scalar { field, source })
}

// The point at infinity travels as (0, 0).
fn encode_g1(point: &G1Affine) -> [String; 2] {
    match point.xy() {
        Some((x, y)) => [field_to_decimal(x), field_to_decimal(y)],
        None => ["0".into(), "0".into()],
    }
}

fn encode_g2(point: &G2Affine) -> [[String; 2]; 2] {
    match point.xy() {
        Some((x, y)) => [
            [field_to_decimal(&x.c1), field_to_decimal(&x.c0)],
            [field_to_decimal(&y.c1), field_to_decimal(&y.c0)],
        ],
        None => [["0".into(), "0".into()], ["0".into(), "0".into()]],
    }
}

fn decode_g1(name: &'static str, coords: &[String; 2]) -> Result<G1Affine, EnvelopeError> {
    let x: Fq = scalar(name, &coords[0])?;
    let y: Fq = scalar(name, &coords[1])?;
    if x.is_zero() && y.is_zero() {
        return Ok(G1Affine::identity());
    }
    check_point(name, G1Affine::new_unchecked(x, y))
}

fn decode_g2(name: &'static str, coords: &[[String; 2]; 2]) -> Result<G2Affine, EnvelopeError> {
    let x = Fq2::new(scalar(name, &coords[0][1])?, scalar(name, &coords[0][0])?);
    let y = Fq2::new(scalar(name, &coords[1][1])?, scalar(name, &coords[1][0])?);
    if x.is_zero() && y.is_zero() {
        return Ok(G2Affine::identity());
    }
    check_point(name, G2Affine::new_unchecked(x, y))
}

fn check_point<P: SWCurveConfig>(
    name: &'static str,
    point: Affine<P>,
) -> Result<Affine<P>, EnvelopeError> {
    if !point.is_on_curve() {
        return Err(EnvelopeError::NotOnCurve(name));
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(EnvelopeError::NotInSubgroup(name));
    }
    Ok(point)
}

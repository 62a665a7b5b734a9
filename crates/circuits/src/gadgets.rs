//! Small constraint gadgets used by the withdrawal circuit.
//!
//! In a prime field every value is invertible except zero, and every value
//! below the modulus has a unique bit decomposition. These gadgets lean on
//! both facts: nonzero-ness is shown by exhibiting an inverse, and byte
//! encodings are derived from a strict decomposition with the high bits
//! pinned to zero.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Enforce that a field element fits in `num_bits` bits.
///
/// Decomposes the value into its canonical little-endian bits and pins every
/// bit at or above `num_bits` to zero. Returns the low `num_bits` bits.
pub fn enforce_range<F: PrimeField>(
    value: &FpVar<F>,
    num_bits: usize,
) -> Result<Vec<Boolean<F>>, SynthesisError> {
    let mut bits = value.to_bits_le()?;
    let high = bits.split_off(num_bits.min(bits.len()));

    for bit in &high {
        bit.enforce_equal(&Boolean::FALSE)?;
    }

    Ok(bits)
}

/// Enforce `value != 0` by witnessing its multiplicative inverse.
///
/// For zero no inverse exists; the witness falls back to zero and the
/// constraint `value * inverse == 1` is left unsatisfied.
pub fn enforce_nonzero<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    value: &FpVar<F>,
) -> Result<(), SynthesisError> {
    let inverse = FpVar::new_witness(cs, || {
        value.value().map(|v| v.inverse().unwrap_or_else(F::zero))
    })?;
    value.mul_equals(&inverse, &FpVar::one())
}

/// Little-endian bytes of a value that must fit in `num_bytes` bytes.
pub fn to_bounded_bytes_le<F: PrimeField>(
    value: &FpVar<F>,
    num_bytes: usize,
) -> Result<Vec<UInt8<F>>, SynthesisError> {
    let bits = enforce_range(value, num_bytes * 8)?;
    Ok(bits.chunks(8).map(UInt8::from_bits_le).collect())
}

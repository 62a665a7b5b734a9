//! Verifying key export in snarkjs `verification_key.json` format.
//!
//! External tooling (Solidity verifier generators, snarkjs itself) reads this
//! shape. Points are projective triples of decimal strings with `z = 1`, and
//! G2 coordinates keep snarkjs' native `[c0, c1]` order.

use ark_bn254::{Bn254, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_groth16::VerifyingKey;
use serde_json::{json, Value};
use zkvault_circuits::types::field_to_decimal;

fn g1_json(point: &G1Affine) -> Value {
    match point.xy() {
        Some((x, y)) => json!([field_to_decimal(x), field_to_decimal(y), "1"]),
        None => json!(["0", "1", "0"]),
    }
}

fn g2_json(point: &G2Affine) -> Value {
    match point.xy() {
        Some((x, y)) => json!([
            [field_to_decimal(&x.c0), field_to_decimal(&x.c1)],
            [field_to_decimal(&y.c0), field_to_decimal(&y.c1)],
            ["1", "0"]
        ]),
        None => json!([["0", "0"], ["1", "0"], ["0", "0"]]),
    }
}

/// Render `vk` as snarkjs-compatible JSON.
pub fn export_verifying_key_json(vk: &VerifyingKey<Bn254>) -> Value {
    json!({
        "protocol": "groth16",
        "curve": "bn128",
        "nPublic": vk.gamma_abc_g1.len().saturating_sub(1),
        "vk_alpha_1": g1_json(&vk.alpha_g1),
        "vk_beta_2": g2_json(&vk.beta_g2),
        "vk_gamma_2": g2_json(&vk.gamma_g2),
        "vk_delta_2": g2_json(&vk.delta_g2),
        "IC": vk.gamma_abc_g1.iter().map(g1_json).collect::<Vec<_>>(),
    })
}

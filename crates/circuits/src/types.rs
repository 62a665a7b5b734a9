//! Field-scalar value types: secrets, commitments and recipient addresses.
//!
//! All of these are elements of the BN254 scalar field. They are never
//! handled as machine integers; parsing goes through `BigUint` with an
//! explicit range check against the modulus so nothing is silently reduced.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::BigUint;
use num_traits::Num;
use rand::{CryptoRng, RngCore};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Width of an encoded secret in bytes (248 bits, below the field capacity).
pub const SECRET_BYTES: usize = 31;

/// Width of a recipient address in bytes.
pub const ADDRESS_BYTES: usize = 20;

/// Errors raised while constructing or parsing scalar values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScalarError {
    #[error("Secret must be nonzero")]
    ZeroSecret,
    #[error("Secret does not fit in {SECRET_BYTES} bytes")]
    SecretTooWide,
    #[error("Value is not below the field modulus")]
    NonCanonical,
    #[error("Address does not fit in {ADDRESS_BYTES} bytes")]
    AddressTooWide,
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),
}

/// Parse a decimal or `0x`-prefixed hex string into an unsigned integer.
pub fn parse_biguint(input: &str) -> Result<BigUint, ScalarError> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(digits) => BigUint::from_str_radix(digits, 16),
        None => BigUint::from_str_radix(trimmed, 10),
    };
    parsed.map_err(|_| ScalarError::InvalidNumber(input.to_string()))
}

/// Convert an integer into a field element, rejecting values `>= modulus`.
pub fn field_from_biguint<F: PrimeField>(value: &BigUint) -> Result<F, ScalarError> {
    let modulus = BigUint::from_bytes_le(&F::MODULUS.to_bytes_le());
    if value >= &modulus {
        return Err(ScalarError::NonCanonical);
    }
    Ok(F::from_le_bytes_mod_order(&value.to_bytes_le()))
}

/// Parse a canonical field element from decimal or hex.
pub fn parse_field<F: PrimeField>(input: &str) -> Result<F, ScalarError> {
    field_from_biguint(&parse_biguint(input)?)
}

/// Canonical integer value of a field element.
pub fn field_to_biguint<F: PrimeField>(value: &F) -> BigUint {
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le())
}

/// Decimal rendering used by proof envelopes and the CLI.
pub fn field_to_decimal<F: PrimeField>(value: &F) -> String {
    field_to_biguint(value).to_str_radix(10)
}

/// The depositor's secret. Nonzero and at most 248 bits wide.
///
/// Not `Copy`; every owned instance is wiped when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Fr);

impl Secret {
    /// Wrap a field element, enforcing the nonzero and width invariants.
    pub fn new(value: Fr) -> Result<Self, ScalarError> {
        if value.is_zero() {
            return Err(ScalarError::ZeroSecret);
        }
        if value.into_bigint().num_bits() as usize > SECRET_BYTES * 8 {
            return Err(ScalarError::SecretTooWide);
        }
        Ok(Self(value))
    }

    pub fn from_u64(value: u64) -> Result<Self, ScalarError> {
        Self::new(Fr::from(value))
    }

    /// Sample a secret from 31 bytes of entropy.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let mut bytes = [0u8; SECRET_BYTES];
            rng.fill_bytes(&mut bytes);
            let candidate = Self::new(Fr::from_le_bytes_mod_order(&bytes));
            bytes.zeroize();
            if let Ok(secret) = candidate {
                return secret;
            }
        }
    }

    pub fn to_field(&self) -> Fr {
        self.0
    }

    /// Fixed-length little-endian encoding fed to the commitment hash.
    pub fn to_bytes(&self) -> [u8; SECRET_BYTES] {
        let mut bytes = [0u8; SECRET_BYTES];
        let le = self.0.into_bigint().to_bytes_le();
        bytes.copy_from_slice(&le[..SECRET_BYTES]);
        bytes
    }

    /// Decimal form, for handing the secret back to its owner.
    pub fn to_decimal_string(&self) -> String {
        field_to_decimal(&self.0)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl FromStr for Secret {
    type Err = ScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_field(s)?)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Public commitment to a secret. Identifies a deposit and marks it spent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Commitment(Fr);

impl Commitment {
    pub fn from_field(value: Fr) -> Self {
        Self(value)
    }

    pub fn to_field(&self) -> Fr {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// 32-byte big-endian encoding.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.0.into_bigint().to_bytes_be());
        bytes
    }

    pub fn to_decimal_string(&self) -> String {
        field_to_decimal(&self.0)
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes_be()))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({self})")
    }
}

impl FromStr for Commitment {
    type Err = ScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_field(s).map(Self)
    }
}

/// Recipient of a withdrawal, an account-address-sized value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    pub const ZERO: Self = Self([0u8; ADDRESS_BYTES]);

    pub fn new(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_BYTES];
        bytes[ADDRESS_BYTES - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        let mut bytes = [0u8; ADDRESS_BYTES];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// The address as an integer, big-endian, embedded in the field.
    pub fn to_field(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }

    /// Inverse of [`Address::to_field`]; rejects values wider than 160 bits.
    pub fn from_field(value: &Fr) -> Result<Self, ScalarError> {
        Self::from_biguint(&field_to_biguint(value))
    }

    fn from_biguint(value: &BigUint) -> Result<Self, ScalarError> {
        if value.bits() > (ADDRESS_BYTES * 8) as u64 {
            return Err(ScalarError::AddressTooWide);
        }
        let be = value.to_bytes_be();
        let mut bytes = [0u8; ADDRESS_BYTES];
        // `to_bytes_be` of zero is a single zero byte
        if !value.is_zero() {
            bytes[ADDRESS_BYTES - be.len()..].copy_from_slice(&be);
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_biguint(&parse_biguint(s)?)
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

string_serde!(Commitment);
string_serde!(Address);

//! Serde adapter writing an [`Amount`] as a decimal string.
//!
//! Denominations routinely exceed 2^53, which JSON numbers lose in most
//! clients. Use with `#[serde(with = "zkvault_ledger::amount")]`.

use serde::{de, Deserialize, Deserializer, Serializer};

use crate::Amount;

pub fn serialize<S>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse()
        .map_err(|_| de::Error::custom(format!("invalid amount: {raw:?}")))
}

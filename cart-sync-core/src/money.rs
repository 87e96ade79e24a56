//! Serde helpers for currency amounts.
//!
//! Amounts are JSON numbers on disk: whole amounts as integers (`32`),
//! fractional ones as floats (`32.5`). Strings are accepted on input.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let value = value.normalize();
    if value.scale() == 0 {
        if let Some(whole) = value.to_i64() {
            return serializer.serialize_i64(whole);
        }
    }
    match value.to_f64() {
        Some(f) => serializer.serialize_f64(f),
        None => serializer.serialize_str(&value.to_string()),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    <Decimal as Deserialize>::deserialize(deserializer)
}

/// Render an amount the way the agent speaks it: `392`, `32.5`.
pub fn display(value: Decimal) -> String {
    value.normalize().to_string()
}

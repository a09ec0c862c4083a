//! Lenient field decoders for caller payloads.
//!
//! Callers send loosely shaped JSON. These helpers collapse the shapes that
//! mean "not supplied" into `None`/empty so validation can decide what to do.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Absent, `null`, or empty string all decode to an empty `String`.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` and `""` decode to `None`.
pub fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

/// Anything that isn't a JSON boolean decodes to `None`.
pub fn strict_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

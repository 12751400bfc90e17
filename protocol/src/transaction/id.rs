//! Unsigned 64-bit object ids and their text form.
//!
//! Ids (transactions, accounts, assets, orders) are unsigned 64-bit values.
//! In JSON they always travel as decimal strings, since many JSON consumers
//! store numbers as doubles and would silently round anything above 2^53.

use thiserror::Error;

/// Failure to read an id from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// The input was empty or whitespace.
    #[error("empty id")]
    Empty,

    /// The input is not an unsigned 64-bit decimal or `0x` hex number.
    #[error("invalid id {value:?}")]
    Invalid { value: String },
}

/// Parses an unsigned 64-bit id.
///
/// Accepts decimal (`"17"`, `"18446744073709551615"`) or `0x`-prefixed hex
/// (`"0x11"`). Surrounding whitespace is ignored; signs are not.
pub fn parse_unsigned_id(value: &str) -> Result<u64, IdParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IdParseError::Empty);
    }

    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) if hex_digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u64::from_str_radix(hex_digits, 16)
        }
        Some(_) => {
            return Err(IdParseError::Invalid {
                value: value.to_string(),
            })
        }
        None if trimmed.bytes().all(|b| b.is_ascii_digit()) => trimmed.parse::<u64>(),
        None => {
            return Err(IdParseError::Invalid {
                value: value.to_string(),
            })
        }
    };

    parsed.map_err(|_| IdParseError::Invalid {
        value: value.to_string(),
    })
}

/// Renders an id as unsigned decimal text.
pub fn id_to_string(id: u64) -> String {
    id.to_string()
}

/// Serde helpers for ids carried as decimal strings.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "crate::transaction::id::decimal")]
///     id: u64,
/// }
/// ```
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(id: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::id_to_string(*id))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse_unsigned_id(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal() {
        assert_eq!(parse_unsigned_id("100"), Ok(100));
        assert_eq!(parse_unsigned_id(" 42 "), Ok(42));
        assert_eq!(parse_unsigned_id("18446744073709551615"), Ok(u64::MAX));
    }

    #[test]
    fn parses_hex() {
        assert_eq!(parse_unsigned_id("0x64"), Ok(100));
        assert_eq!(parse_unsigned_id("0XfF"), Ok(255));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_unsigned_id(""), Err(IdParseError::Empty));
        assert!(parse_unsigned_id("abc").is_err());
        assert!(parse_unsigned_id("-1").is_err());
        assert!(parse_unsigned_id("+1").is_err());
        assert!(parse_unsigned_id("18446744073709551616").is_err());
        assert!(parse_unsigned_id("0x").is_err());
    }

    #[test]
    fn renders_unsigned_decimal() {
        assert_eq!(id_to_string(0), "0");
        assert_eq!(id_to_string(u64::MAX), "18446744073709551615");
    }

    #[test]
    fn decimal_serde_helper() {
        #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Row {
            #[serde(with = "super::decimal")]
            id: u64,
        }

        let json = serde_json::to_string(&Row { id: u64::MAX }).unwrap();
        assert_eq!(json, r#"{"id":"18446744073709551615"}"#);
        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, u64::MAX);
    }
}

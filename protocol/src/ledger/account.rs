//! Accounts as seen by transaction submission.
//!
//! An account id is the first 8 bytes (little-endian) of the SHA-256 of the
//! account's 32-byte public key.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::transaction::id::id_to_string;

/// Public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Errors raised while resolving an account.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("public key is not hex: {0}")]
    NotHex(String),

    #[error("public key must be 32 bytes, got {0}")]
    WrongLength(usize),
}

/// A sender account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account {
    id: u64,
    public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl Account {
    pub fn from_public_key(public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        let digest = Sha256::digest(public_key);
        let mut id = [0u8; 8];
        id.copy_from_slice(&digest[..8]);
        Self {
            id: u64::from_le_bytes(id),
            public_key,
        }
    }

    pub fn from_public_key_hex(hex_key: &str) -> Result<Self, AccountError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|e| AccountError::NotHex(e.to_string()))?;
        let public_key: [u8; PUBLIC_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AccountError::WrongLength(bytes.len()))?;
        Ok(Self::from_public_key(public_key))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Account", 2)?;
        s.serialize_field("account", &id_to_string(self.id))?;
        s.serialize_field("publicKey", &hex::encode(self.public_key))?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_sha256_prefix() {
        let account = Account::from_public_key([7u8; 32]);
        let digest = Sha256::digest([7u8; 32]);
        let expected = u64::from_le_bytes(digest[..8].try_into().unwrap());
        assert_eq!(account.id(), expected);
    }

    #[test]
    fn parses_hex_public_key() {
        let hex_key = hex::encode([1u8; 32]);
        let account = Account::from_public_key_hex(&hex_key).unwrap();
        assert_eq!(account, Account::from_public_key([1u8; 32]));
    }

    #[test]
    fn rejects_bad_public_keys() {
        assert!(matches!(
            Account::from_public_key_hex("zz"),
            Err(AccountError::NotHex(_))
        ));
        assert_eq!(
            Account::from_public_key_hex(&hex::encode([1u8; 31])),
            Err(AccountError::WrongLength(31))
        );
    }

    #[test]
    fn serializes_id_as_string() {
        let account = Account::from_public_key([0u8; 32]);
        let v = serde_json::to_value(account).unwrap();
        assert_eq!(v["account"], account.id().to_string());
        assert_eq!(v["publicKey"], "00".repeat(32));
    }
}

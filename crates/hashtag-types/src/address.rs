use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddressParseError {
    #[error("Invalid address format: {0}")]
    InvalidFormat(String),
}

/// A 32-byte account identity on the value ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    /// The unset address, used before a provider has been selected.
    pub const ZERO: Self = Self([0; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    pub fn from_hex(address: &str) -> Result<Self, AddressParseError> {
        let trimmed = address.strip_prefix("0x").unwrap_or(address);
        let bytes = hex::decode(trimmed)
            .map_err(|e| AddressParseError::InvalidFormat(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AddressParseError::InvalidFormat("expected 32 bytes".to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address() {
        assert!(AccountAddress::ZERO.is_zero());
        assert!(!AccountAddress::from_bytes([1; 32]).is_zero());
    }

    #[test]
    fn test_hex_round_trip() {
        let addr = AccountAddress::from_bytes([0xAB; 32]);
        let full = format!("0x{}", hex::encode(addr.as_bytes()));
        assert_eq!(AccountAddress::from_hex(&full).unwrap(), addr);
        assert!(AccountAddress::from_hex("0x1234").is_err());
    }
}

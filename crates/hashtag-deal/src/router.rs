use crate::error::{DealError, Result};
use hashtag_types::{ContentHash, TokenAmount};

/// Action tag for creating a new item.
pub const ACTION_CREATE: u8 = 1;
/// Action tag for funding an existing item.
pub const ACTION_FUND: u8 = 2;

const CREATE_PAYLOAD_LEN: usize = 1 + 16 + 32;
const FUND_PAYLOAD_LEN: usize = 1 + 8;

/// Decoded deposit payload.
///
/// The value ledger hands the deal contract an opaque byte payload with
/// every inbound deposit; it is decoded exactly once, here, at the
/// boundary. Big-endian fixed-width fields behind a one-byte action tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositAction {
    /// Create a new item. `item_value` is validated against the deposited
    /// amount and the current hashtag fee before any state is touched.
    Create {
        item_value: TokenAmount,
        metadata: ContentHash,
    },
    /// Fund an existing open item as its selected provider.
    Fund { item_id: u64 },
}

impl DepositAction {
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let (&tag, rest) = payload
            .split_first()
            .ok_or_else(|| DealError::InvalidPayload("empty payload".to_string()))?;

        match tag {
            ACTION_CREATE => {
                if payload.len() != CREATE_PAYLOAD_LEN {
                    return Err(DealError::InvalidPayload(format!(
                        "create payload must be {} bytes, got {}",
                        CREATE_PAYLOAD_LEN,
                        payload.len()
                    )));
                }
                let mut value_bytes = [0u8; 16];
                value_bytes.copy_from_slice(&rest[..16]);
                let mut hash_bytes = [0u8; 32];
                hash_bytes.copy_from_slice(&rest[16..48]);

                Ok(Self::Create {
                    item_value: TokenAmount::from_base_units(u128::from_be_bytes(value_bytes)),
                    metadata: ContentHash::from_bytes(hash_bytes),
                })
            }
            ACTION_FUND => {
                if payload.len() != FUND_PAYLOAD_LEN {
                    return Err(DealError::InvalidPayload(format!(
                        "fund payload must be {} bytes, got {}",
                        FUND_PAYLOAD_LEN,
                        payload.len()
                    )));
                }
                let mut id_bytes = [0u8; 8];
                id_bytes.copy_from_slice(rest);

                Ok(Self::Fund {
                    item_id: u64::from_be_bytes(id_bytes),
                })
            }
            other => Err(DealError::InvalidPayload(format!(
                "unknown action tag {}",
                other
            ))),
        }
    }

    /// Encode for a `transfer_and_call` deposit. The inverse of `decode`.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Create {
                item_value,
                metadata,
            } => {
                let mut out = Vec::with_capacity(CREATE_PAYLOAD_LEN);
                out.push(ACTION_CREATE);
                out.extend_from_slice(&item_value.to_base_units().to_be_bytes());
                out.extend_from_slice(metadata.as_bytes());
                out
            }
            Self::Fund { item_id } => {
                let mut out = Vec::with_capacity(FUND_PAYLOAD_LEN);
                out.push(ACTION_FUND);
                out.extend_from_slice(&item_id.to_be_bytes());
                out
            }
        }
    }
}

use hashtag_types::{AccountAddress, ContentHash, TokenAmount};
use serde::{Deserialize, Serialize};

/// Mutable hashtag configuration.
///
/// `owner`, `token_address` and `deal_address` are fixed at construction;
/// the remaining fields change only through the owner-gated setters on the
/// deal contract. `hashtag_fee` applies to newly created items only —
/// every item freezes the fee in effect at its creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagConfig {
    /// Human-readable hashtag name, shown by clients.
    pub name: String,
    /// Administrator: the only principal allowed to mutate this config.
    pub owner: AccountAddress,
    /// The value ledger trusted to invoke the deposit callback.
    pub token_address: AccountAddress,
    /// This contract's own escrow account on the value ledger.
    pub deal_address: AccountAddress,
    /// Maintainer: fee recipient and dispute arbitrator.
    pub payout_address: AccountAddress,
    /// Fee charged on new items, split between both parties' deposits.
    pub hashtag_fee: TokenAmount,
    /// Off-chain hashtag description.
    pub hashtag_metadata_hash: ContentHash,
}

impl HashtagConfig {
    /// The payout address starts at the owner until rotated explicitly.
    pub fn new(
        name: impl Into<String>,
        owner: AccountAddress,
        token_address: AccountAddress,
        deal_address: AccountAddress,
        hashtag_fee: TokenAmount,
        hashtag_metadata_hash: ContentHash,
    ) -> Self {
        Self {
            name: name.into(),
            owner,
            token_address,
            deal_address,
            payout_address: owner,
            hashtag_fee,
            hashtag_metadata_hash,
        }
    }
}

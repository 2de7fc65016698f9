use crate::error::{DealError, Result};
use hashtag_types::{AccountAddress, ContentHash, LifecycleState, TokenAmount};
use serde::{Deserialize, Serialize};

/// Item status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Created and seeker-funded, collecting replies
    Open,
    /// Provider matched the seeker's deposit, work in progress
    Funded,
    /// One party escalated, awaiting the maintainer's ruling
    Disputed,
    /// Seeker released payment to the provider
    Paid,
    /// Maintainer arbitrated a split
    Resolved,
    /// Seeker withdrew before any provider funds arrived
    Cancelled,
}

impl LifecycleState for ItemStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Resolved | Self::Cancelled)
    }

    fn can_transition_to(&self, next: &Self) -> bool {
        use ItemStatus::*;
        match (self, next) {
            // From Open
            (Open, Funded) => true,
            (Open, Cancelled) => true, // Seeker backs out before provider funding

            // From Funded
            (Funded, Paid) => true,
            (Funded, Disputed) => true,

            // From Disputed
            (Disputed, Resolved) => true,

            // Terminal states cannot transition
            (Paid, _) | (Resolved, _) | (Cancelled, _) => false,

            // All other transitions are invalid
            _ => false,
        }
    }
}

/// One reply left on an open item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub replier: AccountAddress,
    pub reply_metadata_hash: ContentHash,
}

/// One posted task tracked by the escrow ledger.
///
/// `item_value` and `hashtag_fee_snapshot` are fixed at creation; later
/// changes to the global fee never touch in-flight items. Items are kept
/// forever as audit records; only `status` reaches a terminal value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub status: ItemStatus,
    pub seeker: AccountAddress,
    /// Selected provider; `None` until the seeker picks a replier.
    pub provider: Option<AccountAddress>,
    pub item_value: TokenAmount,
    pub hashtag_fee_snapshot: TokenAmount,
    pub item_metadata_hash: ContentHash,
    pub replies: Vec<Reply>,
    pub creation_block: u64,
}

impl Item {
    pub fn new(
        id: u64,
        seeker: AccountAddress,
        item_value: TokenAmount,
        hashtag_fee_snapshot: TokenAmount,
        item_metadata_hash: ContentHash,
        creation_block: u64,
    ) -> Self {
        Self {
            id,
            status: ItemStatus::Open,
            seeker,
            provider: None,
            item_value,
            hashtag_fee_snapshot,
            item_metadata_hash,
            replies: Vec::new(),
            creation_block,
        }
    }

    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }

    pub fn has_reply_from(&self, address: AccountAddress) -> bool {
        self.replies.iter().any(|r| r.replier == address)
    }

    /// The per-party fee share, floored identically on both sides.
    pub fn fee_half(&self) -> TokenAmount {
        self.hashtag_fee_snapshot.half()
    }

    /// The amount each party must deposit: `item_value + fee/2`.
    pub fn required_deposit(&self) -> Result<TokenAmount> {
        self.item_value
            .checked_add(self.fee_half())
            .ok_or(DealError::ArithmeticOverflow)
    }

    /// Transition to a new status with FSM validation.
    ///
    /// Use this instead of direct status assignment so every status change
    /// goes through `ItemStatus::can_transition_to`.
    pub fn transition_to(&mut self, new_status: ItemStatus) -> Result<()> {
        if !self.status.can_transition_to(&new_status) {
            return Err(DealError::InvalidState {
                item_id: self.id,
                status: format!("{:?}", self.status),
                action: format!("transition to {:?}", new_status),
            });
        }

        tracing::debug!(
            item_id = self.id,
            from = ?self.status,
            to = ?new_status,
            "Item state transition"
        );

        self.status = new_status;
        Ok(())
    }
}

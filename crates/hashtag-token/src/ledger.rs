use anyhow::Result;
use async_trait::async_trait;
use hashtag_types::{AccountAddress, TokenAmount};

/// The slice of an external fungible-token ledger the marketplace consumes.
///
/// Transaction brackets snapshot the full balance state; `rollback`
/// restores it. A single bracket may be outstanding at a time and is owned
/// by whichever component initiated the operation: `transfer_and_call`
/// opens one around inbound deposits, the deal contract opens one around
/// each disbursement.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn balance_of(&self, address: AccountAddress) -> Result<TokenAmount>;

    /// Push a payment out of `from` into `to`. Fails without effect when
    /// `from` holds less than `amount`.
    async fn transfer(
        &self,
        from: AccountAddress,
        to: AccountAddress,
        amount: TokenAmount,
    ) -> Result<()>;

    /// Current ledger height, recorded on items for audit ordering.
    async fn block_height(&self) -> u64;

    async fn begin_transaction(&self) -> Result<()>;
    async fn commit_transaction(&self) -> Result<()>;
    async fn rollback_transaction(&self) -> Result<()>;
}

/// Deposit callback implemented by contracts that accept pushed value.
///
/// By the time this runs the funds are already credited to the receiver's
/// ledger account. `caller` is the ledger's own address; receivers must
/// check it against their configured ledger identity before trusting
/// `payer` or `amount`. Returning an error aborts the whole deposit: the
/// ledger rolls the inbound transfer back atomically.
#[async_trait]
pub trait TokenReceiver: Send + Sync {
    async fn on_token_transfer(
        &self,
        caller: AccountAddress,
        payer: AccountAddress,
        amount: TokenAmount,
        payload: &[u8],
    ) -> Result<()>;
}

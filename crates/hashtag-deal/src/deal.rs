use crate::arbitration;
use crate::config::HashtagConfig;
use crate::error::{DealError, Result};
use crate::events::{EventLog, EventRecord, HashtagEvent};
use crate::item::{Item, ItemStatus, Reply};
use crate::reputation::ReputationLedger;
use crate::router::DepositAction;
use async_trait::async_trait;
use hashtag_token::{TokenLedger, TokenReceiver};
use hashtag_types::{AccountAddress, ContentHash, TokenAmount};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::info;

/// The hashtag simple-deal contract.
///
/// Owns the item ledger and all its state transitions. Inbound value
/// arrives through [`TokenReceiver::on_token_transfer`] after the ledger
/// has already moved the funds; outbound value leaves through
/// [`TokenLedger::transfer`] inside a ledger transaction bracket so a
/// disbursement either lands completely or not at all.
///
/// Operations on one item never interleave: every mutating path holds the
/// item-map write lock for its full validate-mutate-disburse sequence.
pub struct SimpleDeal {
    config: Arc<RwLock<HashtagConfig>>,
    ledger: Arc<dyn TokenLedger>,
    items: Arc<RwLock<HashMap<u64, Item>>>,
    reputation: ReputationLedger,
    events: EventLog,
}

impl SimpleDeal {
    pub fn new(config: HashtagConfig, ledger: Arc<dyn TokenLedger>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            ledger,
            items: Arc::new(RwLock::new(HashMap::new())),
            reputation: ReputationLedger::new(),
            events: EventLog::new(),
        }
    }

    /// Create a contract whose event records are also forwarded to the
    /// returned channel, for off-chain indexers.
    pub fn with_events(
        config: HashtagConfig,
        ledger: Arc<dyn TokenLedger>,
    ) -> (Self, mpsc::UnboundedReceiver<EventRecord>) {
        let (events, rx) = EventLog::with_subscriber();
        let deal = Self {
            config: Arc::new(RwLock::new(config)),
            ledger,
            items: Arc::new(RwLock::new(HashMap::new())),
            reputation: ReputationLedger::new(),
            events,
        };
        (deal, rx)
    }

    // ========== Config store ==========

    pub async fn set_payout_address(
        &self,
        caller: AccountAddress,
        payout_address: AccountAddress,
    ) -> Result<()> {
        let mut config = self.config.write().await;
        Self::require_owner(&config, caller)?;
        config.payout_address = payout_address;
        drop(config);

        self.events
            .emit(HashtagEvent::PayoutAddressSet { payout_address })
            .await;
        info!(payout_address = %payout_address, "Payout address set");
        Ok(())
    }

    pub async fn set_hashtag_fee(
        &self,
        caller: AccountAddress,
        hashtag_fee: TokenAmount,
    ) -> Result<()> {
        let mut config = self.config.write().await;
        Self::require_owner(&config, caller)?;
        config.hashtag_fee = hashtag_fee;
        drop(config);

        self.events
            .emit(HashtagEvent::HashtagFeeSet { hashtag_fee })
            .await;
        info!(hashtag_fee = %hashtag_fee, "Hashtag fee set");
        Ok(())
    }

    pub async fn set_metadata_hash(
        &self,
        caller: AccountAddress,
        hashtag_metadata_hash: ContentHash,
    ) -> Result<()> {
        let mut config = self.config.write().await;
        Self::require_owner(&config, caller)?;
        config.hashtag_metadata_hash = hashtag_metadata_hash;
        drop(config);

        self.events
            .emit(HashtagEvent::MetadataHashSet {
                hashtag_metadata_hash,
            })
            .await;
        info!(hashtag_metadata_hash = %hashtag_metadata_hash, "Hashtag metadata set");
        Ok(())
    }

    pub async fn name(&self) -> String {
        self.config.read().await.name.clone()
    }

    pub async fn owner(&self) -> AccountAddress {
        self.config.read().await.owner
    }

    pub async fn payout_address(&self) -> AccountAddress {
        self.config.read().await.payout_address
    }

    pub async fn hashtag_fee(&self) -> TokenAmount {
        self.config.read().await.hashtag_fee
    }

    pub async fn hashtag_metadata_hash(&self) -> ContentHash {
        self.config.read().await.hashtag_metadata_hash
    }

    pub async fn deal_address(&self) -> AccountAddress {
        self.config.read().await.deal_address
    }

    // ========== Deposit callback router ==========

    /// Single entry point for inbound deposits.
    ///
    /// The funds behind `amount` are already in the contract's ledger
    /// account when this runs; validation happens before any state is
    /// touched, and a returned error makes the ledger roll the whole
    /// deposit back. `caller` must be the configured value ledger — it is
    /// the only principal that can vouch for `payer` and `amount`.
    pub async fn deposit(
        &self,
        caller: AccountAddress,
        payer: AccountAddress,
        amount: TokenAmount,
        payload: &[u8],
    ) -> Result<()> {
        let token_address = self.config.read().await.token_address;
        if caller != token_address {
            return Err(DealError::Unauthorized(format!(
                "deposit callback from {}, expected value ledger {}",
                caller, token_address
            )));
        }

        match DepositAction::decode(payload)? {
            DepositAction::Create {
                item_value,
                metadata,
            } => self
                .handle_create(payer, amount, item_value, metadata)
                .await
                .map(|_| ()),
            DepositAction::Fund { item_id } => self.handle_fund(payer, amount, item_id).await,
        }
    }

    async fn handle_create(
        &self,
        payer: AccountAddress,
        amount: TokenAmount,
        item_value: TokenAmount,
        metadata: ContentHash,
    ) -> Result<u64> {
        let hashtag_fee = self.config.read().await.hashtag_fee;
        let expected = item_value
            .checked_add(hashtag_fee.half())
            .ok_or(DealError::ArithmeticOverflow)?;
        if amount != expected {
            return Err(DealError::AmountMismatch {
                expected: expected.to_string(),
                actual: amount.to_string(),
            });
        }

        let creation_block = self.ledger.block_height().await;

        let mut items = self.items.write().await;
        // Items are never deleted, so the map size is the next sequential id.
        let item_id = items.len() as u64;
        items.insert(
            item_id,
            Item::new(
                item_id,
                payer,
                item_value,
                hashtag_fee,
                metadata,
                creation_block,
            ),
        );
        drop(items);

        self.events
            .emit(HashtagEvent::NewItem {
                item_id,
                owner: payer,
                item_value,
                item_metadata_hash: metadata,
            })
            .await;

        info!(
            item_id = item_id,
            seeker = %payer,
            item_value = %item_value,
            hashtag_fee = %hashtag_fee,
            creation_block = creation_block,
            "🆕 Item created"
        );
        Ok(item_id)
    }

    async fn handle_fund(
        &self,
        payer: AccountAddress,
        amount: TokenAmount,
        item_id: u64,
    ) -> Result<()> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(DealError::NotFound(item_id))?;

        Self::require_status(item, ItemStatus::Open, "fund")?;
        match item.provider {
            Some(provider) if provider == payer => {}
            Some(provider) => {
                return Err(DealError::Unauthorized(format!(
                    "item {} can only be funded by its selected provider {}",
                    item_id, provider
                )))
            }
            None => {
                return Err(DealError::Unauthorized(format!(
                    "item {} has no selected provider yet",
                    item_id
                )))
            }
        }

        let expected = item.required_deposit()?;
        if amount != expected {
            return Err(DealError::AmountMismatch {
                expected: expected.to_string(),
                actual: amount.to_string(),
            });
        }

        item.transition_to(ItemStatus::Funded)?;
        drop(items);

        self.events
            .emit(HashtagEvent::FundItem {
                item_id,
                provider: payer,
            })
            .await;

        info!(
            item_id = item_id,
            provider = %payer,
            amount = %amount,
            "🤝 Item funded, escrow matched"
        );
        Ok(())
    }

    // ========== Item operations ==========

    pub async fn reply_item(
        &self,
        caller: AccountAddress,
        item_id: u64,
        reply_metadata_hash: ContentHash,
    ) -> Result<()> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(DealError::NotFound(item_id))?;

        Self::require_status(item, ItemStatus::Open, "reply")?;
        if caller == item.seeker {
            return Err(DealError::Unauthorized(
                "a seeker cannot reply to their own item".to_string(),
            ));
        }

        item.replies.push(Reply {
            replier: caller,
            reply_metadata_hash,
        });
        let reply_count = item.reply_count();
        drop(items);

        self.events
            .emit(HashtagEvent::ReplyItem {
                item_id,
                replier: caller,
                reply_metadata_hash,
            })
            .await;

        info!(
            item_id = item_id,
            replier = %caller,
            reply_count = reply_count,
            "Reply added"
        );
        Ok(())
    }

    pub async fn select_replier(
        &self,
        caller: AccountAddress,
        item_id: u64,
        provider: AccountAddress,
    ) -> Result<()> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(DealError::NotFound(item_id))?;

        Self::require_status(item, ItemStatus::Open, "select replier")?;
        if caller != item.seeker {
            return Err(DealError::Unauthorized(
                "only the seeker can select a replier".to_string(),
            ));
        }
        if !item.has_reply_from(provider) {
            return Err(DealError::Unauthorized(format!(
                "{} has no reply on item {}",
                provider, item_id
            )));
        }

        item.provider = Some(provider);
        let status = item.status;
        drop(items);

        self.events
            .emit(HashtagEvent::ItemChange {
                item_id,
                status,
                provider: Some(provider),
            })
            .await;

        info!(item_id = item_id, provider = %provider, "Replier selected");
        Ok(())
    }

    pub async fn payout_item(&self, caller: AccountAddress, item_id: u64) -> Result<()> {
        // Config is always read before the item lock; every path locks in
        // the same order.
        let (deal_address, maintainer) = {
            let config = self.config.read().await;
            (config.deal_address, config.payout_address)
        };

        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(DealError::NotFound(item_id))?;

        Self::require_status(item, ItemStatus::Funded, "payout")?;
        if caller != item.seeker {
            return Err(DealError::Unauthorized(
                "only the seeker can release payment".to_string(),
            ));
        }
        let provider = Self::require_provider(item)?;

        let provider_payout = item
            .item_value
            .checked_double()
            .ok_or(DealError::ArithmeticOverflow)?;
        let maintainer_payout = item
            .fee_half()
            .checked_double()
            .ok_or(DealError::ArithmeticOverflow)?;

        self.disburse(
            item_id,
            deal_address,
            &[
                (provider, provider_payout),
                (maintainer, maintainer_payout),
            ],
        )
        .await?;

        item.transition_to(ItemStatus::Paid)?;
        let seeker = item.seeker;
        drop(items);

        self.reputation
            .credit_completion(item_id, seeker, provider)
            .await;
        self.events
            .emit(HashtagEvent::ItemChange {
                item_id,
                status: ItemStatus::Paid,
                provider: Some(provider),
            })
            .await;

        info!(
            item_id = item_id,
            provider = %provider,
            provider_payout = %provider_payout,
            maintainer = %maintainer,
            maintainer_payout = %maintainer_payout,
            "✅ Item paid out"
        );
        Ok(())
    }

    pub async fn dispute_item(&self, caller: AccountAddress, item_id: u64) -> Result<()> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(DealError::NotFound(item_id))?;

        Self::require_status(item, ItemStatus::Funded, "dispute")?;
        let provider = Self::require_provider(item)?;
        if caller != item.seeker && caller != provider {
            return Err(DealError::Unauthorized(
                "only the seeker or the provider can dispute".to_string(),
            ));
        }

        item.transition_to(ItemStatus::Disputed)?;
        drop(items);

        self.events
            .emit(HashtagEvent::ItemChange {
                item_id,
                status: ItemStatus::Disputed,
                provider: Some(provider),
            })
            .await;

        info!(item_id = item_id, disputed_by = %caller, "⚖️ Item disputed");
        Ok(())
    }

    pub async fn resolve_item(
        &self,
        caller: AccountAddress,
        item_id: u64,
        seeker_fraction: TokenAmount,
    ) -> Result<()> {
        let (deal_address, maintainer) = {
            let config = self.config.read().await;
            (config.deal_address, config.payout_address)
        };

        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(DealError::NotFound(item_id))?;

        Self::require_status(item, ItemStatus::Disputed, "resolve")?;
        if caller != maintainer {
            return Err(DealError::Unauthorized(
                "only the maintainer can resolve a dispute".to_string(),
            ));
        }
        let provider = Self::require_provider(item)?;

        let split = arbitration::split(item.item_value, item.hashtag_fee_snapshot, seeker_fraction)?;

        self.disburse(
            item_id,
            deal_address,
            &[
                (item.seeker, split.seeker_payout),
                (provider, split.provider_payout),
                (maintainer, split.maintainer_payout),
            ],
        )
        .await?;

        item.transition_to(ItemStatus::Resolved)?;
        let seeker = item.seeker;
        drop(items);

        self.reputation
            .credit_completion(item_id, seeker, provider)
            .await;
        self.events
            .emit(HashtagEvent::ItemChange {
                item_id,
                status: ItemStatus::Resolved,
                provider: Some(provider),
            })
            .await;

        info!(
            item_id = item_id,
            seeker_payout = %split.seeker_payout,
            provider_payout = %split.provider_payout,
            maintainer_payout = %split.maintainer_payout,
            "⚖️ Dispute resolved"
        );
        Ok(())
    }

    pub async fn cancel_item(&self, caller: AccountAddress, item_id: u64) -> Result<()> {
        let deal_address = self.config.read().await.deal_address;

        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(DealError::NotFound(item_id))?;

        // Open means no provider deposit has arrived, so only the seeker's
        // own funds are in escrow.
        Self::require_status(item, ItemStatus::Open, "cancel")?;
        if caller != item.seeker {
            return Err(DealError::Unauthorized(
                "only the seeker can cancel their item".to_string(),
            ));
        }

        let refund = item.required_deposit()?;
        self.disburse(item_id, deal_address, &[(item.seeker, refund)])
            .await?;

        item.transition_to(ItemStatus::Cancelled)?;
        let provider = item.provider;
        drop(items);

        self.events
            .emit(HashtagEvent::ItemChange {
                item_id,
                status: ItemStatus::Cancelled,
                provider,
            })
            .await;

        info!(item_id = item_id, refund = %refund, "🔄 Item cancelled, deposit refunded");
        Ok(())
    }

    // ========== Reads ==========

    pub async fn get_item(&self, item_id: u64) -> Result<Item> {
        let items = self.items.read().await;
        items
            .get(&item_id)
            .cloned()
            .ok_or(DealError::NotFound(item_id))
    }

    pub async fn item_count(&self) -> u64 {
        let items = self.items.read().await;
        items.len() as u64
    }

    pub async fn seeker_reputation(&self, address: AccountAddress) -> u64 {
        self.reputation.seeker_reputation(address).await
    }

    pub async fn provider_reputation(&self, address: AccountAddress) -> u64 {
        self.reputation.provider_reputation(address).await
    }

    pub async fn event_history(&self) -> Vec<EventRecord> {
        self.events.history().await
    }

    // ========== Helpers ==========

    fn require_owner(config: &HashtagConfig, caller: AccountAddress) -> Result<()> {
        if caller != config.owner {
            return Err(DealError::Unauthorized(format!(
                "{} is not the hashtag owner",
                caller
            )));
        }
        Ok(())
    }

    fn require_status(item: &Item, required: ItemStatus, action: &str) -> Result<()> {
        if item.status != required {
            return Err(DealError::InvalidState {
                item_id: item.id,
                status: format!("{:?}", item.status),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    fn require_provider(item: &Item) -> Result<AccountAddress> {
        item.provider.ok_or_else(|| DealError::InvalidState {
            item_id: item.id,
            status: format!("{:?}", item.status),
            action: "act on an item with no provider".to_string(),
        })
    }

    /// Push an item's escrow out of the contract account, all or nothing.
    async fn disburse(
        &self,
        item_id: u64,
        deal_address: AccountAddress,
        payouts: &[(AccountAddress, TokenAmount)],
    ) -> Result<()> {
        self.ledger
            .begin_transaction()
            .await
            .map_err(|e| DealError::Ledger(e.to_string()))?;

        for (to, amount) in payouts {
            if amount.is_zero() {
                continue;
            }
            if let Err(e) = self.ledger.transfer(deal_address, *to, *amount).await {
                info!(
                    item_id = item_id,
                    to = %to,
                    amount = %amount,
                    error = %e,
                    "❌ Disbursement rolled back"
                );
                self.ledger
                    .rollback_transaction()
                    .await
                    .map_err(|re| DealError::Ledger(re.to_string()))?;
                return Err(DealError::Ledger(e.to_string()));
            }
        }

        self.ledger
            .commit_transaction()
            .await
            .map_err(|e| DealError::Ledger(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl TokenReceiver for SimpleDeal {
    async fn on_token_transfer(
        &self,
        caller: AccountAddress,
        payer: AccountAddress,
        amount: TokenAmount,
        payload: &[u8],
    ) -> anyhow::Result<()> {
        self.deposit(caller, payer, amount, payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashtag_token::MemoryToken;

    fn addr(byte: u8) -> AccountAddress {
        AccountAddress::from_bytes([byte; 32])
    }

    async fn fixture() -> (Arc<MemoryToken>, SimpleDeal) {
        let token = Arc::new(MemoryToken::new("Test Token", "TST"));
        let config = HashtagConfig::new(
            "test-hashtag",
            addr(0xA0),
            token.address(),
            addr(0xDD),
            TokenAmount::from_base_units(600_000_000_000_000_000),
            ContentHash::digest(b"hashtag metadata"),
        );
        let deal = SimpleDeal::new(config, token.clone());
        (token, deal)
    }

    #[tokio::test]
    async fn test_owner_gated_setters() {
        let (_token, deal) = fixture().await;
        let owner = addr(0xA0);
        let stranger = addr(0x55);
        let maintainer = addr(0xA3);

        assert!(matches!(
            deal.set_payout_address(stranger, maintainer).await,
            Err(DealError::Unauthorized(_))
        ));
        assert!(matches!(
            deal.set_hashtag_fee(stranger, TokenAmount::from_whole(1)).await,
            Err(DealError::Unauthorized(_))
        ));
        assert!(matches!(
            deal.set_metadata_hash(stranger, ContentHash::digest(b"x")).await,
            Err(DealError::Unauthorized(_))
        ));

        deal.set_payout_address(owner, maintainer).await.unwrap();
        assert_eq!(deal.payout_address().await, maintainer);

        deal.set_hashtag_fee(owner, TokenAmount::from_whole(1))
            .await
            .unwrap();
        assert_eq!(deal.hashtag_fee().await, TokenAmount::from_whole(1));

        let hash = ContentHash::digest(b"new metadata");
        deal.set_metadata_hash(owner, hash).await.unwrap();
        assert_eq!(deal.hashtag_metadata_hash().await, hash);
    }

    #[tokio::test]
    async fn test_deposit_rejects_unknown_caller() {
        let (_token, deal) = fixture().await;
        let payload = DepositAction::Create {
            item_value: TokenAmount::from_whole(1),
            metadata: ContentHash::digest(b"item"),
        }
        .encode();

        let result = deal
            .deposit(
                addr(0x66), // not the configured value ledger
                addr(0x01),
                TokenAmount::from_whole(1),
                &payload,
            )
            .await;
        assert!(matches!(result, Err(DealError::Unauthorized(_))));
        assert_eq!(deal.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_validates_amount_against_fee() {
        let (token, deal) = fixture().await;
        let payload = DepositAction::Create {
            item_value: TokenAmount::from_whole(1),
            metadata: ContentHash::digest(b"item"),
        }
        .encode();

        // Expected deposit is 1.0 + 0.3 = 1.3; anything else is rejected.
        let result = deal
            .deposit(
                token.address(),
                addr(0x01),
                TokenAmount::from_whole(1),
                &payload,
            )
            .await;
        assert!(matches!(result, Err(DealError::AmountMismatch { .. })));

        deal.deposit(
            token.address(),
            addr(0x01),
            TokenAmount::from_base_units(1_300_000_000_000_000_000),
            &payload,
        )
        .await
        .unwrap();
        assert_eq!(deal.item_count().await, 1);

        let item = deal.get_item(0).await.unwrap();
        assert_eq!(item.status, ItemStatus::Open);
        assert_eq!(item.seeker, addr(0x01));
        assert_eq!(item.reply_count(), 0);
    }

    #[tokio::test]
    async fn test_fee_snapshot_is_frozen_at_creation() {
        let (token, deal) = fixture().await;
        let owner = addr(0xA0);
        let old_fee = deal.hashtag_fee().await;

        let payload = DepositAction::Create {
            item_value: TokenAmount::from_whole(1),
            metadata: ContentHash::digest(b"item"),
        }
        .encode();
        deal.deposit(
            token.address(),
            addr(0x01),
            TokenAmount::from_base_units(1_300_000_000_000_000_000),
            &payload,
        )
        .await
        .unwrap();

        // Raising the global fee must not touch the in-flight item.
        deal.set_hashtag_fee(owner, TokenAmount::from_whole(2))
            .await
            .unwrap();
        let item = deal.get_item(0).await.unwrap();
        assert_eq!(item.hashtag_fee_snapshot, old_fee);
    }

    #[tokio::test]
    async fn test_seeker_cannot_reply_to_own_item() {
        let (token, deal) = fixture().await;
        let seeker = addr(0x01);

        let payload = DepositAction::Create {
            item_value: TokenAmount::from_whole(1),
            metadata: ContentHash::digest(b"item"),
        }
        .encode();
        deal.deposit(
            token.address(),
            seeker,
            TokenAmount::from_base_units(1_300_000_000_000_000_000),
            &payload,
        )
        .await
        .unwrap();

        let result = deal
            .reply_item(seeker, 0, ContentHash::digest(b"reply"))
            .await;
        assert!(matches!(result, Err(DealError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_select_requires_prior_reply() {
        let (token, deal) = fixture().await;
        let seeker = addr(0x01);
        let provider = addr(0x02);

        let payload = DepositAction::Create {
            item_value: TokenAmount::from_whole(1),
            metadata: ContentHash::digest(b"item"),
        }
        .encode();
        deal.deposit(
            token.address(),
            seeker,
            TokenAmount::from_base_units(1_300_000_000_000_000_000),
            &payload,
        )
        .await
        .unwrap();

        assert!(matches!(
            deal.select_replier(seeker, 0, provider).await,
            Err(DealError::Unauthorized(_))
        ));

        deal.reply_item(provider, 0, ContentHash::digest(b"reply"))
            .await
            .unwrap();
        assert!(matches!(
            deal.select_replier(provider, 0, provider).await,
            Err(DealError::Unauthorized(_))
        ));
        deal.select_replier(seeker, 0, provider).await.unwrap();

        let item = deal.get_item(0).await.unwrap();
        assert_eq!(item.provider, Some(provider));
    }

    #[tokio::test]
    async fn test_operations_on_missing_item() {
        let (_token, deal) = fixture().await;
        let caller = addr(0x01);

        assert!(matches!(
            deal.get_item(99).await,
            Err(DealError::NotFound(99))
        ));
        assert!(matches!(
            deal.payout_item(caller, 99).await,
            Err(DealError::NotFound(99))
        ));
        assert!(matches!(
            deal.cancel_item(caller, 99).await,
            Err(DealError::NotFound(99))
        ));
    }
}

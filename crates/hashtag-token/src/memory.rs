use crate::ledger::{TokenLedger, TokenReceiver};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hashtag_types::{AccountAddress, TokenAmount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// One settled transfer, kept for audit queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from: AccountAddress,
    pub to: AccountAddress,
    pub amount: TokenAmount,
    pub block: u64,
    pub timestamp: DateTime<Utc>,
    pub tx_hash: String,
}

type BalanceMap = HashMap<AccountAddress, TokenAmount>;

/// In-memory reference ledger.
///
/// Implements the `transferAndCall` deposit flow: funds move to the
/// recipient first, then the recipient's registered [`TokenReceiver`]
/// callback runs; if the callback fails, the balance snapshot taken at the
/// start of the deposit is restored, so the transfer and the rejected
/// state transition disappear together.
pub struct MemoryToken {
    name: String,
    symbol: String,
    address: AccountAddress,
    balances: Arc<RwLock<BalanceMap>>,
    receivers: Arc<RwLock<HashMap<AccountAddress, Arc<dyn TokenReceiver>>>>,
    transaction_backup: Arc<RwLock<Option<BalanceMap>>>,
    history: Arc<RwLock<Vec<TransferRecord>>>,
    height: Arc<RwLock<u64>>,
}

impl MemoryToken {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        let name = name.into();
        let symbol = symbol.into();
        // The ledger's own account identity, handed to receivers as the
        // callback caller.
        let address = AccountAddress::from_bytes(*blake3::hash(name.as_bytes()).as_bytes());
        Self {
            name,
            symbol,
            address,
            balances: Arc::new(RwLock::new(HashMap::new())),
            receivers: Arc::new(RwLock::new(HashMap::new())),
            transaction_backup: Arc::new(RwLock::new(None)),
            history: Arc::new(RwLock::new(Vec::new())),
            height: Arc::new(RwLock::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The ledger's account identity on itself.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// Register the deposit callback for a contract account.
    pub async fn register_receiver(
        &self,
        address: AccountAddress,
        receiver: Arc<dyn TokenReceiver>,
    ) {
        let mut receivers = self.receivers.write().await;
        receivers.insert(address, receiver);
        debug!(address = %address, "Deposit receiver registered");
    }

    /// Mint new tokens into an account. Test and genesis tooling only.
    pub async fn mint(&self, to: AccountAddress, amount: TokenAmount) -> Result<()> {
        let mut balances = self.balances.write().await;
        let current = balances.get(&to).copied().unwrap_or(TokenAmount::ZERO);
        let new_balance = current
            .checked_add(amount)
            .ok_or_else(|| anyhow::anyhow!("Balance overflow for {}", to))?;
        balances.insert(to, new_balance);

        info!(
            to = %to,
            amount = %amount,
            balance_after = %new_balance,
            "💰 Tokens minted"
        );
        Ok(())
    }

    /// Transfer with a deposit callback: move `amount` from `payer` to
    /// `to`, then invoke `to`'s registered receiver with `payload`. The
    /// whole deposit is atomic: a failed callback restores the balances
    /// snapshot and surfaces the callback's error.
    pub async fn transfer_and_call(
        &self,
        payer: AccountAddress,
        to: AccountAddress,
        amount: TokenAmount,
        payload: &[u8],
    ) -> Result<()> {
        self.begin_transaction().await?;

        if let Err(e) = self.move_funds(payer, to, amount).await {
            self.rollback_transaction().await?;
            return Err(e);
        }
        self.advance_block().await;

        let receiver = {
            let receivers = self.receivers.read().await;
            receivers.get(&to).cloned()
        };

        let Some(receiver) = receiver else {
            self.rollback_transaction().await?;
            bail!("No deposit receiver registered for {}", to);
        };

        match receiver
            .on_token_transfer(self.address, payer, amount, payload)
            .await
        {
            Ok(()) => {
                self.commit_transaction().await?;
                self.record(payer, to, amount).await;
                info!(
                    payer = %payer,
                    to = %to,
                    amount = %amount,
                    "✅ Deposit accepted"
                );
                Ok(())
            }
            Err(e) => {
                info!(
                    payer = %payer,
                    to = %to,
                    amount = %amount,
                    error = %e,
                    "❌ Deposit rejected, transfer rolled back"
                );
                self.rollback_transaction().await?;
                Err(e)
            }
        }
    }

    async fn move_funds(
        &self,
        from: AccountAddress,
        to: AccountAddress,
        amount: TokenAmount,
    ) -> Result<()> {
        if from == to {
            bail!("Cannot transfer to same address");
        }

        let mut balances = self.balances.write().await;
        let from_balance = balances.get(&from).copied().unwrap_or(TokenAmount::ZERO);
        let Some(new_from) = from_balance.checked_sub(amount) else {
            bail!(
                "Insufficient balance: {} has {}, needs {}",
                from,
                from_balance,
                amount
            );
        };
        let to_balance = balances.get(&to).copied().unwrap_or(TokenAmount::ZERO);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| anyhow::anyhow!("Balance overflow for recipient {}", to))?;

        balances.insert(from, new_from);
        balances.insert(to, new_to);

        debug!(
            from = %from,
            to = %to,
            amount = %amount,
            from_balance_after = %new_from,
            to_balance_after = %new_to,
            "💸 Funds moved"
        );
        Ok(())
    }

    async fn advance_block(&self) {
        let mut height = self.height.write().await;
        *height += 1;
    }

    async fn record(&self, from: AccountAddress, to: AccountAddress, amount: TokenAmount) {
        let now = Utc::now();
        let block = *self.height.read().await;

        let mut hasher = blake3::Hasher::new();
        hasher.update(from.as_bytes());
        hasher.update(to.as_bytes());
        hasher.update(&amount.to_base_units().to_le_bytes());
        hasher.update(&block.to_le_bytes());
        let tx_hash = hex::encode(hasher.finalize().as_bytes());

        let mut history = self.history.write().await;
        history.push(TransferRecord {
            from,
            to,
            amount,
            block,
            timestamp: now,
            tx_hash,
        });
    }

    pub async fn transfer_history(&self, address: AccountAddress) -> Vec<TransferRecord> {
        let history = self.history.read().await;
        history
            .iter()
            .filter(|tx| tx.from == address || tx.to == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TokenLedger for MemoryToken {
    async fn balance_of(&self, address: AccountAddress) -> Result<TokenAmount> {
        let balances = self.balances.read().await;
        Ok(balances.get(&address).copied().unwrap_or(TokenAmount::ZERO))
    }

    async fn transfer(
        &self,
        from: AccountAddress,
        to: AccountAddress,
        amount: TokenAmount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.move_funds(from, to, amount).await?;
        self.advance_block().await;
        self.record(from, to, amount).await;
        Ok(())
    }

    async fn block_height(&self) -> u64 {
        *self.height.read().await
    }

    async fn begin_transaction(&self) -> Result<()> {
        // Lock order is backup then balances, matching rollback.
        let mut backup = self.transaction_backup.write().await;
        if backup.is_some() {
            bail!("A ledger transaction is already open");
        }
        let balances = self.balances.read().await;
        *backup = Some(balances.clone());

        debug!(
            accounts = balances.len(),
            "📝 Ledger transaction began (snapshot created)"
        );
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<()> {
        let mut backup = self.transaction_backup.write().await;
        if backup.take().is_some() {
            debug!("✅ Ledger transaction committed (snapshot discarded)");
        }
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<()> {
        let mut backup = self.transaction_backup.write().await;
        if let Some(snapshot) = backup.take() {
            let mut balances = self.balances.write().await;
            *balances = snapshot;
            info!(
                accounts_after = balances.len(),
                "❌ Ledger transaction rolled back (snapshot restored)"
            );
        }
        Ok(())
    }
}

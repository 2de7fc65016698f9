use hashtag_types::AccountAddress;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Reputation credited to each party on a successful terminal outcome.
pub const REPUTATION_QUANTUM: u64 = 5;

/// Per-role reputation scores.
///
/// Scores only ever grow: one fixed quantum per item that reaches `Paid`
/// or `Resolved`, credited to the seeker on the seeker ledger and to the
/// provider on the provider ledger. Never reset, never transferable.
pub struct ReputationLedger {
    seeker_scores: Arc<RwLock<HashMap<AccountAddress, u64>>>,
    provider_scores: Arc<RwLock<HashMap<AccountAddress, u64>>>,
}

impl Default for ReputationLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ReputationLedger {
    pub fn new() -> Self {
        Self {
            seeker_scores: Arc::new(RwLock::new(HashMap::new())),
            provider_scores: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn seeker_reputation(&self, address: AccountAddress) -> u64 {
        let scores = self.seeker_scores.read().await;
        scores.get(&address).copied().unwrap_or(0)
    }

    pub async fn provider_reputation(&self, address: AccountAddress) -> u64 {
        let scores = self.provider_scores.read().await;
        scores.get(&address).copied().unwrap_or(0)
    }

    /// Credit both parties of a completed item. Called exactly once per
    /// item, on its `Paid` or `Resolved` transition.
    pub async fn credit_completion(
        &self,
        item_id: u64,
        seeker: AccountAddress,
        provider: AccountAddress,
    ) {
        let seeker_score = {
            let mut scores = self.seeker_scores.write().await;
            let score = scores.entry(seeker).or_insert(0);
            *score = score.saturating_add(REPUTATION_QUANTUM);
            *score
        };
        let provider_score = {
            let mut scores = self.provider_scores.write().await;
            let score = scores.entry(provider).or_insert(0);
            *score = score.saturating_add(REPUTATION_QUANTUM);
            *score
        };

        info!(
            item_id = item_id,
            seeker = %seeker,
            seeker_score = seeker_score,
            provider = %provider,
            provider_score = provider_score,
            "⭐ Reputation credited"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scores_start_at_zero() {
        let ledger = ReputationLedger::new();
        let addr = AccountAddress::from_bytes([1; 32]);
        assert_eq!(ledger.seeker_reputation(addr).await, 0);
        assert_eq!(ledger.provider_reputation(addr).await, 0);
    }

    #[tokio::test]
    async fn test_credit_is_per_role() {
        let ledger = ReputationLedger::new();
        let seeker = AccountAddress::from_bytes([1; 32]);
        let provider = AccountAddress::from_bytes([2; 32]);

        ledger.credit_completion(0, seeker, provider).await;

        assert_eq!(ledger.seeker_reputation(seeker).await, REPUTATION_QUANTUM);
        assert_eq!(ledger.provider_reputation(seeker).await, 0);
        assert_eq!(
            ledger.provider_reputation(provider).await,
            REPUTATION_QUANTUM
        );
        assert_eq!(ledger.seeker_reputation(provider).await, 0);
    }

    #[tokio::test]
    async fn test_scores_accumulate() {
        let ledger = ReputationLedger::new();
        let seeker = AccountAddress::from_bytes([1; 32]);
        let provider = AccountAddress::from_bytes([2; 32]);

        ledger.credit_completion(0, seeker, provider).await;
        ledger.credit_completion(1, seeker, provider).await;

        assert_eq!(
            ledger.seeker_reputation(seeker).await,
            2 * REPUTATION_QUANTUM
        );
        assert_eq!(
            ledger.provider_reputation(provider).await,
            2 * REPUTATION_QUANTUM
        );
    }
}

use crate::item::ItemStatus;
use chrono::{DateTime, Utc};
use hashtag_types::{AccountAddress, ContentHash, TokenAmount};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Structured change record emitted by every mutating operation.
///
/// Off-chain indexers rebuild marketplace state from these; emission is a
/// required side effect of each mutation, not optional logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashtagEvent {
    PayoutAddressSet {
        payout_address: AccountAddress,
    },
    HashtagFeeSet {
        hashtag_fee: TokenAmount,
    },
    MetadataHashSet {
        hashtag_metadata_hash: ContentHash,
    },
    NewItem {
        item_id: u64,
        owner: AccountAddress,
        item_value: TokenAmount,
        item_metadata_hash: ContentHash,
    },
    ReplyItem {
        item_id: u64,
        replier: AccountAddress,
        reply_metadata_hash: ContentHash,
    },
    FundItem {
        item_id: u64,
        provider: AccountAddress,
    },
    ItemChange {
        item_id: u64,
        status: ItemStatus,
        provider: Option<AccountAddress>,
    },
}

/// A recorded event with its emission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub event: HashtagEvent,
}

/// Append-only event history with optional live forwarding.
///
/// Every event lands in the in-memory history; when a subscriber channel
/// is attached the record is also forwarded, and a dropped receiver only
/// produces a warning, never a failed mutation.
pub struct EventLog {
    records: Arc<RwLock<Vec<EventRecord>>>,
    event_tx: Option<mpsc::UnboundedSender<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            event_tx: None,
        }
    }

    pub fn with_subscriber() -> (Self, mpsc::UnboundedReceiver<EventRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let log = Self {
            records: Arc::new(RwLock::new(Vec::new())),
            event_tx: Some(tx),
        };
        (log, rx)
    }

    pub async fn emit(&self, event: HashtagEvent) {
        let record = EventRecord {
            timestamp: Utc::now(),
            event,
        };

        {
            let mut records = self.records.write().await;
            records.push(record.clone());
        }

        if let Some(ref tx) = self.event_tx {
            if let Err(e) = tx.send(record.clone()) {
                warn!(error = %e, "Failed to forward hashtag event");
            } else {
                debug!(event = ?record.event, "Hashtag event emitted");
            }
        }
    }

    pub async fn history(&self) -> Vec<EventRecord> {
        let records = self.records.read().await;
        records.clone()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

//! # Hashtag Simple Deal
//!
//! Escrow deal state machine for a peer-to-peer task marketplace.
//!
//! ## Overview
//!
//! A seeker posts an item with a budget and deposits
//! `item_value + fee/2`; providers reply; the seeker selects one; the
//! provider matches the deposit; on completion the seeker releases the
//! whole pool to the provider, or either side disputes and the maintainer
//! arbitrates a split. The contract only custodies escrow on an external
//! value ledger — balances, registries, and metadata blobs all live
//! elsewhere behind narrow interfaces.
//!
//! ## Architecture
//!
//! - **Config store** ([`HashtagConfig`]): maintainer payout address,
//!   current fee, hashtag metadata; owner-gated mutation.
//! - **Item ledger** ([`SimpleDeal`]): the authoritative item map and all
//!   state transitions (`Open → Funded → Paid` plus dispute and
//!   cancellation branches).
//! - **Deposit router** ([`DepositAction`]): decodes the value ledger's
//!   opaque deposit payload once, at the boundary.
//! - **Arbitration engine** ([`arbitration::split`]): the single source of
//!   dispute disbursement math.
//! - **Reputation accrual** ([`ReputationLedger`]): monotone per-role
//!   scores, one fixed quantum per completed item.
//! - **Event records** ([`HashtagEvent`]): structured change records for
//!   off-chain indexers, emitted by every mutation.

pub mod arbitration;
pub mod config;
pub mod deal;
pub mod error;
pub mod events;
pub mod item;
pub mod reputation;
pub mod router;

pub use arbitration::Split;
pub use config::HashtagConfig;
pub use deal::SimpleDeal;
pub use error::{DealError, Result};
pub use events::{EventLog, EventRecord, HashtagEvent};
pub use item::{Item, ItemStatus, Reply};
pub use reputation::{ReputationLedger, REPUTATION_QUANTUM};
pub use router::{DepositAction, ACTION_CREATE, ACTION_FUND};

//! Value-ledger boundary for the hashtag marketplace.
//!
//! The marketplace never holds balances itself; it custodies escrow on an
//! external fungible-token ledger and reacts to deposits that ledger pushes
//! at it. This crate defines the two seams:
//!
//! - [`TokenLedger`]: what the marketplace consumes (balance reads,
//!   outbound transfers, transaction brackets, chain height).
//! - [`TokenReceiver`]: what the marketplace implements (the
//!   "value arrived with payload" callback).
//!
//! Deposits are push-based: the ledger moves funds into the receiver's
//! account first and invokes the callback second. The receiver can only
//! decide what state transition to apply; rejecting the deposit means
//! failing the callback so the ledger rolls the entire transfer back.
//!
//! [`MemoryToken`] is an in-memory reference ledger implementing these
//! seams, used by tests and demos.

pub mod ledger;
pub mod memory;

pub use ledger::{TokenLedger, TokenReceiver};
pub use memory::{MemoryToken, TransferRecord};

pub mod address;
pub mod amount;
pub mod hash;
pub mod lifecycle;

pub use address::AccountAddress;
pub use amount::{TokenAmount, TOKEN_BASE_UNIT, TOKEN_DECIMALS};
pub use hash::ContentHash;
pub use lifecycle::LifecycleState;

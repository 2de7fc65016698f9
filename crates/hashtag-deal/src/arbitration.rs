//! Arbitration math for disputed items.
//!
//! The maintainer proposes how much of the escrow pool flows back to the
//! seeker; everything else belongs to the provider, and the collected fee
//! goes to the maintainer. This is the only place the split is computed;
//! `resolve_item` consumes it verbatim.

use crate::error::{DealError, Result};
use hashtag_types::TokenAmount;

/// Final disbursement of one arbitrated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub seeker_payout: TokenAmount,
    pub provider_payout: TokenAmount,
    pub maintainer_payout: TokenAmount,
}

/// Compute the dispute split for a funded escrow pool.
///
/// `seeker_fraction` must lie in `[0, 2 * item_value]`; the provider
/// receives the remainder of the doubled item value and the maintainer
/// receives both collected fee halves. The three payouts always sum to
/// the full pool `2 * item_value + 2 * (fee / 2)`.
pub fn split(
    item_value: TokenAmount,
    fee_snapshot: TokenAmount,
    seeker_fraction: TokenAmount,
) -> Result<Split> {
    let pool_value = item_value
        .checked_double()
        .ok_or(DealError::ArithmeticOverflow)?;

    if seeker_fraction > pool_value {
        return Err(DealError::RangeError {
            fraction: seeker_fraction.to_string(),
            max: pool_value.to_string(),
        });
    }

    let provider_payout = pool_value
        .checked_sub(seeker_fraction)
        .ok_or(DealError::ArithmeticOverflow)?;
    let maintainer_payout = fee_snapshot
        .half()
        .checked_double()
        .ok_or(DealError::ArithmeticOverflow)?;

    Ok(Split {
        seeker_payout: seeker_fraction,
        provider_payout,
        maintainer_payout,
    })
}

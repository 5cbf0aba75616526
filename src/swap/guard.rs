//! Pre-flight headroom checks. Nothing here talks to the network; a
//! rejection means no invoice or payment has been attempted.

use super::error::SwapError;
use super::{ChannelRef, Leg, SwapAsset, SwapIntent};

/// Bitcoin legs and the asset receive leg must keep a tenth of the channel
/// capacity on the paying side after the swap.
const RESERVE_DIVISOR: i128 = 10;

/// Asset send legs only need to stay at or above one unit.
const MIN_ASSET_SEND_HEADROOM: i128 = 1;

pub fn check_balance(intent: &SwapIntent) -> Result<(), SwapError> {
    check_amounts(
        intent,
        intent.amount_predicted(Leg::Send),
        intent.amount_predicted(Leg::Receive),
    )
}

/// Same check against explicit amounts, used again once the quote has fixed
/// the counter-amount.
pub fn check_amounts(intent: &SwapIntent, send: i64, receive: i64) -> Result<(), SwapError> {
    for (leg, amount) in [(Leg::Send, send), (Leg::Receive, receive)] {
        let asset = intent.asset(leg);
        let channel = intent.channel(leg).ok_or(SwapError::NoChannel { leg, asset: *asset })?;
        check_leg(leg, asset, amount, channel)?;
    }
    Ok(())
}

fn check_leg(leg: Leg, asset: &SwapAsset, amount: i64, channel: &ChannelRef) -> Result<(), SwapError> {
    let (balance, required) = match asset {
        SwapAsset::Bitcoin => {
            let balance = match leg {
                Leg::Send => channel.local_balance,
                Leg::Receive => channel.remote_balance,
            };
            (balance, Required::Reserve(channel.capacity))
        }
        SwapAsset::Taproot(asset_id) => {
            let assets = channel
                .asset_balance(asset_id)
                .ok_or(SwapError::NoChannel { leg, asset: *asset })?;
            match leg {
                Leg::Send => (assets.local_balance, Required::AtLeast(MIN_ASSET_SEND_HEADROOM)),
                Leg::Receive => (assets.remote_balance, Required::Reserve(assets.capacity)),
            }
        }
    };

    let headroom = i128::from(balance) - i128::from(amount);
    let ok = match required {
        Required::Reserve(capacity) => headroom * RESERVE_DIVISOR >= i128::from(capacity),
        Required::AtLeast(min) => headroom >= min,
    };

    if !ok {
        tracing::warn!(
            %leg,
            %asset,
            chan_id = channel.chan_id,
            balance,
            amount,
            "capacity guard rejected swap"
        );
        return Err(SwapError::InsufficientBalance {
            leg,
            asset: *asset,
            balance,
            amount,
            required: required.headroom(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Required {
    Reserve(i64),
    AtLeast(i128),
}

impl Required {
    fn headroom(&self) -> i64 {
        match *self {
            // ceil(capacity / 10)
            Self::Reserve(capacity) => {
                let capacity = i128::from(capacity);
                i64::try_from((capacity + RESERVE_DIVISOR - 1).div_euclid(RESERVE_DIVISOR))
                    .unwrap_or(i64::MAX)
            }
            Self::AtLeast(min) => i64::try_from(min).unwrap_or(i64::MAX),
        }
    }
}

use super::{ChannelRef, Leg, SwapAsset};

/// Picks the channel a swap leg is routed over.
pub trait ChannelSelector: Send + Sync {
    fn select(&self, channels: &[ChannelRef], asset: &SwapAsset, leg: Leg) -> Option<ChannelRef>;
}

/// Bitcoin legs use the public channel with the most usable balance on the
/// leg's side (first seen wins ties). Asset legs use the first private asset
/// channel, in listing order, that holds the asset on the leg's side, without
/// comparing balances across candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatchChannelSelector;

impl ChannelSelector for FirstMatchChannelSelector {
    fn select(&self, channels: &[ChannelRef], asset: &SwapAsset, leg: Leg) -> Option<ChannelRef> {
        match asset {
            SwapAsset::Bitcoin => {
                let balance = |c: &ChannelRef| match leg {
                    Leg::Send => c.local_balance,
                    Leg::Receive => c.remote_balance,
                };
                channels
                    .iter()
                    .filter(|c| !c.private)
                    .fold(None::<&ChannelRef>, |best, c| match best {
                        Some(b) if balance(b) >= balance(c) => Some(b),
                        _ => Some(c),
                    })
                    .cloned()
            }
            SwapAsset::Taproot(asset_id) => channels
                .iter()
                .filter(|c| c.private)
                .find(|c| {
                    c.asset_data.as_ref().is_some_and(|data| match leg {
                        Leg::Send => data.has_local(asset_id),
                        Leg::Receive => data.has_remote(asset_id),
                    })
                })
                .cloned(),
        }
    }
}

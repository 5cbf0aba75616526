//! Decoding of the custom channel data lnd attaches to Taproot Asset
//! channels (`lnrpc.Channel.custom_channel_data`), which tapd fills with a
//! JSON document.

use serde::Deserialize;

use crate::swap::AssetId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssetChannelData {
    #[serde(default)]
    pub funding_assets: Vec<FundedAsset>,
    #[serde(default)]
    pub local_assets: Vec<AssetAmount>,
    #[serde(default)]
    pub remote_assets: Vec<AssetAmount>,
    #[serde(default)]
    pub capacity: u64,
    #[serde(default)]
    pub local_balance: u64,
    #[serde(default)]
    pub remote_balance: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssetAmount {
    pub asset_id: String,
    #[serde(default)]
    pub amount: u64,
}

/// Per-asset funding entry. Only present in newer tapd releases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FundedAsset {
    pub asset_genesis: AssetGenesis,
    #[serde(default)]
    pub amount: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssetGenesis {
    pub asset_id: String,
}

/// Balances of one asset inside an asset channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetLegBalance {
    pub asset_id: AssetId,
    pub local_balance: i64,
    pub remote_balance: i64,
    pub capacity: i64,
}

impl AssetChannelData {
    /// Returns `None` for empty or undecodable data, which marks the channel
    /// as not carrying assets.
    pub fn decode(raw: &[u8]) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_slice(raw) {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::debug!(error = %err, "ignore undecodable custom channel data");
                None
            }
        }
    }

    pub fn has_local(&self, asset_id: &AssetId) -> bool {
        contains(&self.local_assets, asset_id)
    }

    pub fn has_remote(&self, asset_id: &AssetId) -> bool {
        contains(&self.remote_assets, asset_id)
    }

    pub fn balance_for(&self, asset_id: &AssetId) -> Option<AssetLegBalance> {
        if !self.has_local(asset_id) && !self.has_remote(asset_id) {
            return None;
        }

        let funded: u64 = self
            .funding_assets
            .iter()
            .filter(|a| matches_id(&a.asset_genesis.asset_id, asset_id))
            .map(|a| a.amount)
            .sum();
        let capacity = if funded > 0 { funded } else { self.capacity };

        Some(AssetLegBalance {
            asset_id: *asset_id,
            local_balance: saturating_i64(sum(&self.local_assets, asset_id)),
            remote_balance: saturating_i64(sum(&self.remote_assets, asset_id)),
            capacity: saturating_i64(capacity),
        })
    }
}

fn matches_id(raw: &str, asset_id: &AssetId) -> bool {
    raw.parse::<AssetId>().is_ok_and(|id| id == *asset_id)
}

fn contains(entries: &[AssetAmount], asset_id: &AssetId) -> bool {
    entries.iter().any(|a| matches_id(&a.asset_id, asset_id))
}

fn sum(entries: &[AssetAmount], asset_id: &AssetId) -> u64 {
    entries
        .iter()
        .filter(|a| matches_id(&a.asset_id, asset_id))
        .map(|a| a.amount)
        .sum()
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

pub mod channel_data;
pub mod tapd;

use anyhow::Result;
use async_trait::async_trait;
use bitcoin::secp256k1::PublicKey;

use crate::swap::{AssetId, PaymentOutcome};

/// Rate of the buy quote the peer accepted while an asset invoice was
/// created, in the same fixed-point encoding as `PriceQuote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedRate {
    pub coefficient: String,
    pub scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInvoice {
    pub invoice: String,
    pub accepted_rate: Option<AcceptedRate>,
}

/// Asset-channel side of the node (tapd's `TaprootAssetChannels`).
#[async_trait]
pub trait AssetChannelNode: Send + Sync {
    async fn create_asset_invoice(
        &self,
        asset_id: &AssetId,
        amount: u64,
        peer: &PublicKey,
        memo: &str,
    ) -> Result<AssetInvoice>;

    async fn pay_asset_invoice(
        &self,
        invoice: &str,
        asset_id: &AssetId,
        peer: &PublicKey,
        chan_id: u64,
        fee_limit_sat: i64,
        allow_self_payment: bool,
    ) -> Result<PaymentOutcome>;
}

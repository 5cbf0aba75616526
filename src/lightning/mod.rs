pub mod invoice;
pub mod lnd;

use anyhow::Result;
use async_trait::async_trait;
use bitcoin::secp256k1::PublicKey;

use crate::swap::{ChannelRef, PaymentOutcome};

/// The Lightning node the swap legs are invoiced and paid through.
#[async_trait]
pub trait LightningNode: Send + Sync {
    async fn list_channels(&self, peer: &PublicKey) -> Result<Vec<ChannelRef>>;

    /// BOLT11 invoice for `amount_sat`, hinted over `channel`.
    async fn create_invoice(&self, amount_sat: i64, memo: &str, channel: &ChannelRef)
    -> Result<String>;

    async fn pay(
        &self,
        invoice: &str,
        chan_id: u64,
        fee_limit_sat: i64,
        allow_self_payment: bool,
    ) -> Result<PaymentOutcome>;
}

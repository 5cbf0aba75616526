//! Remote channel-swap service: RFQ peer discovery, price quotes and
//! settlement bookkeeping.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::swap::{PriceQuote, SwapMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    pub send_asset: String,
    pub send_amount: i64,
    pub recv_asset: String,
    pub recv_amount: i64,
    pub slippage: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteResponse {
    pub coefficient: String,
    pub scale: u32,
    pub rfq_id: String,
}

impl From<QuoteResponse> for PriceQuote {
    fn from(resp: QuoteResponse) -> Self {
        Self {
            coefficient: resp.coefficient,
            scale: resp.scale,
            quote_id: resp.rfq_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub asset_id: String,
    pub rfq_id: String,
    pub success: bool,
}

#[async_trait]
pub trait SwapCoordinator: Send + Sync {
    /// Hex-encoded pubkey of the node that quotes and takes the other side
    /// of in-channel swaps.
    async fn rfq_peer_pubkey(&self, auth_token: &str) -> Result<String>;

    async fn request_quote(
        &self,
        mode: SwapMode,
        request: &QuoteRequest,
        auth_token: &str,
    ) -> Result<PriceQuote>;

    async fn report_settlement(&self, report: &SettlementReport, auth_token: &str) -> Result<()>;
}

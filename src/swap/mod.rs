pub mod channel;
pub mod deadline;
pub mod error;
pub mod executor;
pub mod guard;
pub mod orchestrator;
pub mod quote;
pub mod rate;
pub mod service;

use std::fmt;
use std::str::FromStr;

use bitcoin::secp256k1::PublicKey;
use uuid::Uuid;

use crate::taproot::channel_data::{AssetChannelData, AssetLegBalance};

/// Asset string reserved for native bitcoin on both the RPC surface and the
/// channel-swap service.
pub const BITCOIN_ASSET: &str = "btc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId([u8; 32]);

impl AssetId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for AssetId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| anyhow::anyhow!("decode asset id hex: {e}"))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| anyhow::anyhow!("asset id must be 32 bytes, got {}", b.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapAsset {
    Bitcoin,
    Taproot(AssetId),
}

impl SwapAsset {
    pub fn is_bitcoin(&self) -> bool {
        matches!(self, Self::Bitcoin)
    }

    pub fn asset_id(&self) -> Option<&AssetId> {
        match self {
            Self::Bitcoin => None,
            Self::Taproot(id) => Some(id),
        }
    }
}

impl FromStr for SwapAsset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(BITCOIN_ASSET) {
            return Ok(Self::Bitcoin);
        }
        Ok(Self::Taproot(s.parse()?))
    }
}

impl fmt::Display for SwapAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitcoin => f.write_str(BITCOIN_ASSET),
            Self::Taproot(id) => id.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Send,
    Receive,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => f.write_str("send"),
            Self::Receive => f.write_str("receive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMode {
    ExactSend,
    ExactReceive,
}

impl fmt::Display for SwapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactSend => f.write_str("exact_send"),
            Self::ExactReceive => f.write_str("exact_receive"),
        }
    }
}

/// States a swap passes through, in order. Every swap starts and ends in
/// `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStage {
    Idle,
    LockAcquired,
    PeerResolved,
    ChannelsSelected,
    BalanceChecked,
    QuoteObtained,
    Executed,
    Reported,
}

impl fmt::Display for SwapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::LockAcquired => "lock_acquired",
            Self::PeerResolved => "peer_resolved",
            Self::ChannelsSelected => "channels_selected",
            Self::BalanceChecked => "balance_checked",
            Self::QuoteObtained => "quote_obtained",
            Self::Executed => "executed",
            Self::Reported => "reported",
        };
        f.write_str(s)
    }
}

/// Caller input for one swap. Which of the two amounts is authoritative
/// depends on the `SwapMode` it is submitted under.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub send_asset: SwapAsset,
    pub send_amount: i64,
    pub receive_asset: SwapAsset,
    pub receive_amount: i64,
    pub slippage_bps: u16,
    pub auth_token: String,
}

/// Snapshot of one channel with the counterparty, taken once per swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub chan_id: u64,
    pub remote_pubkey: String,
    pub active: bool,
    pub private: bool,
    pub capacity: i64,
    pub local_balance: i64,
    pub remote_balance: i64,
    pub asset_data: Option<AssetChannelData>,
}

impl ChannelRef {
    pub fn asset_balance(&self, asset_id: &AssetId) -> Option<AssetLegBalance> {
        self.asset_data.as_ref()?.balance_for(asset_id)
    }
}

/// Fixed-point exchange rate handed out by the quote service:
/// `coefficient / 10^scale` asset units per bitcoin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub coefficient: String,
    pub scale: u32,
    pub quote_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unknown,
    InFlight,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub status: PaymentStatus,
    pub failure_reason: String,
    pub payment_hash: String,
    pub fee_sat: i64,
}

/// One swap attempt. Lives for the duration of a single orchestrator call
/// and is filled in stage by stage.
#[derive(Debug, Clone)]
pub struct SwapIntent {
    pub attempt_id: Uuid,
    pub mode: SwapMode,
    pub send_asset: SwapAsset,
    pub receive_asset: SwapAsset,
    pub send_amount_predicted: i64,
    pub receive_amount_predicted: i64,
    pub slippage_bps: u16,
    pub route_peer: Option<PublicKey>,
    pub send_channel: Option<ChannelRef>,
    pub receive_channel: Option<ChannelRef>,
    pub quote: Option<PriceQuote>,
    pub success: bool,
}

impl SwapIntent {
    pub fn new(mode: SwapMode, request: &SwapRequest) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            mode,
            send_asset: request.send_asset,
            receive_asset: request.receive_asset,
            send_amount_predicted: request.send_amount,
            receive_amount_predicted: request.receive_amount,
            slippage_bps: request.slippage_bps,
            route_peer: None,
            send_channel: None,
            receive_channel: None,
            quote: None,
            success: false,
        }
    }

    pub fn asset(&self, leg: Leg) -> &SwapAsset {
        match leg {
            Leg::Send => &self.send_asset,
            Leg::Receive => &self.receive_asset,
        }
    }

    pub fn amount_predicted(&self, leg: Leg) -> i64 {
        match leg {
            Leg::Send => self.send_amount_predicted,
            Leg::Receive => self.receive_amount_predicted,
        }
    }

    pub fn channel(&self, leg: Leg) -> Option<&ChannelRef> {
        match leg {
            Leg::Send => self.send_channel.as_ref(),
            Leg::Receive => self.receive_channel.as_ref(),
        }
    }

    pub fn quote_id(&self) -> Option<&str> {
        self.quote
            .as_ref()
            .map(|q| q.quote_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// The Taproot Asset side of the pair. Settlement is reported under this
    /// id regardless of swap direction.
    pub fn settlement_asset(&self) -> Option<&AssetId> {
        self.send_asset
            .asset_id()
            .or_else(|| self.receive_asset.asset_id())
    }
}

/// What a completed swap hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub attempt_id: String,
    pub rfq_id: String,
    pub send_amount: i64,
    pub receive_amount: i64,
    pub payment_hash: String,
    pub fee_sat: i64,
}

use thiserror::Error;

use super::executor::DISPATCH_PAYMENT_STEP;
use super::rate::RateError;
use super::{Leg, PaymentStatus, SwapAsset};

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("swap already in progress")]
    InProgress,

    #[error("invalid swap request: {0}")]
    InvalidRequest(String),

    #[error("resolve rfq peer: {0:#}")]
    PeerResolution(anyhow::Error),

    #[error("list channels: {0:#}")]
    ChannelListing(anyhow::Error),

    #[error("no eligible {leg} channel for asset {asset}")]
    NoChannel { leg: Leg, asset: SwapAsset },

    #[error(
        "insufficient {leg} balance for asset {asset}: balance={balance} amount={amount} required_headroom={required}"
    )]
    InsufficientBalance {
        leg: Leg,
        asset: SwapAsset,
        balance: i64,
        amount: i64,
        required: i64,
    },

    #[error("request quote: {0:#}")]
    Quote(anyhow::Error),

    #[error("rate conversion: {0}")]
    Rate(#[from] RateError),

    #[error("price check failed: quoted rate {quoted}, invoice accepted rate {accepted}")]
    PriceCheck { quoted: String, accepted: String },

    #[error("create invoice: {0:#}")]
    Invoice(anyhow::Error),

    #[error("dispatch payment: {0:#}")]
    Payment(anyhow::Error),

    #[error("payment did not succeed: status={status:?} reason={reason}")]
    PaymentFailed { status: PaymentStatus, reason: String },

    #[error("timed out during {step}")]
    Timeout { step: &'static str },
}

impl SwapError {
    /// True for failures raised before any invoice or payment RPC ran.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::PeerResolution(_)
                | Self::ChannelListing(_)
                | Self::NoChannel { .. }
                | Self::InsufficientBalance { .. }
        )
    }

    /// True when the deadline expired after the payment was handed to the
    /// node. The payment may still settle.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::Timeout { step } if *step == DISPATCH_PAYMENT_STEP)
    }
}

#![allow(dead_code)]

pub mod fakes;

use tap_channel_swap::swap::{AssetId, ChannelRef, PriceQuote, SwapAsset, SwapRequest};
use tap_channel_swap::taproot::channel_data::{AssetAmount, AssetChannelData};

/// secp256k1 generator point, a valid compressed pubkey.
pub const PEER_PUBKEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

pub const ASSET_X: &str = "1111111111111111111111111111111111111111111111111111111111111111";
pub const ASSET_Y: &str = "2222222222222222222222222222222222222222222222222222222222222222";

pub fn asset(hex_id: &str) -> AssetId {
    hex_id.parse().expect("valid asset id")
}

pub fn taproot(hex_id: &str) -> SwapAsset {
    SwapAsset::Taproot(asset(hex_id))
}

/// 10 sat per unit: 1e7 units per BTC.
pub fn ten_sat_quote(rfq_id: &str) -> PriceQuote {
    PriceQuote {
        coefficient: "1000000000".to_string(),
        scale: 2,
        quote_id: rfq_id.to_string(),
    }
}

pub fn btc_channel(chan_id: u64, local: i64, remote: i64, capacity: i64) -> ChannelRef {
    ChannelRef {
        chan_id,
        remote_pubkey: PEER_PUBKEY.to_string(),
        active: true,
        private: false,
        capacity,
        local_balance: local,
        remote_balance: remote,
        asset_data: None,
    }
}

pub fn asset_channel(
    chan_id: u64,
    asset_hex: &str,
    local_units: u64,
    remote_units: u64,
    capacity_units: u64,
) -> ChannelRef {
    ChannelRef {
        chan_id,
        remote_pubkey: PEER_PUBKEY.to_string(),
        active: true,
        private: true,
        capacity: 100_000,
        local_balance: 10_000,
        remote_balance: 10_000,
        asset_data: Some(AssetChannelData {
            funding_assets: Vec::new(),
            local_assets: vec![AssetAmount {
                asset_id: asset_hex.to_string(),
                amount: local_units,
            }],
            remote_assets: vec![AssetAmount {
                asset_id: asset_hex.to_string(),
                amount: remote_units,
            }],
            capacity: capacity_units,
            local_balance: local_units,
            remote_balance: remote_units,
        }),
    }
}

pub fn request(
    send_asset: SwapAsset,
    send_amount: i64,
    receive_asset: SwapAsset,
    receive_amount: i64,
) -> SwapRequest {
    SwapRequest {
        send_asset,
        send_amount,
        receive_asset,
        receive_amount,
        slippage_bps: 50,
        auth_token: "token-1".to_string(),
    }
}

mod support;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tap_channel_swap::proto::v1 as pb;
use tap_channel_swap::proto::v1::channel_swap_server::ChannelSwap as _;
use tap_channel_swap::swap::error::SwapError;
use tap_channel_swap::swap::orchestrator::{SwapConfig, SwapOrchestrator};
use tap_channel_swap::swap::service::{ChannelSwapService, status_from_error};
use tap_channel_swap::swap::{Leg, PaymentStatus, SwapAsset};
use tonic::{Code, Request};

use support::fakes::{FakeAssets, FakeCoordinator, FakeLightning, PAYMENT_HASH};
use support::{ASSET_X, PEER_PUBKEY, asset_channel, btc_channel, taproot, ten_sat_quote};

fn service() -> (ChannelSwapService, Arc<FakeLightning>) {
    let ln = Arc::new(FakeLightning::new(vec![
        btc_channel(1, 500_000, 500_000, 1_000_000),
        asset_channel(2, ASSET_X, 20_000, 50_000, 100_000),
    ]));
    let orchestrator = SwapOrchestrator::new(
        SwapConfig::default(),
        ln.clone(),
        Arc::new(FakeAssets::accepting("1000000000", 2)),
        Arc::new(FakeCoordinator::new(PEER_PUBKEY, ten_sat_quote("rfq-1"))),
    );
    (ChannelSwapService::new(Arc::new(orchestrator)), ln)
}

fn pb_request(send_asset: &str, send_amount: i64, receive_asset: &str, receive_amount: i64) -> pb::SwapRequest {
    pb::SwapRequest {
        send_asset: send_asset.to_string(),
        send_amount,
        receive_asset: receive_asset.to_string(),
        receive_amount,
        slippage_bps: 50,
        auth_token: "token-1".to_string(),
    }
}

#[tokio::test]
async fn swap_exact_send_returns_receipt() -> Result<()> {
    let (svc, ln) = service();

    let resp = svc
        .swap_exact_send(Request::new(pb_request("BTC", 100_000, ASSET_X, 10_000)))
        .await
        .context("SwapExactSend")?
        .into_inner();

    assert!(resp.success);
    assert_eq!(resp.rfq_id, "rfq-1");
    assert_eq!(resp.send_amount, 100_000);
    assert_eq!(resp.receive_amount, 10_000);
    assert_eq!(resp.payment_hash, PAYMENT_HASH);
    assert_eq!(resp.fee_sat, 3);
    assert!(!resp.attempt_id.is_empty());
    assert_eq!(ln.payment_count(), 1);
    Ok(())
}

#[tokio::test]
async fn swap_exact_receive_returns_receipt() -> Result<()> {
    let (svc, _) = service();

    let resp = svc
        .swap_exact_receive(Request::new(pb_request(ASSET_X, 5_000, "btc", 50_000)))
        .await
        .context("SwapExactReceive")?
        .into_inner();
    assert_eq!(resp.send_amount, 5_000);
    assert_eq!(resp.receive_amount, 50_000);
    Ok(())
}

#[tokio::test]
async fn malformed_asset_is_invalid_argument() {
    let (svc, ln) = service();

    let status = svc
        .swap_exact_send(Request::new(pb_request("btc", 100_000, "not-hex", 10_000)))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(status.message().contains("receive_asset"));
    assert_eq!(ln.list_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_slippage_is_invalid_argument() {
    let (svc, _) = service();
    let mut req = pb_request("btc", 100_000, ASSET_X, 10_000);
    req.slippage_bps = 70_000;

    let status = svc.swap_exact_send(Request::new(req)).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn missing_auth_token_is_unauthenticated() {
    let (svc, _) = service();
    let mut req = pb_request("btc", 100_000, ASSET_X, 10_000);
    req.auth_token = "  ".to_string();

    let status = svc.swap_exact_send(Request::new(req)).await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn guard_rejection_is_failed_precondition() {
    let (svc, _) = service();

    let status = svc
        .swap_exact_send(Request::new(pb_request("btc", 900_000, ASSET_X, 10_000)))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
    assert!(status.message().contains("insufficient"));
}

#[test]
fn swap_errors_map_to_grpc_codes() {
    let cases = [
        (SwapError::InProgress, Code::Aborted),
        (
            SwapError::InvalidRequest("bad".to_string()),
            Code::InvalidArgument,
        ),
        (
            SwapError::PeerResolution(anyhow::anyhow!("down")),
            Code::FailedPrecondition,
        ),
        (
            SwapError::NoChannel {
                leg: Leg::Send,
                asset: SwapAsset::Bitcoin,
            },
            Code::FailedPrecondition,
        ),
        (
            SwapError::PriceCheck {
                quoted: "1e-0".to_string(),
                accepted: "2e-0".to_string(),
            },
            Code::FailedPrecondition,
        ),
        (SwapError::Quote(anyhow::anyhow!("503")), Code::Unavailable),
        (
            SwapError::Timeout {
                step: "dispatch payment",
            },
            Code::DeadlineExceeded,
        ),
        (
            SwapError::PaymentFailed {
                status: PaymentStatus::Failed,
                reason: "FAILURE_REASON_NO_ROUTE".to_string(),
            },
            Code::Internal,
        ),
        (
            SwapError::Invoice(anyhow::anyhow!("tapd down")),
            Code::Internal,
        ),
    ];

    for (err, code) in cases {
        let status = status_from_error(&err);
        assert_eq!(status.code(), code, "{err}");
        assert_eq!(status.message(), err.to_string());
    }
}

#[test]
fn taproot_asset_display_round_trips_through_proto_strings() -> Result<()> {
    let parsed: SwapAsset = ASSET_X.parse().context("parse asset")?;
    assert_eq!(parsed, taproot(ASSET_X));
    assert_eq!(parsed.to_string(), ASSET_X);
    Ok(())
}

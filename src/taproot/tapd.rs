use anyhow::{Context as _, Result};
use async_trait::async_trait;
use bitcoin::secp256k1::PublicKey;

use super::{AcceptedRate, AssetChannelNode, AssetInvoice};
use crate::lightning::lnd::{payment_outcome, send_payment_request};
use crate::proto::lnrpc;
use crate::proto::tapchannelrpc::send_payment_response::Result as PaymentUpdate;
use crate::proto::tapchannelrpc::{
    self, taproot_asset_channels_client::TaprootAssetChannelsClient,
};
use crate::rpc::{self, AuthedChannel, NodeCredentials};
use crate::swap::{AssetId, PaymentOutcome};

#[derive(Clone)]
pub struct TapdClient {
    channels: TaprootAssetChannelsClient<AuthedChannel>,
    payment_timeout_secs: i32,
}

impl TapdClient {
    pub async fn connect(creds: &NodeCredentials, payment_timeout_secs: i32) -> Result<Self> {
        let (channel, interceptor) = rpc::connect(creds).await.context("connect tapd")?;
        Ok(Self {
            channels: TaprootAssetChannelsClient::with_interceptor(channel, interceptor),
            payment_timeout_secs,
        })
    }
}

pub fn asset_invoice_from_tapd(resp: tapchannelrpc::AddInvoiceResponse) -> Result<AssetInvoice> {
    let invoice = resp
        .invoice_result
        .map(|r| r.payment_request)
        .filter(|r| !r.is_empty())
        .context("AddInvoice response has no payment request")?;

    let accepted_rate = resp
        .accepted_buy_quote
        .and_then(|q| q.ask_asset_rate)
        .map(|r| AcceptedRate {
            coefficient: r.coefficient,
            scale: r.scale,
        });

    Ok(AssetInvoice {
        invoice,
        accepted_rate,
    })
}

#[async_trait]
impl AssetChannelNode for TapdClient {
    async fn create_asset_invoice(
        &self,
        asset_id: &AssetId,
        amount: u64,
        peer: &PublicKey,
        memo: &str,
    ) -> Result<AssetInvoice> {
        let resp = self
            .channels
            .clone()
            .add_invoice(tapchannelrpc::AddInvoiceRequest {
                asset_id: asset_id.as_bytes().to_vec(),
                asset_amount: amount,
                peer_pubkey: peer.serialize().to_vec(),
                invoice_request: Some(lnrpc::Invoice {
                    memo: memo.to_string(),
                    ..Default::default()
                }),
            })
            .await
            .context("tapchannel AddInvoice")?
            .into_inner();

        asset_invoice_from_tapd(resp)
    }

    async fn pay_asset_invoice(
        &self,
        invoice: &str,
        asset_id: &AssetId,
        peer: &PublicKey,
        chan_id: u64,
        fee_limit_sat: i64,
        allow_self_payment: bool,
    ) -> Result<PaymentOutcome> {
        let req = tapchannelrpc::SendPaymentRequest {
            asset_id: asset_id.as_bytes().to_vec(),
            asset_amount: 0,
            peer_pubkey: peer.serialize().to_vec(),
            payment_request: Some(send_payment_request(
                invoice,
                chan_id,
                fee_limit_sat,
                allow_self_payment,
                self.payment_timeout_secs,
            )),
            rfq_id: Vec::new(),
            allow_overpay: false,
        };

        let mut updates = self
            .channels
            .clone()
            .send_payment(req)
            .await
            .context("tapchannel SendPayment")?
            .into_inner();

        while let Some(update) = updates
            .message()
            .await
            .context("tapchannel SendPayment update")?
        {
            match update.result {
                Some(PaymentUpdate::AcceptedSellOrder(quote)) => {
                    tracing::debug!(
                        rfq_id = %hex::encode(&quote.id),
                        peer = %quote.peer,
                        "peer accepted sell order"
                    );
                }
                Some(PaymentUpdate::PaymentResult(payment)) => {
                    let outcome = payment_outcome(&payment);
                    if outcome.status.is_terminal() {
                        return Ok(outcome);
                    }
                }
                None => {}
            }
        }

        anyhow::bail!("asset payment stream closed before a final status")
    }
}

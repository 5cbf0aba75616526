use anyhow::{Context as _, Result};
use async_trait::async_trait;
use bitcoin::secp256k1::PublicKey;

use super::LightningNode;
use crate::proto::lnrpc::{self, lightning_client::LightningClient};
use crate::proto::routerrpc::{self, router_client::RouterClient};
use crate::rpc::{self, AuthedChannel, NodeCredentials};
use crate::swap::{ChannelRef, PaymentOutcome, PaymentStatus};
use crate::taproot::channel_data::AssetChannelData;

/// CLTV delta advertised in the route hint of swap invoices.
const HOP_HINT_CLTV_DELTA: u32 = 144;

#[derive(Clone)]
pub struct LndClient {
    lightning: LightningClient<AuthedChannel>,
    router: RouterClient<AuthedChannel>,
    payment_timeout_secs: i32,
}

impl LndClient {
    pub async fn connect(creds: &NodeCredentials, payment_timeout_secs: i32) -> Result<Self> {
        let (channel, interceptor) = rpc::connect(creds).await.context("connect lnd")?;
        Ok(Self {
            lightning: LightningClient::with_interceptor(channel.clone(), interceptor.clone()),
            router: RouterClient::with_interceptor(channel, interceptor),
            payment_timeout_secs,
        })
    }
}

pub fn channel_ref_from_lnd(channel: lnrpc::Channel) -> ChannelRef {
    ChannelRef {
        chan_id: channel.chan_id,
        remote_pubkey: channel.remote_pubkey,
        active: channel.active,
        private: channel.private,
        capacity: channel.capacity,
        local_balance: channel.local_balance,
        remote_balance: channel.remote_balance,
        asset_data: AssetChannelData::decode(&channel.custom_channel_data),
    }
}

pub fn payment_outcome(payment: &lnrpc::Payment) -> PaymentOutcome {
    use lnrpc::payment::PaymentStatus as Lnd;

    let status = match Lnd::try_from(payment.status) {
        Ok(Lnd::Succeeded) => PaymentStatus::Succeeded,
        Ok(Lnd::Failed) => PaymentStatus::Failed,
        Ok(Lnd::InFlight | Lnd::Initiated) => PaymentStatus::InFlight,
        Ok(Lnd::Unknown) | Err(_) => PaymentStatus::Unknown,
    };

    let failure_reason = match lnrpc::PaymentFailureReason::try_from(payment.failure_reason) {
        Ok(lnrpc::PaymentFailureReason::FailureReasonNone) => String::new(),
        Ok(reason) => reason.as_str_name().to_string(),
        Err(_) => format!("UNKNOWN({})", payment.failure_reason),
    };

    PaymentOutcome {
        status,
        failure_reason,
        payment_hash: payment.payment_hash.clone(),
        fee_sat: payment.fee_sat,
    }
}

pub fn send_payment_request(
    invoice: &str,
    chan_id: u64,
    fee_limit_sat: i64,
    allow_self_payment: bool,
    timeout_seconds: i32,
) -> routerrpc::SendPaymentRequest {
    routerrpc::SendPaymentRequest {
        payment_request: invoice.to_string(),
        timeout_seconds,
        fee_limit_sat,
        allow_self_payment,
        outgoing_chan_ids: vec![chan_id],
        no_inflight_updates: true,
        ..Default::default()
    }
}

#[async_trait]
impl LightningNode for LndClient {
    async fn list_channels(&self, peer: &PublicKey) -> Result<Vec<ChannelRef>> {
        let resp = self
            .lightning
            .clone()
            .list_channels(lnrpc::ListChannelsRequest {
                peer: peer.serialize().to_vec(),
                ..Default::default()
            })
            .await
            .context("ListChannels")?
            .into_inner();

        Ok(resp.channels.into_iter().map(channel_ref_from_lnd).collect())
    }

    async fn create_invoice(
        &self,
        amount_sat: i64,
        memo: &str,
        channel: &ChannelRef,
    ) -> Result<String> {
        let hint = lnrpc::RouteHint {
            hop_hints: vec![lnrpc::HopHint {
                node_id: channel.remote_pubkey.clone(),
                chan_id: channel.chan_id,
                fee_base_msat: 0,
                fee_proportional_millionths: 0,
                cltv_expiry_delta: HOP_HINT_CLTV_DELTA,
            }],
        };

        let resp = self
            .lightning
            .clone()
            .add_invoice(lnrpc::Invoice {
                memo: memo.to_string(),
                value: amount_sat,
                route_hints: vec![hint],
                private: channel.private,
                ..Default::default()
            })
            .await
            .context("AddInvoice")?
            .into_inner();

        Ok(resp.payment_request)
    }

    async fn pay(
        &self,
        invoice: &str,
        chan_id: u64,
        fee_limit_sat: i64,
        allow_self_payment: bool,
    ) -> Result<PaymentOutcome> {
        let req = send_payment_request(
            invoice,
            chan_id,
            fee_limit_sat,
            allow_self_payment,
            self.payment_timeout_secs,
        );

        let mut updates = self
            .router
            .clone()
            .send_payment_v2(req)
            .await
            .context("SendPaymentV2")?
            .into_inner();

        while let Some(payment) = updates.message().await.context("SendPaymentV2 update")? {
            let outcome = payment_outcome(&payment);
            if outcome.status.is_terminal() {
                return Ok(outcome);
            }
            tracing::debug!(payment_hash = %outcome.payment_hash, status = ?outcome.status, "payment update");
        }

        anyhow::bail!("payment stream closed before a final status")
    }
}

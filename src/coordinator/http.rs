use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{QuoteRequest, QuoteResponse, SettlementReport, SwapCoordinator};
use crate::swap::{PriceQuote, SwapMode};

pub const RFQ_PEER_PUBKEY_PATH: &str = "/channelSwap/v1/getRfqPeerPubkey";
pub const SWAP_EXACT_SEND_PATH: &str = "/channelSwap/v1/swapExactSendInChannel";
pub const SWAP_EXACT_RECEIVE_PATH: &str = "/channelSwap/v1/swapExactReceiveInChannel";
pub const UPDATE_SWAP_TRANS_PATH: &str = "/channelSwap/v1/updateSwapChannelTrans";

#[derive(Debug, Deserialize)]
struct RfqPeerResponse {
    #[serde(rename = "rfqPeerPubkey")]
    rfq_peer_pubkey: String,
}

/// The service sometimes wraps payloads as `{"data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(v) => v,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpSwapCoordinator {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSwapCoordinator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String> {
        let resp = request.send().await.with_context(|| format!("{what}: send"))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("{what}: read body"))?;
        if !status.is_success() {
            anyhow::bail!("{what}: http {} body={body}", status.as_u16());
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let body = self.send(request, what).await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).with_context(|| format!("{what}: decode body {body}"))?;
        Ok(envelope.into_inner())
    }
}

pub fn quote_path(mode: SwapMode) -> &'static str {
    match mode {
        SwapMode::ExactSend => SWAP_EXACT_SEND_PATH,
        SwapMode::ExactReceive => SWAP_EXACT_RECEIVE_PATH,
    }
}

#[async_trait]
impl SwapCoordinator for HttpSwapCoordinator {
    async fn rfq_peer_pubkey(&self, auth_token: &str) -> Result<String> {
        let req = self
            .client
            .get(self.url(RFQ_PEER_PUBKEY_PATH))
            .bearer_auth(auth_token);
        let resp: RfqPeerResponse = self.send_json(req, "getRfqPeerPubkey").await?;
        Ok(resp.rfq_peer_pubkey)
    }

    async fn request_quote(
        &self,
        mode: SwapMode,
        request: &QuoteRequest,
        auth_token: &str,
    ) -> Result<PriceQuote> {
        let req = self
            .client
            .post(self.url(quote_path(mode)))
            .bearer_auth(auth_token)
            .json(request);
        let resp: QuoteResponse = self.send_json(req, quote_path(mode)).await?;
        Ok(resp.into())
    }

    async fn report_settlement(&self, report: &SettlementReport, auth_token: &str) -> Result<()> {
        let req = self
            .client
            .post(self.url(UPDATE_SWAP_TRANS_PATH))
            .bearer_auth(auth_token)
            .json(report);
        let body = self.send(req, "updateSwapChannelTrans").await?;
        tracing::debug!(rfq_id = %report.rfq_id, %body, "settlement report accepted");
        Ok(())
    }
}

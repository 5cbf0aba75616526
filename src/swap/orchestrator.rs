use std::str::FromStr as _;
use std::sync::Arc;
use std::time::Duration;

use bitcoin::secp256k1::PublicKey;
use tokio::sync::Semaphore;
use tracing::Instrument as _;

use super::channel::{ChannelSelector, FirstMatchChannelSelector};
use super::deadline::Deadline;
use super::error::SwapError;
use super::executor::LegExecutor;
use super::{
    Leg, SwapIntent, SwapMode, SwapReceipt, SwapRequest, SwapStage, guard, quote,
};
use crate::coordinator::{SettlementReport, SwapCoordinator};
use crate::lightning::LightningNode;
use crate::taproot::AssetChannelNode;

pub const DEFAULT_FEE_LIMIT_SAT: i64 = 1_000;
pub const DEFAULT_SWAP_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SwapConfig {
    pub fee_limit_sat: i64,
    pub allow_self_payment: bool,
    /// Budget for every remote call of one swap, from peer resolution to the
    /// final payment update.
    pub swap_timeout: Duration,
    pub report_timeout: Duration,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            fee_limit_sat: DEFAULT_FEE_LIMIT_SAT,
            allow_self_payment: true,
            swap_timeout: DEFAULT_SWAP_TIMEOUT,
            report_timeout: DEFAULT_REPORT_TIMEOUT,
        }
    }
}

/// Runs in-channel swaps one at a time. A second call while a swap is in
/// flight is rejected with `SwapError::InProgress`, never queued.
pub struct SwapOrchestrator {
    config: SwapConfig,
    lightning: Arc<dyn LightningNode>,
    assets: Arc<dyn AssetChannelNode>,
    coordinator: Arc<dyn SwapCoordinator>,
    selector: Arc<dyn ChannelSelector>,
    in_flight: Semaphore,
}

impl SwapOrchestrator {
    pub fn new(
        config: SwapConfig,
        lightning: Arc<dyn LightningNode>,
        assets: Arc<dyn AssetChannelNode>,
        coordinator: Arc<dyn SwapCoordinator>,
    ) -> Self {
        Self {
            config,
            lightning,
            assets,
            coordinator,
            selector: Arc::new(FirstMatchChannelSelector),
            in_flight: Semaphore::new(1),
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn ChannelSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.available_permits() == 0
    }

    pub async fn swap_exact_send(&self, request: SwapRequest) -> Result<SwapReceipt, SwapError> {
        self.run(SwapMode::ExactSend, request).await
    }

    pub async fn swap_exact_receive(&self, request: SwapRequest) -> Result<SwapReceipt, SwapError> {
        self.run(SwapMode::ExactReceive, request).await
    }

    async fn run(&self, mode: SwapMode, request: SwapRequest) -> Result<SwapReceipt, SwapError> {
        validate_request(mode, &request)?;

        // Released on drop, whichever way this function exits.
        let _permit = self
            .in_flight
            .try_acquire()
            .map_err(|_| SwapError::InProgress)?;

        let mut intent = SwapIntent::new(mode, &request);
        let span = tracing::info_span!("swap", attempt_id = %intent.attempt_id, %mode);

        async {
            log_stage(SwapStage::LockAcquired);
            let deadline = Deadline::after(self.config.swap_timeout);
            let result = self.drive(&mut intent, &request.auth_token, &deadline).await;

            intent.success = result.is_ok();
            match &result {
                Err(err) if err.is_outcome_unknown() => {
                    // The payment may still settle; the service is not told it failed.
                    tracing::warn!(error = %err, "swap payment outcome unknown, settlement report skipped");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "swap aborted");
                    self.report_stage(&intent, &request.auth_token).await;
                }
                Ok(_) => self.report_stage(&intent, &request.auth_token).await,
            }
            log_stage(SwapStage::Idle);
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        intent: &mut SwapIntent,
        auth_token: &str,
        deadline: &Deadline,
    ) -> Result<SwapReceipt, SwapError> {
        let raw_peer = deadline
            .run("resolve rfq peer", async {
                self.coordinator
                    .rfq_peer_pubkey(auth_token)
                    .await
                    .map_err(SwapError::PeerResolution)
            })
            .await?;
        let peer = PublicKey::from_str(raw_peer.trim()).map_err(|e| {
            SwapError::PeerResolution(anyhow::anyhow!("invalid rfq peer pubkey {raw_peer:?}: {e}"))
        })?;
        intent.route_peer = Some(peer);
        log_stage(SwapStage::PeerResolved);

        let channels = deadline
            .run("list channels", async {
                self.lightning
                    .list_channels(&peer)
                    .await
                    .map_err(SwapError::ChannelListing)
            })
            .await?;
        intent.send_channel = self.selector.select(&channels, &intent.send_asset, Leg::Send);
        intent.receive_channel =
            self.selector
                .select(&channels, &intent.receive_asset, Leg::Receive);
        tracing::info!(
            %peer,
            listed = channels.len(),
            send_chan_id = ?intent.send_channel.as_ref().map(|c| c.chan_id),
            receive_chan_id = ?intent.receive_channel.as_ref().map(|c| c.chan_id),
            "selected swap channels"
        );
        log_stage(SwapStage::ChannelsSelected);

        guard::check_balance(intent)?;
        log_stage(SwapStage::BalanceChecked);

        let quote = deadline
            .run(
                "request quote",
                quote::request_quote(self.coordinator.as_ref(), intent, auth_token),
            )
            .await?;
        intent.quote = Some(quote.clone());
        log_stage(SwapStage::QuoteObtained);

        let executed = LegExecutor::new(self.lightning.as_ref(), self.assets.as_ref(), &self.config)
            .execute(intent, &quote, intent.mode, deadline)
            .await?;
        log_stage(SwapStage::Executed);

        tracing::info!(
            rfq_id = %quote.quote_id,
            send_amount = executed.send_amount,
            receive_amount = executed.receive_amount,
            payment_hash = %executed.outcome.payment_hash,
            fee_sat = executed.outcome.fee_sat,
            "swap payment succeeded"
        );

        Ok(SwapReceipt {
            attempt_id: intent.attempt_id.to_string(),
            rfq_id: quote.quote_id,
            send_amount: executed.send_amount,
            receive_amount: executed.receive_amount,
            payment_hash: executed.outcome.payment_hash,
            fee_sat: executed.outcome.fee_sat,
        })
    }

    async fn report_stage(&self, intent: &SwapIntent, auth_token: &str) {
        if self.report(intent, auth_token).await {
            log_stage(SwapStage::Reported);
        }
    }

    /// Best effort: failures are logged and never change the swap result.
    /// Skipped when no quote was obtained, since there is no rfq id to
    /// report against. Returns whether a report was attempted.
    async fn report(&self, intent: &SwapIntent, auth_token: &str) -> bool {
        let (Some(rfq_id), Some(asset_id)) = (intent.quote_id(), intent.settlement_asset()) else {
            tracing::debug!("no quote obtained, skip settlement report");
            return false;
        };

        let report = SettlementReport {
            asset_id: asset_id.to_string(),
            rfq_id: rfq_id.to_string(),
            success: intent.success,
        };

        let call = self.coordinator.report_settlement(&report, auth_token);
        match tokio::time::timeout(self.config.report_timeout, call).await {
            Ok(Ok(())) => tracing::info!(rfq_id, success = report.success, "reported swap settlement"),
            Ok(Err(err)) => tracing::warn!(rfq_id, error = %format!("{err:#}"), "settlement report failed"),
            Err(_) => tracing::warn!(rfq_id, "settlement report timed out"),
        }
        true
    }
}

fn log_stage(stage: SwapStage) {
    tracing::debug!(%stage, "swap stage");
}

pub fn validate_request(mode: SwapMode, request: &SwapRequest) -> Result<(), SwapError> {
    if request.send_asset.is_bitcoin() == request.receive_asset.is_bitcoin() {
        return Err(SwapError::InvalidRequest(format!(
            "exactly one side must be {}: send_asset={} receive_asset={}",
            super::BITCOIN_ASSET,
            request.send_asset,
            request.receive_asset
        )));
    }

    let (name, amount) = match mode {
        SwapMode::ExactSend => ("send_amount", request.send_amount),
        SwapMode::ExactReceive => ("receive_amount", request.receive_amount),
    };
    if amount <= 0 {
        return Err(SwapError::InvalidRequest(format!("{name} must be > 0")));
    }
    // The capacity guard runs on both predictions before a quote exists.
    if request.send_amount <= 0 || request.receive_amount <= 0 {
        return Err(SwapError::InvalidRequest(format!(
            "predicted amounts must be > 0: send_amount={} receive_amount={}",
            request.send_amount, request.receive_amount
        )));
    }
    Ok(())
}

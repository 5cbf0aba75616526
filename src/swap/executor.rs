use bitcoin::secp256k1::PublicKey;

use super::deadline::Deadline;
use super::error::SwapError;
use super::guard;
use super::orchestrator::SwapConfig;
use super::rate::FixedPointRate;
use super::{ChannelRef, Leg, PaymentOutcome, PaymentStatus, PriceQuote, SwapAsset, SwapIntent, SwapMode};
use crate::lightning::LightningNode;
use crate::lightning::invoice::summarize_bolt11;
use crate::taproot::AssetChannelNode;

pub const DISPATCH_PAYMENT_STEP: &str = "dispatch payment";

/// Final amounts and payment result of an executed swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedSwap {
    pub send_amount: i64,
    pub receive_amount: i64,
    pub invoice: String,
    pub outcome: PaymentOutcome,
}

/// Invoices the receive leg, then pays that invoice from the send leg.
pub struct LegExecutor<'a> {
    lightning: &'a dyn LightningNode,
    assets: &'a dyn AssetChannelNode,
    config: &'a SwapConfig,
}

impl<'a> LegExecutor<'a> {
    pub fn new(
        lightning: &'a dyn LightningNode,
        assets: &'a dyn AssetChannelNode,
        config: &'a SwapConfig,
    ) -> Self {
        Self {
            lightning,
            assets,
            config,
        }
    }

    pub async fn execute(
        &self,
        intent: &SwapIntent,
        quote: &PriceQuote,
        mode: SwapMode,
        deadline: &Deadline,
    ) -> Result<ExecutedSwap, SwapError> {
        let rate = FixedPointRate::from_quote(quote)?;
        let (send_amount, receive_amount) = settle_amounts(intent, &rate, mode)?;
        guard::check_amounts(intent, send_amount, receive_amount)?;

        let peer = intent
            .route_peer
            .ok_or_else(|| SwapError::InvalidRequest("rfq peer not resolved".to_string()))?;
        let send_channel = leg_channel(intent, Leg::Send)?;
        let receive_channel = leg_channel(intent, Leg::Receive)?;
        let memo = format!("swap:{}", intent.attempt_id);

        let invoice = deadline
            .run(
                "create invoice",
                self.invoice_receive_leg(
                    &intent.receive_asset,
                    receive_amount,
                    receive_channel,
                    &peer,
                    &memo,
                    &rate,
                ),
            )
            .await?;

        match summarize_bolt11(&invoice) {
            Ok(summary) => tracing::info!(
                payment_hash = %summary.payment_hash,
                amount_msat = ?summary.amount_msat,
                receive_amount,
                "created receive leg invoice"
            ),
            Err(err) => tracing::debug!(error = %err, "created receive leg invoice"),
        }

        let outcome = deadline
            .run(
                DISPATCH_PAYMENT_STEP,
                self.pay_send_leg(&intent.send_asset, &invoice, send_channel, &peer),
            )
            .await?;

        if outcome.status != PaymentStatus::Succeeded {
            tracing::warn!(
                status = ?outcome.status,
                reason = %outcome.failure_reason,
                "swap payment did not succeed"
            );
            return Err(SwapError::PaymentFailed {
                status: outcome.status,
                reason: outcome.failure_reason,
            });
        }

        Ok(ExecutedSwap {
            send_amount,
            receive_amount,
            invoice,
            outcome,
        })
    }

    async fn invoice_receive_leg(
        &self,
        asset: &SwapAsset,
        amount: i64,
        channel: &ChannelRef,
        peer: &PublicKey,
        memo: &str,
        quoted: &FixedPointRate,
    ) -> Result<String, SwapError> {
        match asset {
            SwapAsset::Bitcoin => self
                .lightning
                .create_invoice(amount, memo, channel)
                .await
                .map_err(SwapError::Invoice),
            SwapAsset::Taproot(asset_id) => {
                let units = u64::try_from(amount).map_err(|_| {
                    SwapError::InvalidRequest(format!("negative asset amount {amount}"))
                })?;
                let created = self
                    .assets
                    .create_asset_invoice(asset_id, units, peer, memo)
                    .await
                    .map_err(SwapError::Invoice)?;

                let accepted = created.accepted_rate.as_ref().ok_or_else(|| {
                    SwapError::PriceCheck {
                        quoted: quoted.to_string(),
                        accepted: "none".to_string(),
                    }
                })?;
                let matches = FixedPointRate::parse(&accepted.coefficient, accepted.scale)
                    .is_ok_and(|r| r.same_rate(quoted));
                if !matches {
                    return Err(SwapError::PriceCheck {
                        quoted: quoted.to_string(),
                        accepted: format!("{}e-{}", accepted.coefficient, accepted.scale),
                    });
                }

                Ok(created.invoice)
            }
        }
    }

    async fn pay_send_leg(
        &self,
        asset: &SwapAsset,
        invoice: &str,
        channel: &ChannelRef,
        peer: &PublicKey,
    ) -> Result<PaymentOutcome, SwapError> {
        let fee_limit_sat = self.config.fee_limit_sat;
        let allow_self_payment = self.config.allow_self_payment;

        tracing::info!(chan_id = channel.chan_id, %asset, fee_limit_sat, "dispatching swap payment");
        match asset {
            SwapAsset::Bitcoin => self
                .lightning
                .pay(invoice, channel.chan_id, fee_limit_sat, allow_self_payment)
                .await
                .map_err(SwapError::Payment),
            SwapAsset::Taproot(asset_id) => self
                .assets
                .pay_asset_invoice(
                    invoice,
                    asset_id,
                    peer,
                    channel.chan_id,
                    fee_limit_sat,
                    allow_self_payment,
                )
                .await
                .map_err(SwapError::Payment),
        }
    }
}

/// Resolves the authoritative amount of the mode and derives the other leg
/// from the quote. Returns `(send, receive)`.
pub fn settle_amounts(
    intent: &SwapIntent,
    rate: &FixedPointRate,
    mode: SwapMode,
) -> Result<(i64, i64), SwapError> {
    let convert = |amount: i64, from: &SwapAsset| match from {
        SwapAsset::Bitcoin => rate.sat_to_asset(amount),
        SwapAsset::Taproot(_) => rate.asset_to_sat(amount),
    };

    let (send, receive) = match mode {
        SwapMode::ExactSend => {
            let send = intent.send_amount_predicted;
            (send, convert(send, &intent.send_asset)?)
        }
        SwapMode::ExactReceive => {
            let receive = intent.receive_amount_predicted;
            (convert(receive, &intent.receive_asset)?, receive)
        }
    };

    if send <= 0 || receive <= 0 {
        return Err(SwapError::InvalidRequest(format!(
            "quoted amounts round to zero: send={send} receive={receive}"
        )));
    }
    Ok((send, receive))
}

fn leg_channel(intent: &SwapIntent, leg: Leg) -> Result<&ChannelRef, SwapError> {
    intent.channel(leg).ok_or(SwapError::NoChannel {
        leg,
        asset: *intent.asset(leg),
    })
}

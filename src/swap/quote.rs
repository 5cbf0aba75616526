use super::error::SwapError;
use super::rate::FixedPointRate;
use super::{PriceQuote, SwapIntent};
use crate::coordinator::{QuoteRequest, SwapCoordinator};

pub fn quote_request(intent: &SwapIntent) -> QuoteRequest {
    QuoteRequest {
        send_asset: intent.send_asset.to_string(),
        send_amount: intent.send_amount_predicted,
        recv_asset: intent.receive_asset.to_string(),
        recv_amount: intent.receive_amount_predicted,
        slippage: intent.slippage_bps,
    }
}

/// Asks the channel-swap service for a binding quote in the intent's mode.
/// The quote must carry an rfq id and a usable rate.
pub async fn request_quote(
    coordinator: &dyn SwapCoordinator,
    intent: &SwapIntent,
    auth_token: &str,
) -> Result<PriceQuote, SwapError> {
    let request = quote_request(intent);
    let quote = coordinator
        .request_quote(intent.mode, &request, auth_token)
        .await
        .map_err(SwapError::Quote)?;

    if quote.quote_id.trim().is_empty() {
        return Err(SwapError::Quote(anyhow::anyhow!("quote response has no rfq_id")));
    }
    let rate = FixedPointRate::from_quote(&quote)?;

    tracing::info!(
        rfq_id = %quote.quote_id,
        %rate,
        mode = %intent.mode,
        "obtained swap quote"
    );
    Ok(quote)
}

use std::sync::Arc;

use tonic::{Request, Response, Status};

use super::error::SwapError;
use super::orchestrator::SwapOrchestrator;
use super::{SwapAsset, SwapReceipt, SwapRequest};
use crate::proto::v1 as pb;

#[derive(Clone)]
pub struct ChannelSwapService {
    orchestrator: Arc<SwapOrchestrator>,
}

impl ChannelSwapService {
    pub fn new(orchestrator: Arc<SwapOrchestrator>) -> Self {
        Self { orchestrator }
    }

    fn request_from_proto(req: pb::SwapRequest) -> Result<SwapRequest, Status> {
        let send_asset: SwapAsset = req
            .send_asset
            .parse()
            .map_err(|e| Status::invalid_argument(format!("invalid send_asset: {e}")))?;
        let receive_asset: SwapAsset = req
            .receive_asset
            .parse()
            .map_err(|e| Status::invalid_argument(format!("invalid receive_asset: {e}")))?;
        let slippage_bps = u16::try_from(req.slippage_bps)
            .map_err(|_| Status::invalid_argument("slippage_bps must fit in 16 bits"))?;
        if req.auth_token.trim().is_empty() {
            return Err(Status::unauthenticated("auth_token is required"));
        }

        Ok(SwapRequest {
            send_asset,
            send_amount: req.send_amount,
            receive_asset,
            receive_amount: req.receive_amount,
            slippage_bps,
            auth_token: req.auth_token,
        })
    }

    fn receipt_to_proto(receipt: SwapReceipt) -> pb::SwapResponse {
        pb::SwapResponse {
            success: true,
            attempt_id: receipt.attempt_id,
            rfq_id: receipt.rfq_id,
            send_amount: receipt.send_amount,
            receive_amount: receipt.receive_amount,
            payment_hash: receipt.payment_hash,
            fee_sat: receipt.fee_sat,
        }
    }
}

pub fn status_from_error(err: &SwapError) -> Status {
    let msg = err.to_string();
    match err {
        SwapError::InProgress => Status::aborted(msg),
        SwapError::InvalidRequest(_) => Status::invalid_argument(msg),
        SwapError::PeerResolution(_)
        | SwapError::ChannelListing(_)
        | SwapError::NoChannel { .. }
        | SwapError::InsufficientBalance { .. }
        | SwapError::PriceCheck { .. } => Status::failed_precondition(msg),
        SwapError::Quote(_) => Status::unavailable(msg),
        SwapError::Rate(_) => Status::failed_precondition(msg),
        SwapError::Timeout { .. } => Status::deadline_exceeded(msg),
        SwapError::Invoice(_) | SwapError::Payment(_) | SwapError::PaymentFailed { .. } => {
            Status::internal(msg)
        }
    }
}

#[tonic::async_trait]
impl pb::channel_swap_server::ChannelSwap for ChannelSwapService {
    async fn swap_exact_send(
        &self,
        request: Request<pb::SwapRequest>,
    ) -> Result<Response<pb::SwapResponse>, Status> {
        let req = Self::request_from_proto(request.into_inner())?;
        let receipt = self
            .orchestrator
            .swap_exact_send(req)
            .await
            .map_err(|e| status_from_error(&e))?;
        Ok(Response::new(Self::receipt_to_proto(receipt)))
    }

    async fn swap_exact_receive(
        &self,
        request: Request<pb::SwapRequest>,
    ) -> Result<Response<pb::SwapResponse>, Status> {
        let req = Self::request_from_proto(request.into_inner())?;
        let receipt = self
            .orchestrator
            .swap_exact_receive(req)
            .await
            .map_err(|e| status_from_error(&e))?;
        Ok(Response::new(Self::receipt_to_proto(receipt)))
    }
}

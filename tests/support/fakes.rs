use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use bitcoin::secp256k1::PublicKey;
use tokio::sync::Notify;

use tap_channel_swap::coordinator::{QuoteRequest, SettlementReport, SwapCoordinator};
use tap_channel_swap::lightning::LightningNode;
use tap_channel_swap::swap::{
    AssetId, ChannelRef, PaymentOutcome, PaymentStatus, PriceQuote, SwapMode,
};
use tap_channel_swap::taproot::{AcceptedRate, AssetChannelNode, AssetInvoice};

pub const PAYMENT_HASH: &str = "abababababababababababababababababababababababababababababababab";

fn outcome(status: PaymentStatus, reason: &str) -> PaymentOutcome {
    PaymentOutcome {
        status,
        failure_reason: reason.to_string(),
        payment_hash: PAYMENT_HASH.to_string(),
        fee_sat: 3,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPayment {
    pub invoice: String,
    pub chan_id: u64,
    pub fee_limit_sat: i64,
    pub allow_self_payment: bool,
}

pub struct FakeLightning {
    pub channels: Vec<ChannelRef>,
    pub pay_status: PaymentStatus,
    pub failure_reason: String,
    pub hang_pay: bool,
    pub list_calls: AtomicUsize,
    pub invoices: Mutex<Vec<(i64, u64)>>,
    pub payments: Mutex<Vec<RecordedPayment>>,
}

impl FakeLightning {
    pub fn new(channels: Vec<ChannelRef>) -> Self {
        Self {
            channels,
            pay_status: PaymentStatus::Succeeded,
            failure_reason: String::new(),
            hang_pay: false,
            list_calls: AtomicUsize::new(0),
            invoices: Mutex::new(Vec::new()),
            payments: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, status: PaymentStatus, reason: &str) -> Self {
        self.pay_status = status;
        self.failure_reason = reason.to_string();
        self
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.lock().expect("invoices mutex poisoned").len()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.lock().expect("payments mutex poisoned").len()
    }
}

#[async_trait]
impl LightningNode for FakeLightning {
    async fn list_channels(&self, _peer: &PublicKey) -> Result<Vec<ChannelRef>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.channels.clone())
    }

    async fn create_invoice(
        &self,
        amount_sat: i64,
        _memo: &str,
        channel: &ChannelRef,
    ) -> Result<String> {
        let mut invoices = self.invoices.lock().expect("invoices mutex poisoned");
        invoices.push((amount_sat, channel.chan_id));
        Ok(format!("lnbcrt-fake-btc-{}", invoices.len()))
    }

    async fn pay(
        &self,
        invoice: &str,
        chan_id: u64,
        fee_limit_sat: i64,
        allow_self_payment: bool,
    ) -> Result<PaymentOutcome> {
        self.payments
            .lock()
            .expect("payments mutex poisoned")
            .push(RecordedPayment {
                invoice: invoice.to_string(),
                chan_id,
                fee_limit_sat,
                allow_self_payment,
            });
        if self.hang_pay {
            std::future::pending::<()>().await;
        }
        Ok(outcome(self.pay_status, &self.failure_reason))
    }
}

pub struct FakeAssets {
    pub accepted_rate: Option<AcceptedRate>,
    pub pay_status: PaymentStatus,
    pub failure_reason: String,
    pub invoices: Mutex<Vec<(AssetId, u64)>>,
    pub payments: Mutex<Vec<(RecordedPayment, AssetId)>>,
}

impl FakeAssets {
    pub fn accepting(coefficient: &str, scale: u32) -> Self {
        Self {
            accepted_rate: Some(AcceptedRate {
                coefficient: coefficient.to_string(),
                scale,
            }),
            pay_status: PaymentStatus::Succeeded,
            failure_reason: String::new(),
            invoices: Mutex::new(Vec::new()),
            payments: Mutex::new(Vec::new()),
        }
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.lock().expect("invoices mutex poisoned").len()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.lock().expect("payments mutex poisoned").len()
    }
}

#[async_trait]
impl AssetChannelNode for FakeAssets {
    async fn create_asset_invoice(
        &self,
        asset_id: &AssetId,
        amount: u64,
        _peer: &PublicKey,
        _memo: &str,
    ) -> Result<AssetInvoice> {
        let mut invoices = self.invoices.lock().expect("invoices mutex poisoned");
        invoices.push((*asset_id, amount));
        Ok(AssetInvoice {
            invoice: format!("lnbcrt-fake-asset-{}", invoices.len()),
            accepted_rate: self.accepted_rate.clone(),
        })
    }

    async fn pay_asset_invoice(
        &self,
        invoice: &str,
        asset_id: &AssetId,
        _peer: &PublicKey,
        chan_id: u64,
        fee_limit_sat: i64,
        allow_self_payment: bool,
    ) -> Result<PaymentOutcome> {
        self.payments
            .lock()
            .expect("payments mutex poisoned")
            .push((
                RecordedPayment {
                    invoice: invoice.to_string(),
                    chan_id,
                    fee_limit_sat,
                    allow_self_payment,
                },
                *asset_id,
            ));
        Ok(outcome(self.pay_status, &self.failure_reason))
    }
}

/// Lets a test park a swap inside peer resolution while it holds the lock.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

pub struct FakeCoordinator {
    pub peer: String,
    pub quote: PriceQuote,
    pub fail_report: bool,
    pub hang_quote: bool,
    pub gate: Mutex<Option<std::sync::Arc<Gate>>>,
    pub quote_requests: Mutex<Vec<(SwapMode, QuoteRequest)>>,
    pub reports: Mutex<Vec<SettlementReport>>,
}

impl FakeCoordinator {
    pub fn new(peer: &str, quote: PriceQuote) -> Self {
        Self {
            peer: peer.to_string(),
            quote,
            fail_report: false,
            hang_quote: false,
            gate: Mutex::new(None),
            quote_requests: Mutex::new(Vec::new()),
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gate(self, gate: std::sync::Arc<Gate>) -> Self {
        *self.gate.lock().expect("gate mutex poisoned") = Some(gate);
        self
    }

    pub fn reports(&self) -> Vec<SettlementReport> {
        self.reports.lock().expect("reports mutex poisoned").clone()
    }

    pub fn quote_count(&self) -> usize {
        self.quote_requests
            .lock()
            .expect("quote mutex poisoned")
            .len()
    }
}

#[async_trait]
impl SwapCoordinator for FakeCoordinator {
    async fn rfq_peer_pubkey(&self, auth_token: &str) -> Result<String> {
        anyhow::ensure!(auth_token == "token-1", "unexpected auth token {auth_token}");

        let gate = self.gate.lock().expect("gate mutex poisoned").take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Ok(self.peer.clone())
    }

    async fn request_quote(
        &self,
        mode: SwapMode,
        request: &QuoteRequest,
        _auth_token: &str,
    ) -> Result<PriceQuote> {
        self.quote_requests
            .lock()
            .expect("quote mutex poisoned")
            .push((mode, request.clone()));
        if self.hang_quote {
            std::future::pending::<()>().await;
        }
        Ok(self.quote.clone())
    }

    async fn report_settlement(&self, report: &SettlementReport, _auth_token: &str) -> Result<()> {
        self.reports
            .lock()
            .expect("reports mutex poisoned")
            .push(report.clone());
        if self.fail_report {
            anyhow::bail!("settlement service unavailable");
        }
        Ok(())
    }
}

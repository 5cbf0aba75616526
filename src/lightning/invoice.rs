use std::str::FromStr as _;

use anyhow::Result;
use bitcoin::hashes::Hash as _;
use lightning_invoice::Bolt11Invoice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSummary {
    pub payment_hash: String,
    pub amount_msat: Option<u64>,
}

pub fn summarize_bolt11(invoice: &str) -> Result<InvoiceSummary> {
    let invoice = Bolt11Invoice::from_str(invoice.trim())
        .map_err(|e| anyhow::anyhow!("parse BOLT11 invoice: {e:?}"))?;
    Ok(InvoiceSummary {
        payment_hash: hex::encode(invoice.payment_hash().to_byte_array()),
        amount_msat: invoice.amount_milli_satoshis(),
    })
}

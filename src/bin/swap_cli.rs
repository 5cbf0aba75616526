use anyhow::{Context as _, Result};
use clap::{Parser as _, Subcommand};
use serde_json::json;
use tap_channel_swap::proto::v1::SwapRequest;
use tap_channel_swap::proto::v1::channel_swap_client::ChannelSwapClient;

#[derive(Debug, clap::Parser)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:50061")]
    grpc_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Args)]
struct SwapArgs {
    /// "btc" or a Taproot Asset id (hex).
    #[arg(long)]
    send_asset: String,

    #[arg(long)]
    send_amount: i64,

    /// "btc" or a Taproot Asset id (hex).
    #[arg(long)]
    receive_asset: String,

    #[arg(long)]
    receive_amount: i64,

    #[arg(long, default_value_t = 0)]
    slippage_bps: u32,

    #[arg(long, env = "CHANNEL_SWAP_AUTH_TOKEN")]
    auth_token: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Spend exactly --send-amount; --receive-amount is the expected return.
    ExactSend(SwapArgs),
    /// Receive exactly --receive-amount; --send-amount is the expected cost.
    ExactReceive(SwapArgs),
}

impl From<SwapArgs> for SwapRequest {
    fn from(a: SwapArgs) -> Self {
        Self {
            send_asset: a.send_asset,
            send_amount: a.send_amount,
            receive_asset: a.receive_asset,
            receive_amount: a.receive_amount,
            slippage_bps: a.slippage_bps,
            auth_token: a.auth_token,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tap_channel_swap::logging::init().ok();
    let args = Args::parse();

    let mut client = ChannelSwapClient::connect(args.grpc_url)
        .await
        .context("connect gRPC")?;

    let resp = match args.command {
        Command::ExactSend(a) => client
            .swap_exact_send(SwapRequest::from(a))
            .await
            .context("SwapExactSend")?,
        Command::ExactReceive(a) => client
            .swap_exact_receive(SwapRequest::from(a))
            .await
            .context("SwapExactReceive")?,
    }
    .into_inner();

    let out = json!({
      "success": resp.success,
      "attempt_id": resp.attempt_id,
      "rfq_id": resp.rfq_id,
      "send_amount": resp.send_amount,
      "receive_amount": resp.receive_amount,
      "payment_hash": resp.payment_hash,
      "fee_sat": resp.fee_sat,
    });

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

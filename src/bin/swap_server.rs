use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use tap_channel_swap::coordinator::http::HttpSwapCoordinator;
use tap_channel_swap::lightning::lnd::LndClient;
use tap_channel_swap::proto::v1::channel_swap_server::ChannelSwapServer;
use tap_channel_swap::rpc::NodeCredentials;
use tap_channel_swap::swap::orchestrator::{SwapConfig, SwapOrchestrator};
use tap_channel_swap::swap::service::ChannelSwapService;
use tap_channel_swap::taproot::tapd::TapdClient;
use tonic::transport::Server;

#[derive(Debug, clap::Parser)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:50061")]
    listen_addr: String,

    #[arg(long, default_value = "127.0.0.1:10009")]
    lnd_grpc_addr: String,

    #[arg(long)]
    lnd_tls_cert: PathBuf,

    #[arg(long)]
    lnd_macaroon: PathBuf,

    /// Defaults to the lnd address (litd integrated mode).
    #[arg(long)]
    tapd_grpc_addr: Option<String>,

    #[arg(long)]
    tapd_tls_cert: Option<PathBuf>,

    #[arg(long)]
    tapd_macaroon: PathBuf,

    #[arg(long)]
    coordinator_url: String,

    #[arg(long, default_value_t = 1_000)]
    fee_limit_sat: i64,

    #[arg(long, default_value_t = 120)]
    swap_timeout_secs: u64,

    #[arg(long, default_value_t = 10)]
    report_timeout_secs: u64,

    #[arg(long, default_value_t = 60)]
    payment_timeout_secs: i32,

    #[arg(long, default_value_t = 30)]
    http_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tap_channel_swap::logging::init().ok();

    let args = Args::parse();
    let listen_addr: SocketAddr = args.listen_addr.parse().context("parse listen_addr")?;

    let lnd_creds = NodeCredentials::load(&args.lnd_grpc_addr, &args.lnd_tls_cert, &args.lnd_macaroon)
        .context("load lnd credentials")?;
    let tapd_creds = NodeCredentials::load(
        args.tapd_grpc_addr.as_deref().unwrap_or(&args.lnd_grpc_addr),
        args.tapd_tls_cert.as_ref().unwrap_or(&args.lnd_tls_cert),
        &args.tapd_macaroon,
    )
    .context("load tapd credentials")?;

    let lnd = LndClient::connect(&lnd_creds, args.payment_timeout_secs)
        .await
        .context("connect lnd")?;
    let tapd = TapdClient::connect(&tapd_creds, args.payment_timeout_secs)
        .await
        .context("connect tapd")?;
    let coordinator = HttpSwapCoordinator::new(
        args.coordinator_url.clone(),
        Duration::from_secs(args.http_timeout_secs),
    )
    .context("create coordinator client")?;

    let cfg = SwapConfig {
        fee_limit_sat: args.fee_limit_sat,
        allow_self_payment: true,
        swap_timeout: Duration::from_secs(args.swap_timeout_secs),
        report_timeout: Duration::from_secs(args.report_timeout_secs),
    };
    tracing::info!(
        lnd = %lnd_creds.grpc_addr,
        tapd = %tapd_creds.grpc_addr,
        coordinator = %args.coordinator_url,
        fee_limit_sat = cfg.fee_limit_sat,
        swap_timeout_secs = args.swap_timeout_secs,
        "swap orchestrator ready"
    );

    let orchestrator = SwapOrchestrator::new(
        cfg,
        Arc::new(lnd),
        Arc::new(tapd),
        Arc::new(coordinator),
    );
    let svc = ChannelSwapService::new(Arc::new(orchestrator));

    tracing::info!(%listen_addr, "starting channel swap gRPC server");

    Server::builder()
        .add_service(ChannelSwapServer::new(svc))
        .serve(listen_addr)
        .await
        .context("serve gRPC")?;

    Ok(())
}

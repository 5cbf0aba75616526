fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos(
            &[
                "proto/lnd/lightning.proto",
                "proto/lnd/routerrpc/router.proto",
                "proto/tapd/rfqrpc/rfq.proto",
                "proto/tapd/tapchannelrpc/tapchannel.proto",
            ],
            &["proto"],
        )?;

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/tap_channel_swap/v1/swap.proto"], &["proto"])?;

    Ok(())
}

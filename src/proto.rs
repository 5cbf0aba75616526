//! Generated gRPC bindings.
//!
//! `v1` is this crate's own service. The rest are the lnd and tapd subsets
//! the node adapters talk to; they live side by side so cross-package
//! references (`super::lnrpc::Payment`) resolve.

pub mod v1 {
    tonic::include_proto!("tap_channel_swap.v1");
}

pub mod lnrpc {
    tonic::include_proto!("lnrpc");
}

pub mod routerrpc {
    tonic::include_proto!("routerrpc");
}

pub mod rfqrpc {
    tonic::include_proto!("rfqrpc");
}

pub mod tapchannelrpc {
    tonic::include_proto!("tapchannelrpc");
}

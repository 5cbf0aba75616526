pub mod coordinator;
pub mod lightning;
pub mod logging;
pub mod proto;
pub mod rpc;
pub mod swap;
pub mod taproot;

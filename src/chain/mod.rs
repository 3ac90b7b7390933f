pub mod account_types;
pub mod client;
pub mod proto;
pub mod registry;
pub mod transport;
pub mod tx_builder;
pub mod types;

pub use account_types::{AccountInfo, ChainAccount};
pub use client::{create_client, ClientOptions, SigningClient};
pub use registry::{Registry, TypedMessage};
pub use transport::{
    ChainTransport, GrpcTransport, GrpcTransportFactory, TransportFactory, TransportOptions,
};
pub use tx_builder::TxBuilder;
pub use types::{BroadcastResult, Coin, Fee, GasEstimate, NodeInfo};

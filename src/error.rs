//! Error taxonomy shared by the wallet, chain and pipeline layers

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No wallet provider is installed or configured
    #[error("wallet provider absent: install or configure a wallet to connect")]
    ProviderAbsent,

    /// The user declined an authorization or signing request
    #[error("request rejected by user: {0}")]
    UserRejected(String),

    /// The wallet provider failed for a reason other than a user decision
    #[error("wallet provider error: {0}")]
    ProviderError(String),

    #[error("wallet not connected")]
    NotConnected,

    #[error("endpoint {endpoint} unreachable: {cause}")]
    EndpointUnreachable { endpoint: String, cause: String },

    #[error("signer invalid: {0}")]
    SignerInvalid(String),

    #[error("no active account: connect a wallet before minting")]
    NoActiveAccount,

    /// Message type URL was never registered with the signing client
    #[error("message schema {0} is not registered with the signing client")]
    SchemaNotRegistered(String),

    /// The node accepted the request but the chain refused the transaction
    #[error("transaction rejected on chain (code {code}): {raw_log}")]
    OnChainRejection { code: u32, raw_log: String },

    #[error("transport failure: {cause}")]
    TransportFailure { cause: String },

    #[error("query failed: {0}")]
    QueryError(String),

    /// A message field could not be encoded for the wire
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Short, stable name of the error kind for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ProviderAbsent => "ProviderAbsent",
            Error::UserRejected(_) => "UserRejected",
            Error::ProviderError(_) => "ProviderError",
            Error::NotConnected => "NotConnected",
            Error::EndpointUnreachable { .. } => "EndpointUnreachable",
            Error::SignerInvalid(_) => "SignerInvalid",
            Error::NoActiveAccount => "NoActiveAccount",
            Error::SchemaNotRegistered(_) => "SchemaNotRegistered",
            Error::OnChainRejection { .. } => "OnChainRejection",
            Error::TransportFailure { .. } => "TransportFailure",
            Error::QueryError(_) => "QueryError",
            Error::InvalidPayload(_) => "InvalidPayload",
            Error::Config(_) => "Config",
        }
    }

    pub(crate) fn transport(cause: impl std::fmt::Display) -> Self {
        Error::TransportFailure {
            cause: cause.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

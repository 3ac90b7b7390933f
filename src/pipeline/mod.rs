//! Token issuance transaction pipeline

pub mod fee;
pub mod message;
pub mod mint;

pub use fee::{FeeSetting, FeeConfig, GasPrice};
pub use message::IssuanceMessage;
pub use mint::{MintPipeline, PipelineState};

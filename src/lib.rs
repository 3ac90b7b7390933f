// Library exports for coreum_issuer

pub mod balance;
pub mod chain;
pub mod config;
pub mod error;
pub mod log_sink;
pub mod pipeline;
pub mod session;
pub mod wallet;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use log_sink::{LogEvent, LogSink};
pub use session::{BalanceDisplay, Command, CommandOutcome, Session, SessionSettings};

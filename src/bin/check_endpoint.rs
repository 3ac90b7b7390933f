//! Smoke check of a node gRPC endpoint: handshake, account and balance queries
//! Run with: cargo run --bin check_endpoint -- <grpc-endpoint> [address] [denom]

use anyhow::{bail, Result};
use coreum_issuer::balance::format_display;
use coreum_issuer::chain::{ChainTransport, GrpcTransport, TransportOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(endpoint) = args.next() else {
        bail!("usage: check_endpoint <grpc-endpoint> [address] [denom]");
    };
    let address = args.next();
    let denom = args.next().unwrap_or_else(|| "utestcore".to_string());

    println!("=== Coreum Endpoint Check ===\n");

    println!("Connecting to {}...", endpoint);
    let transport = GrpcTransport::connect(&endpoint, &TransportOptions::default()).await?;
    println!("Connected!\n");

    println!("=== Node Info ===");
    match transport.node_info().await {
        Ok(node) => {
            println!("  Network:     {}", node.network);
            println!("  Moniker:     {}", node.moniker);
            println!("  App version: {}", node.app_version);
        }
        Err(e) => println!("  Node info query failed: {}", e),
    }
    println!();

    let Some(address) = address else {
        println!("No address given, skipping account queries");
        return Ok(());
    };

    println!("=== Account {} ===", address);
    match transport.account(&address).await {
        Ok(info) => {
            println!("  Account number: {}", info.account_number);
            println!("  Sequence:       {}", info.sequence);
        }
        Err(e) => println!("  Account query failed: {}", e),
    }

    match transport.balance(&address, &denom).await {
        Ok(coin) => match format_display(&coin.amount) {
            Some(display) => println!("  Balance: {} {} ({})", display, coin.denom, coin.amount),
            None => println!("  Balance: {} {} (not an integer)", coin.amount, coin.denom),
        },
        Err(e) => println!("  Balance query failed: {}", e),
    }

    println!("\n=== Check Complete ===");
    Ok(())
}

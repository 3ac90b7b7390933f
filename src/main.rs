use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coreum_issuer::chain::GrpcTransportFactory;
use coreum_issuer::config::Config;
use coreum_issuer::log_sink::DEFAULT_LOG_FILTER;
use coreum_issuer::wallet::{
    generate_mnemonic, Approval, KeyWallet, LocalWallet, WalletProvider, COREUM_HD_PATH,
};
use coreum_issuer::{Command, CommandOutcome, Session};

#[derive(Parser)]
#[command(name = "coreum-issuer")]
#[command(about = "Smart-token issuance console for Coreum", version)]
struct Cli {
    /// Wallet mnemonic; without it the session has no wallet provider
    #[arg(long, env = "COREUM_MNEMONIC", hide_env_values = true, global = true)]
    mnemonic: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a configuration template
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Generate a fresh mnemonic and print its address
    Keygen {
        #[arg(long, default_value = "testcore")]
        prefix: String,

        #[arg(long, default_value = COREUM_HD_PATH)]
        hd_path: String,
    },

    /// Connect and show the fee-denom balance
    Balance {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect and issue the configured token once
    Mint {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session reading commands from stdin
    Console {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            if std::path::Path::new(&output).exists() {
                bail!("{} already exists, refusing to overwrite", output);
            }
            Config::default().save(&output)?;
            info!("Configuration file created at: {}", output);
            info!("Set chain.rpc_endpoint and chain.fee_denom before connecting");
        }
        Commands::Keygen { prefix, hd_path } => {
            let mnemonic = generate_mnemonic()?;
            let wallet = KeyWallet::from_mnemonic(&mnemonic, "", &hd_path, &prefix)?;
            println!("Address:  {}", wallet.address);
            println!("Mnemonic: {}", mnemonic);
            println!();
            println!("Export it as COREUM_MNEMONIC to use it with this tool.");
        }
        Commands::Balance { config, json } => {
            let (mut session, _) = open_session(&config, cli.mnemonic.as_deref())?;
            let outcome = session.dispatch(Command::Connect).await;
            print_log(&session);
            match outcome {
                CommandOutcome::Connected(account) if json => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "account": account,
                            "balance": session.balance().to_string(),
                        })
                    );
                }
                CommandOutcome::Connected(_) => println!("Balance: {}", session.balance()),
                CommandOutcome::Failed(e) => bail!(e),
                other => bail!("unexpected outcome {:?}", other),
            }
        }
        Commands::Mint { config, json } => {
            let (mut session, _) = open_session(&config, cli.mnemonic.as_deref())?;
            if let CommandOutcome::Failed(e) = session.dispatch(Command::Connect).await {
                print_log(&session);
                bail!(e);
            }
            let outcome = session.dispatch(Command::Mint).await;
            print_log(&session);
            match outcome {
                CommandOutcome::Minted(result) if json => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                CommandOutcome::Minted(result) => {
                    println!("Transaction: {}", result.transaction_hash);
                    if result.height > 0 {
                        println!("Height:      {}", result.height);
                    }
                }
                CommandOutcome::Failed(e) => bail!(e),
                other => bail!("unexpected outcome {:?}", other),
            }
        }
        Commands::Console { config } => {
            let (session, approval) = open_session(&config, cli.mnemonic.as_deref())?;
            // A signing prompt needs stdin to itself
            let overlap = approval == Approval::Auto;
            run_console(session, overlap).await?;
        }
    }

    Ok(())
}

fn open_session(path: &str, mnemonic: Option<&str>) -> Result<(Session, Approval)> {
    let config = Config::load(path)?;
    let settings = config.session_settings()?;

    let provider: Option<Arc<dyn WalletProvider>> = match mnemonic {
        Some(phrase) => {
            let key = KeyWallet::from_mnemonic(
                phrase,
                "",
                &config.wallet.hd_path,
                &config.chain.address_prefix,
            )?;
            info!("Using local wallet {}", key.address);
            Some(Arc::new(LocalWallet::new(key, config.wallet.approval)))
        }
        None => {
            warn!("COREUM_MNEMONIC not set, running without a wallet provider");
            None
        }
    };

    let session = Session::new(settings, provider, Arc::new(GrpcTransportFactory));
    Ok((session, config.wallet.approval))
}

fn print_log(session: &Session) {
    for event in session.log().entries() {
        println!("{}", event.render());
    }
}

const HELP: &str = "commands: connect | balance | mint | disconnect | log | status | help | quit";

type MintTask = Pin<Box<dyn Future<Output = CommandOutcome> + Send>>;

/// Resolves with the in-flight mint, or never when there is none
async fn in_flight(mint: &mut Option<MintTask>) -> CommandOutcome {
    match mint {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}

/// Read commands until EOF or `quit`
///
/// With `overlap` a mint runs alongside further commands; otherwise the
/// console waits for it before reading the next line.
async fn run_console(mut session: Session, overlap: bool) -> Result<()> {
    let mut events = session.log().subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{}", event.render()),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Console fell behind, {} log entries not shown", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!(
        "Coreum issuance console on {} via {}",
        session.settings().chain_id(),
        session.settings().rpc_endpoint
    );
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut mint: Option<MintTask> = None;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = in_flight(&mut mint) => {
                // already logged by the pipeline
                mint = None;
                continue;
            }
        };

        let command = match line.trim() {
            "" => continue,
            "connect" => Command::Connect,
            "balance" => Command::ViewBalance,
            "mint" => Command::Mint,
            "disconnect" => Command::Disconnect,
            "log" => Command::Log,
            "status" => {
                println!(
                    "wallet: {:?} | account: {} | balance: {} | pipeline: {:?}",
                    session.connection_state(),
                    session
                        .account()
                        .map(|a| a.address.as_str())
                        .unwrap_or("-"),
                    session.balance(),
                    session.pipeline_state()
                );
                continue;
            }
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "quit" | "exit" => break,
            other => {
                println!("unknown command {:?}; {}", other, HELP);
                continue;
            }
        };

        match command {
            Command::Mint if mint.is_some() => {
                println!("a mint is already in flight");
            }
            Command::Mint if overlap => {
                mint = Some(Box::pin(session.begin_mint()));
            }
            command => {
                if let CommandOutcome::Log(text) = session.dispatch(command).await {
                    println!("{}", text);
                }
            }
        }
        // let the printer drain what this command appended
        tokio::task::yield_now().await;
    }

    // A submitted broadcast cannot be called back; wait for its result
    if let Some(task) = mint.take() {
        println!("waiting for the in-flight mint...");
        task.await;
    }

    drop(session);
    printer.await?;
    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use taxpay_api::walkthrough::{self, WalkthroughInput};
use taxpay_api::{AppState, ServiceConfig, app_router, logging};
use taxpay_core::TaxType;
use tracing::info;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Crypto tax payment service.
///
/// Verifies tax identifiers, calculates liabilities and accepts simulated
/// crypto payments over a small JSON API.
#[derive(Debug, Parser)]
#[command(name = "taxpay", version, about)]
struct Cli {
    /// TOML configuration file; every setting has a default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend serving registry lookups and settlement (overrides the file).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Log level or filter directive (overrides the file; `RUST_LOG` wins).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Tax schedule CSV replacing the built-in tables (overrides the file).
    #[arg(long, global = true)]
    schedules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service until Ctrl-C.
    Serve {
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides the file and `PORT`).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Walk through wallet, payer, calculator, payment and receipt in-process.
    Walkthrough {
        #[arg(long, default_value = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU")]
        wallet: String,

        /// Simulated wallet balance in lamports.
        #[arg(long, default_value_t = 2_500_000_000)]
        balance: u64,

        #[arg(long, default_value = "1234567890")]
        tax_id: String,

        #[arg(long, default_value = "500000")]
        income: Decimal,

        /// PAYE, PIT, CIT, CGT or VAT.
        #[arg(long, default_value = "PAYE")]
        tax_type: TaxType,

        #[arg(long, default_value = "SOL")]
        currency: String,
    },
}

// ─── configuration ───────────────────────────────────────────────────────────

fn resolve_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    config.apply_port_override(std::env::var("PORT").ok().as_deref())?;

    if let Some(backend) = &cli.backend {
        config.backend = backend.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(path) = &cli.schedules {
        config.schedule_file = Some(path.clone());
    }
    if let Command::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.host = host.clone();
        }
        if let Some(port) = port {
            config.port = *port;
        }
    }
    Ok(config)
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging("info");

    let config = resolve_config(&cli)?;
    logging::apply_config(&config.log_level, config.log_file.as_deref())?;

    let state = AppState::from_config(&config).await?;

    match cli.command {
        Command::Serve { .. } => serve(&config, state).await,
        Command::Walkthrough {
            wallet,
            balance,
            tax_id,
            income,
            tax_type,
            currency,
        } => {
            let input = WalkthroughInput {
                wallet_address: wallet,
                balance_lamports: balance,
                tax_id,
                income,
                tax_type,
                crypto_currency: currency,
            };
            let receipt = walkthrough::run(&state, &input).await?;
            println!("{receipt}");
            Ok(())
        }
    }
}

async fn serve(
    config: &ServiceConfig,
    state: AppState,
) -> Result<()> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(%address, backend = %config.backend, "taxpay listening");

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("taxpay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

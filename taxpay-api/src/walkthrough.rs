//! Drives the five-step flow in-process against the configured backends.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rust_decimal::Decimal;
use taxpay_core::backend::mock::conversion_rate;
use taxpay_core::wallet::{SimulatedWallet, WalletConnector};
use taxpay_core::{APPROVAL_SENTINEL, FlowController, Receipt, TaxCalculator, TaxType};
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct WalkthroughInput {
    pub wallet_address: String,
    /// Simulated wallet balance in lamports.
    pub balance_lamports: u64,
    pub tax_id: String,
    pub income: Decimal,
    pub tax_type: TaxType,
    pub crypto_currency: String,
}

/// Connects a simulated wallet, verifies the payer, calculates, pays and
/// returns the receipt.
pub async fn run(
    state: &AppState,
    input: &WalkthroughInput,
) -> Result<Receipt> {
    let mut flow = FlowController::new();

    let mut connector = WalletConnector::new(
        SimulatedWallet::new(&input.wallet_address).with_balance(input.balance_lamports),
    );
    let Some(address) = connector.connect().await.context("Wallet connection failed")? else {
        bail!("wallet connected without reporting an address");
    };
    for notice in connector.take_notices() {
        warn!(%notice, "wallet notice");
    }
    flow.wallet_connected(address)?;

    let verification = state
        .verifier
        .verify(&input.tax_id)
        .await
        .context("Tax ID verification failed")?;
    info!(name = %verification.taxpayer_name, "payer verified");
    flow.payer_validated(verification)?;

    let computation = TaxCalculator::new(&state.schedules)
        .calculate(input.income, input.tax_type)
        .context("Tax calculation failed")?;
    for line in computation.breakdown() {
        info!(%line, "tax band");
    }
    let crypto_amount = computation.tax_amount * conversion_rate(&input.crypto_currency);
    flow.tax_calculated(computation)?;

    let submission = flow.payment_submission(
        crypto_amount.normalize().to_string(),
        input.crypto_currency.clone(),
        Some(APPROVAL_SENTINEL.to_string()),
    )?;
    let record = state
        .processor
        .process(&submission)
        .await
        .context("Payment failed")?;
    flow.payment_completed(record)?;

    Ok(flow.receipt(Utc::now())?)
}

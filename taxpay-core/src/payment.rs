//! Payment submission checks and hand-off to settlement.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. required fields present
//! 2. both amounts readable as decimals and strictly positive
//! 3. wallet approval marker present
//!
//! The approval marker is [`APPROVAL_SENTINEL`]. It is a placeholder the
//! client sends once the user confirms in their wallet; it carries no
//! cryptographic proof and nothing here treats it as one.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{ServiceError, SettlementGateway};
use crate::models::{PaymentRecord, PaymentSubmission, ValidatedPayment};

/// Value of the `signature` field that marks a wallet-approved payment.
pub const APPROVAL_SENTINEL: &str = "verified";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Missing required payment fields")]
    MissingFields,

    #[error("Payment amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Payment amount is not a valid number: {0}")]
    InvalidAmount(String),

    #[error("Payment signature not verified")]
    SignatureNotVerified,

    #[error("Settlement failed: {0}")]
    Settlement(#[from] ServiceError),
}

impl PaymentError {
    /// True for failures caused by the submission itself rather than by
    /// the settlement backend.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Settlement(_))
    }
}

#[derive(Clone)]
pub struct PaymentProcessor {
    gateway: Arc<dyn SettlementGateway>,
}

impl PaymentProcessor {
    pub fn new(gateway: Arc<dyn SettlementGateway>) -> Self {
        Self { gateway }
    }

    /// Runs the ordered checks without settling anything.
    pub fn validate(submission: &PaymentSubmission) -> Result<ValidatedPayment, PaymentError> {
        let (
            Some(wallet_address),
            Some(crypto_amount),
            Some(crypto_currency),
            Some(tax_amount),
            Some(tax_type),
        ) = (
            present(&submission.wallet_address),
            present(&submission.crypto_amount),
            present(&submission.crypto_currency),
            present(&submission.tax_amount),
            present(&submission.tax_type),
        )
        else {
            return Err(PaymentError::MissingFields);
        };

        let crypto_amount = positive_amount(crypto_amount)?;
        let tax_amount = positive_amount(tax_amount)?;

        if submission.signature.as_deref() != Some(APPROVAL_SENTINEL) {
            return Err(PaymentError::SignatureNotVerified);
        }

        Ok(ValidatedPayment {
            wallet_address: wallet_address.to_string(),
            crypto_amount,
            crypto_currency: crypto_currency.to_string(),
            tax_amount,
            tax_type: tax_type.to_string(),
        })
    }

    /// Validates `submission` and settles it through the gateway.
    pub async fn process(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentRecord, PaymentError> {
        debug!(
            wallet_address = ?submission.wallet_address,
            crypto_amount = ?submission.crypto_amount,
            crypto_currency = ?submission.crypto_currency,
            tax_amount = ?submission.tax_amount,
            tax_type = ?submission.tax_type,
            "processing payment"
        );

        let payment = Self::validate(submission).inspect_err(|error| {
            warn!(%error, "payment rejected");
        })?;
        let record = self.gateway.settle(&payment).await?;

        info!(transaction_id = %record.transaction_id, "payment processed");
        Ok(record)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Plain or scientific notation. Values outside `Decimal`'s range, in
/// either direction, are invalid rather than non-positive.
fn positive_amount(raw: &str) -> Result<Decimal, PaymentError> {
    let invalid = || PaymentError::InvalidAmount(raw.to_string());
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| invalid())?;

    let mantissa = raw.split(['e', 'E']).next().unwrap_or_default();
    if amount.is_zero() && mantissa.contains(|c: char| matches!(c, '1'..='9')) {
        return Err(invalid());
    }

    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(PaymentError::NonPositiveAmount)
    }
}

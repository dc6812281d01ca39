//! Stand-in registry and settlement used until real integrations exist.
//!
//! Neither type talks to anything: the registry picks a placeholder name from
//! the identifier's trailing digit and the settlement invents a transaction id
//! and a fixed conversion rate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::backend::service::{ServiceError, SettlementGateway, TaxIdRegistry};
use crate::models::{PaymentRecord, PaymentStatus, TaxpayerRecord, ValidatedPayment};
use crate::verification::TaxId;

pub const PLACEHOLDER_TAXPAYERS: [&str; 5] = [
    "ADEYEMI OLUWASEUN JOHNSON",
    "NKECHI AMARA OKONKWO",
    "IBRAHIM MOHAMMED BELLO",
    "CHIOMA GRACE EZE",
    "OLUWATOBI DAVID AKINOLA",
];

const TRANSACTION_SUFFIX_LEN: usize = 7;

#[derive(Debug, Clone, Copy, Default)]
pub struct MockTaxIdRegistry;

#[async_trait]
impl TaxIdRegistry for MockTaxIdRegistry {
    async fn lookup(
        &self,
        tax_id: &TaxId,
    ) -> Result<TaxpayerRecord, ServiceError> {
        let digit = tax_id.trailing_digit().ok_or_else(|| {
            ServiceError::UnexpectedResponse(format!("tax id {tax_id} has no digits"))
        })?;
        let name = PLACEHOLDER_TAXPAYERS[digit as usize % PLACEHOLDER_TAXPAYERS.len()];

        Ok(TaxpayerRecord {
            name: name.to_string(),
            verified: true,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockSettlement;

#[async_trait]
impl SettlementGateway for MockSettlement {
    async fn settle(
        &self,
        payment: &ValidatedPayment,
    ) -> Result<PaymentRecord, ServiceError> {
        let now = Utc::now();
        let transaction_id = generate_transaction_id(now);

        info!(%transaction_id, "payment settled");

        Ok(PaymentRecord {
            transaction_id,
            wallet_address: payment.wallet_address.clone(),
            crypto_amount: payment.crypto_amount,
            crypto_currency: payment.crypto_currency.clone(),
            tax_amount: payment.tax_amount,
            tax_type: payment.tax_type.clone(),
            timestamp: now,
            status: PaymentStatus::Completed,
            conversion_rate: conversion_rate(&payment.crypto_currency),
            ngn_received: payment.tax_amount,
            processing_fee: Decimal::ZERO,
            net_amount: payment.tax_amount,
        })
    }
}

/// Hard-coded rate: `SOL` has a fixed rate, every other code converts 1:1.
pub fn conversion_rate(crypto_currency: &str) -> Decimal {
    match crypto_currency {
        "SOL" => dec!(0.012),
        _ => Decimal::ONE,
    }
}

/// `TXN-<epoch millis>-<7 uppercase alphanumerics>`.
pub fn generate_transaction_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TRANSACTION_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();

    format!("TXN-{}-{suffix}", now.timestamp_millis())
}

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A proposed crypto payment exactly as it arrived at the boundary.
///
/// Every field is optional here; [`crate::payment::PaymentProcessor`] decides
/// what is missing. Amounts stay textual until validation so that numbers
/// and numeric strings are accepted alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSubmission {
    pub wallet_address: Option<String>,
    pub crypto_amount: Option<String>,
    pub crypto_currency: Option<String>,
    pub tax_amount: Option<String>,
    pub tax_type: Option<String>,
    pub signature: Option<String>,
}

/// A submission that passed field, amount and approval checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedPayment {
    pub wallet_address: String,
    pub crypto_amount: Decimal,
    pub crypto_currency: String,
    pub tax_amount: Decimal,
    pub tax_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
}

/// Settlement record returned by a [`crate::backend::SettlementGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub transaction_id: String,
    pub wallet_address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub crypto_amount: Decimal,
    pub crypto_currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,
    pub tax_type: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub status: PaymentStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub conversion_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ngn_received: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub processing_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_amount: Decimal,
}

/// What a tax-ID registry knows about a taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerRecord {
    pub name: String,
    pub verified: bool,
}

/// ISO-8601 UTC timestamps with millisecond precision (`2026-10-18T09:30:00.123Z`).
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

impl PaymentRecord {
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

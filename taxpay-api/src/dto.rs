//! Wire shapes for the JSON endpoints. Field names are camelCase on the wire.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use taxpay_core::{PaymentRecord, PaymentSubmission, TaxComputation, TaxIdVerification, TaxType};

/// An amount sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Number(serde_json::Number),
    Text(String),
}

impl AmountField {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

// =============================================================================
// verify-tax-id
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTaxIdRequest {
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTaxIdResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxpayer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyTaxIdResponse {
    pub fn verified(verification: TaxIdVerification) -> Self {
        Self {
            success: true,
            taxpayer_name: Some(verification.taxpayer_name),
            tax_id: Some(verification.tax_id.into()),
            verified: Some(verification.verified),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            taxpayer_name: None,
            tax_id: None,
            verified: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// process-tax-payment
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessPaymentRequest {
    pub wallet_address: Option<String>,
    pub crypto_amount: Option<AmountField>,
    pub crypto_currency: Option<String>,
    pub tax_amount: Option<AmountField>,
    pub tax_type: Option<String>,
    pub signature: Option<String>,
}

impl From<ProcessPaymentRequest> for PaymentSubmission {
    fn from(request: ProcessPaymentRequest) -> Self {
        Self {
            wallet_address: request.wallet_address,
            crypto_amount: request.crypto_amount.as_ref().map(AmountField::as_text),
            crypto_currency: request.crypto_currency,
            tax_amount: request.tax_amount.as_ref().map(AmountField::as_text),
            tax_type: request.tax_type,
            signature: request.signature,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Always present; `null` on failure.
    pub details: Option<PaymentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessPaymentResponse {
    pub fn processed(record: PaymentRecord) -> Self {
        Self {
            success: true,
            transaction_id: Some(record.transaction_id.clone()),
            details: Some(record),
            message: Some("Payment processed successfully".to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id: None,
            details: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// calculate-tax
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculateTaxRequest {
    pub income: Option<AmountField>,
    pub tax_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTaxResponse {
    pub success: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub tax_amount: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub income: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<TaxType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalculateTaxResponse {
    pub fn calculated(computation: TaxComputation) -> Self {
        Self {
            success: true,
            tax_amount: Some(computation.tax_amount),
            income: Some(computation.income),
            breakdown: Some(computation.breakdown()),
            tax_type: Some(computation.tax_type),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tax_amount: None,
            income: None,
            breakdown: None,
            tax_type: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// health
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn amounts_accept_numbers_and_strings() {
        let request: ProcessPaymentRequest = serde_json::from_value(json!({
            "walletAddress": "ADDR1",
            "cryptoAmount": 1.2,
            "taxAmount": "43000",
        }))
        .unwrap();

        let submission = PaymentSubmission::from(request);

        assert_eq!(submission.crypto_amount.as_deref(), Some("1.2"));
        assert_eq!(submission.tax_amount.as_deref(), Some("43000"));
        assert_eq!(submission.crypto_currency, None);
    }

    #[test]
    fn null_amount_is_absent() {
        let request: ProcessPaymentRequest =
            serde_json::from_value(json!({ "taxAmount": null })).unwrap();

        assert_eq!(request.tax_amount, None);
    }

    #[test]
    fn failed_payment_keeps_null_details() {
        let body = serde_json::to_value(ProcessPaymentResponse::failed("nope")).unwrap();

        assert_eq!(
            body,
            json!({ "success": false, "details": null, "error": "nope" })
        );
    }

    #[test]
    fn failed_verification_has_only_error() {
        let body = serde_json::to_value(VerifyTaxIdResponse::failed("Tax ID is required")).unwrap();

        assert_eq!(
            body,
            json!({ "success": false, "error": "Tax ID is required" })
        );
    }
}

//! Payment receipt rendered from a completed session.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::format_amount;
use crate::flow::Session;
use crate::models::{PaymentStatus, TaxType};

const RECEIPT_SUFFIX: &str = "GUTSBJPY";
const ASSESSMENT_SUFFIX: &str = "911";
const PAYER_ADDRESS: &str = "LAGOS, NIGERIA";
const AGENCY: &str = "LIRS/Lekki Tax Station - PAYE Direct";
const ISSUER: &str = "Lagos State Government";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_number: String,
    pub assessment_reference: String,
    pub payment_date: String,
    pub tax_year: i32,
    pub payer_id: String,
    pub taxpayer_name: String,
    pub wallet_address: String,
    pub tax_type: TaxType,
    pub tax_amount: Decimal,
    pub transaction_id: String,
    pub status: PaymentStatus,
}

impl Receipt {
    /// Builds the receipt once every step has captured its data.
    ///
    /// Returns `None` if the session is missing any of wallet, payer,
    /// computation or payment.
    pub fn from_session(
        session: &Session,
        issued_at: DateTime<Utc>,
    ) -> Option<Self> {
        let wallet_address = session.wallet_address()?;
        let payer = session.payer()?;
        let computation = session.computation()?;
        let payment = session.payment()?;

        let millis = issued_at.timestamp_millis().to_string();
        let payer_id = payer.tax_id.as_str();

        Some(Self {
            receipt_number: format!("{}/{RECEIPT_SUFFIX}", last_chars(&millis, 8)),
            assessment_reference: format!(
                "{payer_id}-{}-{ASSESSMENT_SUFFIX}",
                last_chars(&millis, 10)
            ),
            payment_date: issued_at.format("%A, %b %-d, %Y").to_string(),
            tax_year: issued_at.year(),
            payer_id: payer_id.to_string(),
            taxpayer_name: payer.taxpayer_name.clone(),
            wallet_address: wallet_address.to_string(),
            tax_type: computation.tax_type,
            tax_amount: computation.tax_amount,
            transaction_id: payment.transaction_id.clone(),
            status: payment.status,
        })
    }

    /// `first 10...last 8`; addresses of 18 characters or fewer are shown whole.
    pub fn short_wallet(&self) -> String {
        let chars: Vec<char> = self.wallet_address.chars().collect();
        if chars.len() <= 18 {
            return self.wallet_address.clone();
        }
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 8..].iter().collect();
        format!("{head}...{tail}")
    }

    pub fn amount_line(&self) -> String {
        format!("NGN {} (Naira only)", format_amount(self.tax_amount))
    }

    pub fn payer_line(&self) -> String {
        format!("TAX PAYER / {}", self.payer_id)
    }

    pub fn agency_line(&self) -> String {
        format!("{AGENCY} // Tax Year: {}", self.tax_year)
    }

    pub fn payment_line(&self) -> String {
        format!(
            "Paid via Crypto/Digital Payment of {} into LIRS - Consolidated Revenue Account",
            self.payment_date
        )
    }
}

impl fmt::Display for Receipt {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{ISSUER}")?;
        writeln!(f, "Receipt No: {}", self.receipt_number)?;
        writeln!(f, "Assessment Ref: {}", self.assessment_reference)?;
        writeln!(f)?;
        writeln!(f, "Payer: {}", self.payer_line())?;
        writeln!(f, "Name: {}", self.taxpayer_name)?;
        writeln!(f, "Address: {PAYER_ADDRESS}")?;
        writeln!(f, "Amount: {}", self.amount_line())?;
        writeln!(f, "Tax Type: {} ({})", self.tax_type.label(), self.tax_type)?;
        writeln!(f, "Agency: {}", self.agency_line())?;
        writeln!(f, "Payment: {}", self.payment_line())?;
        writeln!(f, "Wallet: {}", self.short_wallet())?;
        writeln!(f, "Transaction: {}", self.transaction_id)?;
        write!(f, "Status: {} - Verified & Confirmed", self.status_label())
    }
}

impl Receipt {
    fn status_label(&self) -> &'static str {
        match self.status {
            PaymentStatus::Completed => "COMPLETED",
        }
    }
}

fn last_chars(
    value: &str,
    count: usize,
) -> &str {
    &value[value.len().saturating_sub(count)..]
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tax schemes the calculator knows how to assess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(rename = "PAYE")]
    PayAsYouEarn,
    #[serde(rename = "PIT")]
    PersonalIncome,
    #[serde(rename = "CIT")]
    CompanyIncome,
    #[serde(rename = "CGT")]
    CapitalGains,
    #[serde(rename = "VAT")]
    ValueAdded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported tax type '{0}'. Supported: PAYE, PIT, CIT, CGT, VAT")]
pub struct UnknownTaxType(pub String);

impl TaxType {
    pub fn all() -> &'static [TaxType] {
        &[
            TaxType::PayAsYouEarn,
            TaxType::PersonalIncome,
            TaxType::CompanyIncome,
            TaxType::CapitalGains,
            TaxType::ValueAdded,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PayAsYouEarn => "PAYE",
            Self::PersonalIncome => "PIT",
            Self::CompanyIncome => "CIT",
            Self::CapitalGains => "CGT",
            Self::ValueAdded => "VAT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PAYE" => Some(Self::PayAsYouEarn),
            "PIT" => Some(Self::PersonalIncome),
            "CIT" => Some(Self::CompanyIncome),
            "CGT" => Some(Self::CapitalGains),
            "VAT" => Some(Self::ValueAdded),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PayAsYouEarn => "Pay As You Earn",
            Self::PersonalIncome => "Personal Income Tax (Direct Assessment)",
            Self::CompanyIncome => "Company Income Tax",
            Self::CapitalGains => "Capital Gains Tax",
            Self::ValueAdded => "Value Added Tax",
        }
    }
}

impl FromStr for TaxType {
    type Err = UnknownTaxType;

    /// Accepts the wire code with surrounding whitespace and in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&s.trim().to_uppercase()).ok_or_else(|| UnknownTaxType(s.to_string()))
    }
}

impl fmt::Display for TaxType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

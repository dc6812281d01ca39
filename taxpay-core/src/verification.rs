//! Tax identifier normalization and verification.
//!
//! Two shapes are accepted after trimming and uppercasing: a 10-digit TIN
//! (`1234567890`) or a taxpayer id (`N-12345678`). Anything that passes is
//! handed to the configured [`TaxIdRegistry`].

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::backend::{ServiceError, TaxIdRegistry};

static TIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("TIN pattern is valid"));
static TAXPAYER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^N-[0-9]{8}$").expect("taxpayer id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxIdError {
    #[error("Tax ID is required")]
    Missing,

    #[error("Invalid Tax ID format. Please enter a 10-digit TIN or N-XXXXXXXX format.")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxIdKind {
    /// 10-digit Tax Identification Number.
    Tin,
    /// `N-` followed by 8 digits.
    TaxpayerId,
}

/// A normalized, format-checked tax identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxId {
    value: String,
}

impl TaxId {
    pub fn parse(raw: &str) -> Result<Self, TaxIdError> {
        let value = raw.trim().to_uppercase();
        if value.is_empty() {
            return Err(TaxIdError::Missing);
        }
        if TIN_PATTERN.is_match(&value) || TAXPAYER_ID_PATTERN.is_match(&value) {
            Ok(Self { value })
        } else {
            Err(TaxIdError::InvalidFormat(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TaxIdKind {
        if self.value.starts_with("N-") {
            TaxIdKind::TaxpayerId
        } else {
            TaxIdKind::Tin
        }
    }

    /// Last decimal digit of the identifier.
    pub fn trailing_digit(&self) -> Option<u32> {
        self.value.chars().rev().find_map(|c| c.to_digit(10))
    }
}

impl FromStr for TaxId {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaxId {
    type Error = TaxIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaxId> for String {
    fn from(id: TaxId) -> Self {
        id.value
    }
}

impl fmt::Display for TaxId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A successful verification: the normalized id and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxIdVerification {
    pub tax_id: TaxId,
    pub taxpayer_name: String,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error(transparent)]
    Invalid(#[from] TaxIdError),

    #[error("registry lookup failed: {0}")]
    Registry(#[from] ServiceError),
}

/// Format check followed by a registry lookup.
#[derive(Clone)]
pub struct TaxIdVerifier {
    registry: Arc<dyn TaxIdRegistry>,
}

impl TaxIdVerifier {
    pub fn new(registry: Arc<dyn TaxIdRegistry>) -> Self {
        Self { registry }
    }

    pub async fn verify(
        &self,
        raw: &str,
    ) -> Result<TaxIdVerification, VerificationError> {
        debug!(tax_id = %raw, "verifying tax id");
        let tax_id = TaxId::parse(raw)?;
        let record = self.registry.lookup(&tax_id).await?;

        info!(%tax_id, kind = ?tax_id.kind(), "tax id verified");

        Ok(TaxIdVerification {
            tax_id,
            taxpayer_name: record.name,
            verified: record.verified,
        })
    }
}

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PaymentRecord, TaxpayerRecord, ValidatedPayment};
use crate::verification::TaxId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Looks up taxpayers by a validated identifier.
#[async_trait]
pub trait TaxIdRegistry: Send + Sync {
    async fn lookup(
        &self,
        tax_id: &TaxId,
    ) -> Result<TaxpayerRecord, ServiceError>;
}

/// Settles a validated payment and reports the resulting record.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    async fn settle(
        &self,
        payment: &ValidatedPayment,
    ) -> Result<PaymentRecord, ServiceError>;
}

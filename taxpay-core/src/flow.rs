//! Forward-only sequencer for one payment session.
//!
//! | Step | Trigger | Next | Captured |
//! |------|---------|------|----------|
//! | wallet | [`FlowController::wallet_connected`] | payer | wallet address |
//! | payer | [`FlowController::payer_validated`] | calculator | verified tax id |
//! | calculator | [`FlowController::tax_calculated`] | payment overlay | computation |
//! | payment overlay | [`FlowController::payment_completed`] | receipt | settlement record |
//! | receipt | terminal | | |
//!
//! The payment overlay sits on top of the calculator step and may be
//! dismissed with [`FlowController::payment_dismissed`], after which the tax
//! can be recalculated. A trigger that arrives out of order is rejected and
//! leaves the session untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::TaxComputation;
use crate::models::{PaymentRecord, PaymentSubmission};
use crate::receipt::Receipt;
use crate::verification::{TaxId, TaxIdVerification};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Wallet,
    Payer,
    Calculator,
    Receipt,
}

impl fmt::Display for Step {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Wallet => "wallet",
            Self::Payer => "payer",
            Self::Calculator => "calculator",
            Self::Receipt => "receipt",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("'{trigger}' is not allowed at the {step} step (payment overlay open: {overlay_open})")]
    OutOfOrder {
        trigger: &'static str,
        step: Step,
        overlay_open: bool,
    },

    #[error("wallet address must not be empty")]
    EmptyWalletAddress,

    #[error("tax id {0} was not verified")]
    UnverifiedPayer(TaxId),

    #[error("payment record does not match the session: {0}")]
    PaymentMismatch(&'static str),
}

/// Data captured so far. Each field is written once by its owning step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    wallet_address: Option<String>,
    payer: Option<TaxIdVerification>,
    computation: Option<TaxComputation>,
    payment: Option<PaymentRecord>,
}

impl Session {
    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    pub fn payer(&self) -> Option<&TaxIdVerification> {
        self.payer.as_ref()
    }

    pub fn computation(&self) -> Option<&TaxComputation> {
        self.computation.as_ref()
    }

    pub fn payment(&self) -> Option<&PaymentRecord> {
        self.payment.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlowController {
    session: Session,
    step: Step,
    overlay_open: bool,
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_overlay_open(&self) -> bool {
        self.overlay_open
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_complete(&self) -> bool {
        self.step == Step::Receipt
    }

    /// Wallet step done: records the address and moves to payer validation.
    pub fn wallet_connected(
        &mut self,
        address: impl Into<String>,
    ) -> Result<(), FlowError> {
        self.expect("wallet connected", Step::Wallet, false)?;
        let address = address.into();
        if address.trim().is_empty() {
            return Err(FlowError::EmptyWalletAddress);
        }

        debug!(%address, "wallet step complete");
        self.session.wallet_address = Some(address);
        self.step = Step::Payer;
        Ok(())
    }

    /// Payer step done: records the verified id and moves to the calculator.
    pub fn payer_validated(
        &mut self,
        verification: TaxIdVerification,
    ) -> Result<(), FlowError> {
        self.expect("payer validated", Step::Payer, false)?;
        if !verification.verified {
            return Err(FlowError::UnverifiedPayer(verification.tax_id));
        }

        debug!(tax_id = %verification.tax_id, "payer step complete");
        self.session.payer = Some(verification);
        self.step = Step::Calculator;
        Ok(())
    }

    /// Calculator step done: records the computation and opens the payment overlay.
    pub fn tax_calculated(
        &mut self,
        computation: TaxComputation,
    ) -> Result<(), FlowError> {
        self.expect("tax calculated", Step::Calculator, false)?;

        debug!(
            tax_amount = %computation.tax_amount,
            tax_type = %computation.tax_type,
            "calculator step complete"
        );
        self.session.computation = Some(computation);
        self.overlay_open = true;
        Ok(())
    }

    /// Closes the payment overlay without paying; the computation is kept.
    pub fn payment_dismissed(&mut self) -> Result<(), FlowError> {
        self.expect("payment dismissed", Step::Calculator, true)?;
        self.overlay_open = false;
        Ok(())
    }

    /// Builds the processor request for the open overlay from session data.
    pub fn payment_submission(
        &self,
        crypto_amount: impl Into<String>,
        crypto_currency: impl Into<String>,
        signature: Option<String>,
    ) -> Result<PaymentSubmission, FlowError> {
        self.expect("payment submitted", Step::Calculator, true)?;
        let computation = self.computation()?;

        Ok(PaymentSubmission {
            wallet_address: self.session.wallet_address.clone(),
            crypto_amount: Some(crypto_amount.into()),
            crypto_currency: Some(crypto_currency.into()),
            tax_amount: Some(computation.tax_amount.to_string()),
            tax_type: Some(computation.tax_type.as_str().to_string()),
            signature,
        })
    }

    /// Payment overlay done: records the settlement and moves to the receipt.
    pub fn payment_completed(
        &mut self,
        record: PaymentRecord,
    ) -> Result<(), FlowError> {
        self.expect("payment completed", Step::Calculator, true)?;
        let computation = self.computation()?;

        if self.session.wallet_address.as_deref() != Some(record.wallet_address.as_str()) {
            return Err(FlowError::PaymentMismatch("wallet address"));
        }
        if record.tax_amount != computation.tax_amount {
            return Err(FlowError::PaymentMismatch("tax amount"));
        }
        if record.tax_type != computation.tax_type.as_str() {
            return Err(FlowError::PaymentMismatch("tax type"));
        }

        info!(transaction_id = %record.transaction_id, "payment step complete");
        self.session.payment = Some(record);
        self.overlay_open = false;
        self.step = Step::Receipt;
        Ok(())
    }

    /// Renders the receipt once the flow has reached its terminal step.
    pub fn receipt(
        &self,
        issued_at: DateTime<Utc>,
    ) -> Result<Receipt, FlowError> {
        self.expect("receipt", Step::Receipt, false)?;
        Receipt::from_session(&self.session, issued_at)
            .ok_or(FlowError::OutOfOrder {
                trigger: "receipt",
                step: self.step,
                overlay_open: self.overlay_open,
            })
    }

    fn expect(
        &self,
        trigger: &'static str,
        step: Step,
        overlay_open: bool,
    ) -> Result<(), FlowError> {
        if self.step == step && self.overlay_open == overlay_open {
            Ok(())
        } else {
            Err(FlowError::OutOfOrder {
                trigger,
                step: self.step,
                overlay_open: self.overlay_open,
            })
        }
    }

    fn computation(&self) -> Result<&TaxComputation, FlowError> {
        self.session
            .computation
            .as_ref()
            .ok_or(FlowError::OutOfOrder {
                trigger: "payment",
                step: self.step,
                overlay_open: self.overlay_open,
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::{ScheduleBook, TaxCalculator};
    use crate::models::{PaymentStatus, TaxType};

    fn verification() -> TaxIdVerification {
        TaxIdVerification {
            tax_id: TaxId::parse("1234567890").unwrap(),
            taxpayer_name: "ADEYEMI OLUWASEUN JOHNSON".to_string(),
            verified: true,
        }
    }

    fn computation() -> TaxComputation {
        let book = ScheduleBook::statutory();
        TaxCalculator::new(&book)
            .calculate(dec!(500000), TaxType::PayAsYouEarn)
            .unwrap()
    }

    fn record(
        wallet: &str,
        tax_amount: Decimal,
    ) -> PaymentRecord {
        PaymentRecord {
            transaction_id: "TXN-1-ABCDEFG".to_string(),
            wallet_address: wallet.to_string(),
            crypto_amount: dec!(1.2),
            crypto_currency: "SOL".to_string(),
            tax_amount,
            tax_type: "PAYE".to_string(),
            timestamp: Utc.timestamp_millis_opt(1_792_315_800_123).unwrap(),
            status: PaymentStatus::Completed,
            conversion_rate: dec!(0.012),
            ngn_received: tax_amount,
            processing_fee: Decimal::ZERO,
            net_amount: tax_amount,
        }
    }

    fn at_calculator() -> FlowController {
        let mut flow = FlowController::new();
        flow.wallet_connected("ADDR1").unwrap();
        flow.payer_validated(verification()).unwrap();
        flow
    }

    #[test]
    fn starts_at_wallet_step() {
        let flow = FlowController::new();

        assert_eq!(flow.step(), Step::Wallet);
        assert!(!flow.is_overlay_open());
        assert_eq!(flow.session(), &Session::default());
    }

    #[test]
    fn calculator_trigger_before_wallet_is_rejected() {
        let mut flow = FlowController::new();

        let result = flow.tax_calculated(computation());

        assert_eq!(
            result,
            Err(FlowError::OutOfOrder {
                trigger: "tax calculated",
                step: Step::Wallet,
                overlay_open: false,
            })
        );
        assert_eq!(flow.session().computation(), None);
    }

    #[test]
    fn payer_trigger_before_wallet_is_rejected() {
        let mut flow = FlowController::new();

        assert!(flow.payer_validated(verification()).is_err());
        assert_eq!(flow.step(), Step::Wallet);
    }

    #[test]
    fn empty_wallet_address_does_not_advance() {
        let mut flow = FlowController::new();

        assert_eq!(flow.wallet_connected("  "), Err(FlowError::EmptyWalletAddress));
        assert_eq!(flow.step(), Step::Wallet);
    }

    #[test]
    fn wallet_cannot_be_connected_twice() {
        let mut flow = FlowController::new();
        flow.wallet_connected("ADDR1").unwrap();

        assert!(flow.wallet_connected("ADDR2").is_err());
        assert_eq!(flow.session().wallet_address(), Some("ADDR1"));
    }

    #[test]
    fn unverified_payer_is_rejected() {
        let mut flow = FlowController::new();
        flow.wallet_connected("ADDR1").unwrap();
        let mut unverified = verification();
        unverified.verified = false;

        let result = flow.payer_validated(unverified);

        assert!(matches!(result, Err(FlowError::UnverifiedPayer(_))));
        assert_eq!(flow.step(), Step::Payer);
    }

    #[test]
    fn tax_calculated_opens_overlay() {
        let mut flow = at_calculator();

        flow.tax_calculated(computation()).unwrap();

        assert_eq!(flow.step(), Step::Calculator);
        assert!(flow.is_overlay_open());
    }

    #[test]
    fn dismissed_overlay_allows_recalculation() {
        let mut flow = at_calculator();
        flow.tax_calculated(computation()).unwrap();

        flow.payment_dismissed().unwrap();
        assert!(!flow.is_overlay_open());

        let book = ScheduleBook::statutory();
        let updated = TaxCalculator::new(&book)
            .calculate(dec!(100000), TaxType::ValueAdded)
            .unwrap();
        flow.tax_calculated(updated.clone()).unwrap();

        assert_eq!(flow.session().computation(), Some(&updated));
    }

    #[test]
    fn recalculation_is_blocked_while_overlay_open() {
        let mut flow = at_calculator();
        flow.tax_calculated(computation()).unwrap();

        assert!(flow.tax_calculated(computation()).is_err());
    }

    #[test]
    fn payment_submission_is_built_from_session() {
        let mut flow = at_calculator();
        flow.tax_calculated(computation()).unwrap();

        let submission = flow
            .payment_submission("1.2", "SOL", Some("verified".to_string()))
            .unwrap();

        assert_eq!(
            submission,
            PaymentSubmission {
                wallet_address: Some("ADDR1".to_string()),
                crypto_amount: Some("1.2".to_string()),
                crypto_currency: Some("SOL".to_string()),
                tax_amount: Some("43000.00".to_string()),
                tax_type: Some("PAYE".to_string()),
                signature: Some("verified".to_string()),
            }
        );
    }

    #[test]
    fn payment_submission_requires_open_overlay() {
        let flow = at_calculator();

        assert!(flow.payment_submission("1.2", "SOL", None).is_err());
    }

    #[test]
    fn mismatched_payment_record_is_rejected() {
        let mut flow = at_calculator();
        flow.tax_calculated(computation()).unwrap();

        let wrong_wallet = flow.payment_completed(record("ADDR2", dec!(43000)));
        let wrong_amount = flow.payment_completed(record("ADDR1", dec!(1)));

        assert_eq!(wrong_wallet, Err(FlowError::PaymentMismatch("wallet address")));
        assert_eq!(wrong_amount, Err(FlowError::PaymentMismatch("tax amount")));
        assert!(flow.is_overlay_open());
        assert_eq!(flow.session().payment(), None);
    }

    #[test]
    fn full_sequence_keeps_every_captured_value() {
        let mut flow = FlowController::new();
        let computed = computation();

        flow.wallet_connected("ADDR1").unwrap();
        flow.payer_validated(verification()).unwrap();
        flow.tax_calculated(computed.clone()).unwrap();
        let paid = record("ADDR1", computed.tax_amount);
        flow.payment_completed(paid.clone()).unwrap();

        assert!(flow.is_complete());
        assert!(!flow.is_overlay_open());
        let session = flow.session();
        assert_eq!(session.wallet_address(), Some("ADDR1"));
        assert_eq!(session.payer(), Some(&verification()));
        assert_eq!(session.computation(), Some(&computed));
        assert_eq!(session.payment(), Some(&paid));
    }

    #[test]
    fn receipt_is_terminal() {
        let mut flow = at_calculator();
        let computed = computation();
        flow.tax_calculated(computed.clone()).unwrap();
        flow.payment_completed(record("ADDR1", computed.tax_amount))
            .unwrap();

        assert!(flow.payment_dismissed().is_err());
        assert!(flow.tax_calculated(computed).is_err());
        assert!(flow.receipt(Utc::now()).is_ok());
    }

    #[test]
    fn receipt_before_payment_is_rejected() {
        let flow = at_calculator();

        assert!(matches!(
            flow.receipt(Utc::now()),
            Err(FlowError::OutOfOrder { trigger: "receipt", .. })
        ));
    }
}

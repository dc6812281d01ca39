//! Tax liability calculator.
//!
//! Walks the schedule for the requested [`TaxType`] band by band. Each band's
//! contribution is rounded to currency precision and the total is the sum of
//! those rounded contributions, so the breakdown always adds up to the total.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxpay_core::calculations::{ScheduleBook, TaxCalculator};
//! use taxpay_core::TaxType;
//!
//! let book = ScheduleBook::statutory();
//! let result = TaxCalculator::new(&book)
//!     .calculate(dec!(500000), TaxType::PayAsYouEarn)
//!     .unwrap();
//!
//! assert_eq!(result.tax_amount, dec!(43000.00));
//! assert_eq!(result.breakdown().len(), 2);
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{format_amount, format_rate, round_half_up};
use crate::calculations::schedule::ScheduleBook;
use crate::models::{TaxBracket, TaxType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxCalculatorError {
    #[error("income must not be negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("no tax schedule configured for {0}")]
    NoSchedule(TaxType),
}

/// Tax owed within a single band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketLine {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
    /// Part of the income taxed in this band.
    pub taxable_amount: Decimal,
    pub tax: Decimal,
}

impl fmt::Display for BracketLine {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let rate = format_rate(self.tax_rate);
        let tax = format_amount(self.tax);
        let taxed = format_amount(self.taxable_amount);

        match (self.min_income.is_zero(), self.max_income) {
            (true, None) => write!(f, "Flat rate on NGN {taxed} @ {rate}: NGN {tax}"),
            (true, Some(_)) => write!(f, "First NGN {taxed} @ {rate}: NGN {tax}"),
            (false, None) => write!(
                f,
                "Above NGN {} @ {rate}: NGN {tax}",
                format_amount(self.min_income)
            ),
            (false, Some(_)) => write!(f, "Next NGN {taxed} @ {rate}: NGN {tax}"),
        }
    }
}

/// Result of a tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub tax_amount: Decimal,
    pub income: Decimal,
    pub lines: Vec<BracketLine>,
    pub tax_type: TaxType,
}

impl TaxComputation {
    /// Human-readable per-band descriptions, in band order.
    pub fn breakdown(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}

/// Calculator over a borrowed [`ScheduleBook`].
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    schedules: &'a ScheduleBook,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(schedules: &'a ScheduleBook) -> Self {
        Self { schedules }
    }

    /// Computes the tax owed on `income` under `tax_type`.
    ///
    /// # Errors
    ///
    /// - [`TaxCalculatorError::NegativeIncome`] when `income < 0`
    /// - [`TaxCalculatorError::NoSchedule`] when the book has no schedule for `tax_type`
    pub fn calculate(
        &self,
        income: Decimal,
        tax_type: TaxType,
    ) -> Result<TaxComputation, TaxCalculatorError> {
        if income < Decimal::ZERO {
            return Err(TaxCalculatorError::NegativeIncome(income));
        }

        let brackets = self
            .schedules
            .get(tax_type)
            .ok_or(TaxCalculatorError::NoSchedule(tax_type))?;

        let lines: Vec<BracketLine> = brackets
            .iter()
            .filter_map(|bracket| Self::line_for(bracket, income))
            .collect();

        let tax_amount = lines.iter().map(|line| line.tax).sum::<Decimal>();

        Ok(TaxComputation {
            tax_amount: round_half_up(tax_amount),
            income,
            lines,
            tax_type,
        })
    }

    fn line_for(
        bracket: &TaxBracket,
        income: Decimal,
    ) -> Option<BracketLine> {
        let taxable_amount = bracket.portion_of(income);
        if taxable_amount.is_zero() {
            return None;
        }

        Some(BracketLine {
            min_income: bracket.min_income,
            max_income: bracket.max_income,
            tax_rate: bracket.tax_rate,
            taxable_amount,
            tax: round_half_up(taxable_amount * bracket.tax_rate),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn calculate(
        income: Decimal,
        tax_type: TaxType,
    ) -> TaxComputation {
        let book = ScheduleBook::statutory();
        TaxCalculator::new(&book)
            .calculate(income, tax_type)
            .unwrap()
    }

    // =========================================================================
    // Progressive personal table
    // =========================================================================

    #[test]
    fn paye_within_first_band() {
        let result = calculate(dec!(200000), TaxType::PayAsYouEarn);

        assert_eq!(result.tax_amount, dec!(14000.00));
        assert_eq!(
            result.breakdown(),
            vec!["First NGN 200,000.00 @ 7%: NGN 14,000.00".to_string()]
        );
    }

    #[test]
    fn paye_spanning_two_bands() {
        let result = calculate(dec!(500000), TaxType::PayAsYouEarn);

        // 300,000 * 7% + 200,000 * 11%
        assert_eq!(result.tax_amount, dec!(43000.00));
        assert_eq!(
            result.breakdown(),
            vec![
                "First NGN 300,000.00 @ 7%: NGN 21,000.00".to_string(),
                "Next NGN 200,000.00 @ 11%: NGN 22,000.00".to_string(),
            ]
        );
    }

    #[test]
    fn paye_reaching_top_band() {
        let result = calculate(dec!(5000000), TaxType::PayAsYouEarn);

        // 21,000 + 33,000 + 75,000 + 95,000 + 336,000 + 1,800,000 * 24%
        assert_eq!(result.tax_amount, dec!(992000.00));
        assert_eq!(result.lines.len(), 6);
        assert_eq!(
            result.breakdown().last().unwrap(),
            "Above NGN 3,200,000.00 @ 24%: NGN 432,000.00"
        );
    }

    #[test]
    fn pit_uses_personal_table() {
        let paye = calculate(dec!(1234567.89), TaxType::PayAsYouEarn);
        let pit = calculate(dec!(1234567.89), TaxType::PersonalIncome);

        assert_eq!(pit.tax_amount, paye.tax_amount);
        assert_eq!(pit.tax_type, TaxType::PersonalIncome);
    }

    #[test]
    fn income_on_band_edge_produces_no_empty_line() {
        let result = calculate(dec!(300000), TaxType::PayAsYouEarn);

        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.tax_amount, dec!(21000.00));
    }

    // =========================================================================
    // Flat tables
    // =========================================================================

    #[test]
    fn cit_is_flat_thirty_percent() {
        let result = calculate(dec!(1000000), TaxType::CompanyIncome);

        assert_eq!(result.tax_amount, dec!(300000.00));
        assert_eq!(
            result.breakdown(),
            vec!["Flat rate on NGN 1,000,000.00 @ 30%: NGN 300,000.00".to_string()]
        );
    }

    #[test]
    fn vat_rounds_to_currency_precision() {
        let result = calculate(dec!(1234.57), TaxType::ValueAdded);

        // 1234.57 * 0.075 = 92.59275
        assert_eq!(result.tax_amount, dec!(92.59));
    }

    // =========================================================================
    // Edge cases
    // =========================================================================

    #[test]
    fn zero_income_owes_nothing() {
        let result = calculate(Decimal::ZERO, TaxType::PayAsYouEarn);

        assert_eq!(result.tax_amount, Decimal::ZERO);
        assert!(result.lines.is_empty());
        assert_eq!(result.income, Decimal::ZERO);
    }

    #[test]
    fn negative_income_is_rejected() {
        let book = ScheduleBook::statutory();

        let result = TaxCalculator::new(&book).calculate(dec!(-1), TaxType::PayAsYouEarn);

        assert_eq!(result, Err(TaxCalculatorError::NegativeIncome(dec!(-1))));
    }

    #[test]
    fn missing_schedule_is_reported() {
        let book = ScheduleBook::empty();

        let result = TaxCalculator::new(&book).calculate(dec!(10), TaxType::CapitalGains);

        assert_eq!(
            result,
            Err(TaxCalculatorError::NoSchedule(TaxType::CapitalGains))
        );
    }

    #[test]
    fn breakdown_sums_to_total_and_stays_under_top_rate() {
        let book = ScheduleBook::statutory();
        let calculator = TaxCalculator::new(&book);
        let incomes = [
            dec!(0.01),
            dec!(1),
            dec!(299999.99),
            dec!(600000.005),
            dec!(1599999.995),
            dec!(3333333.33),
            dec!(98765432.10),
        ];

        for tax_type in TaxType::all() {
            let top_rate = book.top_rate(*tax_type).unwrap();
            for income in incomes {
                let result = calculator.calculate(income, *tax_type).unwrap();
                let sum: Decimal = result.lines.iter().map(|l| l.tax).sum();

                assert_eq!(sum, result.tax_amount, "{tax_type} @ {income}");
                assert!(result.tax_amount >= Decimal::ZERO);
                assert!(
                    result.tax_amount <= round_half_up(income * top_rate) + dec!(0.01),
                    "{tax_type} @ {income}"
                );
            }
        }
    }

    #[test]
    fn calculation_is_deterministic() {
        let first = calculate(dec!(777777.77), TaxType::PayAsYouEarn);
        let second = calculate(dec!(777777.77), TaxType::PayAsYouEarn);

        assert_eq!(first, second);
    }
}

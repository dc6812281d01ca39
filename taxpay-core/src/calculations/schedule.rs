//! Bracket schedules per tax type.
//!
//! The built-in book carries the statutory tables:
//!
//! | Tax type | Bands |
//! |----------|-------|
//! | `PAYE`, `PIT` | first 300,000 @ 7%, next 300,000 @ 11%, next 500,000 @ 15%, next 500,000 @ 19%, next 1,600,000 @ 21%, above 3,200,000 @ 24% |
//! | `CIT` | flat 30% |
//! | `CGT` | flat 10% |
//! | `VAT` | flat 7.5% |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::models::{TaxBracket, TaxType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("schedule has no brackets")]
    Empty,

    #[error("first bracket must start at 0, found {0}")]
    NonZeroStart(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    Discontinuous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has an empty or inverted range")]
    EmptyRange { index: usize },

    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("only the last bracket may be open-ended (bracket {index} is not last)")]
    OpenEndedNotLast { index: usize },

    #[error("last bracket must be open-ended")]
    ClosedTop,
}

/// Checks that `brackets` is ordered, contiguous from 0, has sane rates and
/// ends with exactly one open-ended band.
pub fn validate_schedule(brackets: &[TaxBracket]) -> Result<(), ScheduleError> {
    let first = brackets.first().ok_or(ScheduleError::Empty)?;
    if first.min_income != Decimal::ZERO {
        return Err(ScheduleError::NonZeroStart(first.min_income));
    }

    let last_index = brackets.len() - 1;
    let mut expected_floor = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.min_income != expected_floor {
            return Err(ScheduleError::Discontinuous {
                index,
                expected: expected_floor,
                found: bracket.min_income,
            });
        }
        if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
            return Err(ScheduleError::InvalidRate {
                index,
                rate: bracket.tax_rate,
            });
        }
        match bracket.max_income {
            Some(max) if max <= bracket.min_income => {
                return Err(ScheduleError::EmptyRange { index });
            }
            Some(max) => expected_floor = max,
            None if index != last_index => {
                return Err(ScheduleError::OpenEndedNotLast { index });
            }
            None => {}
        }
    }

    if brackets[last_index].is_open_ended() {
        Ok(())
    } else {
        Err(ScheduleError::ClosedTop)
    }
}

/// Bracket schedules keyed by tax type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleBook {
    schedules: BTreeMap<TaxType, Vec<TaxBracket>>,
}

impl ScheduleBook {
    /// A book with no schedules at all.
    pub fn empty() -> Self {
        Self {
            schedules: BTreeMap::new(),
        }
    }

    /// The built-in statutory tables for every supported tax type.
    pub fn statutory() -> Self {
        let personal = vec![
            TaxBracket::new(dec!(0), Some(dec!(300000)), dec!(0.07)),
            TaxBracket::new(dec!(300000), Some(dec!(600000)), dec!(0.11)),
            TaxBracket::new(dec!(600000), Some(dec!(1100000)), dec!(0.15)),
            TaxBracket::new(dec!(1100000), Some(dec!(1600000)), dec!(0.19)),
            TaxBracket::new(dec!(1600000), Some(dec!(3200000)), dec!(0.21)),
            TaxBracket::new(dec!(3200000), None, dec!(0.24)),
        ];

        let mut schedules = BTreeMap::new();
        schedules.insert(TaxType::PayAsYouEarn, personal.clone());
        schedules.insert(TaxType::PersonalIncome, personal);
        schedules.insert(TaxType::CompanyIncome, flat(dec!(0.30)));
        schedules.insert(TaxType::CapitalGains, flat(dec!(0.10)));
        schedules.insert(TaxType::ValueAdded, flat(dec!(0.075)));

        Self { schedules }
    }

    /// Installs `brackets` for `tax_type`, replacing any existing schedule.
    ///
    /// # Errors
    /// The schedule is rejected (and the book left unchanged) when
    /// [`validate_schedule`] fails.
    pub fn insert(
        &mut self,
        tax_type: TaxType,
        brackets: Vec<TaxBracket>,
    ) -> Result<(), ScheduleError> {
        validate_schedule(&brackets)?;
        self.schedules.insert(tax_type, brackets);
        Ok(())
    }

    pub fn get(
        &self,
        tax_type: TaxType,
    ) -> Option<&[TaxBracket]> {
        self.schedules.get(&tax_type).map(Vec::as_slice)
    }

    /// Tax types that have a schedule, in wire-code order.
    pub fn tax_types(&self) -> Vec<TaxType> {
        self.schedules.keys().copied().collect()
    }

    /// Highest marginal rate of the schedule for `tax_type`.
    pub fn top_rate(
        &self,
        tax_type: TaxType,
    ) -> Option<Decimal> {
        self.get(tax_type)?.iter().map(|b| b.tax_rate).max()
    }
}

impl Default for ScheduleBook {
    fn default() -> Self {
        Self::statutory()
    }
}

fn flat(rate: Decimal) -> Vec<TaxBracket> {
    vec![TaxBracket::new(Decimal::ZERO, None, rate)]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn statutory_book_covers_every_tax_type() {
        let book = ScheduleBook::statutory();

        assert_eq!(book.tax_types(), TaxType::all().to_vec());
    }

    #[test]
    fn statutory_schedules_are_valid() {
        let book = ScheduleBook::statutory();

        for tax_type in book.tax_types() {
            let brackets = book.get(tax_type).unwrap();
            assert_eq!(validate_schedule(brackets), Ok(()), "{tax_type}");
        }
    }

    #[test]
    fn top_rate_of_personal_table_is_24_percent() {
        let book = ScheduleBook::statutory();

        assert_eq!(book.top_rate(TaxType::PayAsYouEarn), Some(dec!(0.24)));
    }

    #[test]
    fn empty_schedule_is_rejected() {
        assert_eq!(validate_schedule(&[]), Err(ScheduleError::Empty));
    }

    #[test]
    fn schedule_must_start_at_zero() {
        let brackets = vec![TaxBracket::new(dec!(100), None, dec!(0.1))];

        assert_eq!(
            validate_schedule(&brackets),
            Err(ScheduleError::NonZeroStart(dec!(100)))
        );
    }

    #[test]
    fn gap_between_brackets_is_rejected() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0.1)),
            TaxBracket::new(dec!(1500), None, dec!(0.2)),
        ];

        assert_eq!(
            validate_schedule(&brackets),
            Err(ScheduleError::Discontinuous {
                index: 1,
                expected: dec!(1000),
                found: dec!(1500),
            })
        );
    }

    #[test]
    fn rate_above_one_is_rejected() {
        let brackets = vec![TaxBracket::new(dec!(0), None, dec!(1.5))];

        assert_eq!(
            validate_schedule(&brackets),
            Err(ScheduleError::InvalidRate {
                index: 0,
                rate: dec!(1.5)
            })
        );
    }

    #[test]
    fn open_ended_bracket_must_be_last() {
        let brackets = vec![
            TaxBracket::new(dec!(0), None, dec!(0.1)),
            TaxBracket::new(dec!(0), None, dec!(0.2)),
        ];

        assert_eq!(
            validate_schedule(&brackets),
            Err(ScheduleError::OpenEndedNotLast { index: 0 })
        );
    }

    #[test]
    fn closed_top_is_rejected() {
        let brackets = vec![TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0.1))];

        assert_eq!(validate_schedule(&brackets), Err(ScheduleError::ClosedTop));
    }

    #[test]
    fn insert_leaves_book_unchanged_on_error() {
        let mut book = ScheduleBook::statutory();
        let before = book.clone();

        let result = book.insert(TaxType::ValueAdded, vec![]);

        assert_eq!(result, Err(ScheduleError::Empty));
        assert_eq!(book, before);
    }

    #[test]
    fn insert_replaces_existing_schedule() {
        let mut book = ScheduleBook::statutory();

        book.insert(TaxType::ValueAdded, flat(dec!(0.05))).unwrap();

        assert_eq!(book.top_rate(TaxType::ValueAdded), Some(dec!(0.05)));
    }
}

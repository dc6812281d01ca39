use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of a progressive (or flat) tax schedule.
///
/// `max_income` of `None` marks the open-ended top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Portion of `income` that falls inside this band.
    pub fn portion_of(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.min_income {
            return Decimal::ZERO;
        }
        let ceiling = match self.max_income {
            Some(max) => income.min(max),
            None => income,
        };
        ceiling - self.min_income
    }

    pub fn is_open_ended(&self) -> bool {
        self.max_income.is_none()
    }
}

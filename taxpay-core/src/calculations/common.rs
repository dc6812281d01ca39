//! Shared money helpers for tax calculations and receipt text.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to currency precision (two places), midpoint away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxpay_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount with thousands separators and exactly two decimals.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxpay_core::calculations::common::format_amount;
///
/// assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let fixed = format!("{:.2}", round_half_up(value));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{fraction}")
}

/// Formats a fractional rate as a percentage without trailing zeros (`0.075` -> `7.5%`).
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

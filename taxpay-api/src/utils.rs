use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`] amount.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace and removes commas (thousands separator).
fn normalize_amount_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses an amount typed by a user.
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and scientific
/// notation. Returns `Ok(None)` for empty or whitespace-only input.
pub fn parse_amount(s: &str) -> Result<Option<Decimal>, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map(Some)
        .map_err(|e| {
            tracing::debug!(input = %s, "invalid amount: {}", e);
            ParseAmountError {
                input: s.to_string(),
                source: e,
            }
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_amount_accepts_comma_thousands_separator() {
        assert_eq!(parse_amount("1,234.56").unwrap(), Some(dec!(1234.56)));
        assert_eq!(parse_amount("5,000,000").unwrap(), Some(dec!(5000000)));
    }

    #[test]
    fn parse_amount_trims_whitespace() {
        assert_eq!(parse_amount("  500000  ").unwrap(), Some(dec!(500000)));
    }

    #[test]
    fn parse_amount_empty_is_none() {
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount("   ").unwrap(), None);
    }

    #[test]
    fn parse_amount_accepts_scientific_notation() {
        assert_eq!(parse_amount("5e5").unwrap(), Some(dec!(500000)));
    }

    #[test]
    fn parse_amount_keeps_sign() {
        assert_eq!(parse_amount("-10").unwrap(), Some(dec!(-10)));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        let error = parse_amount("12abc").unwrap_err();

        assert!(error.to_string().starts_with("invalid amount '12abc'"));
    }
}

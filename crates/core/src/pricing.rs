//! Pricing
//!
//! Backorder totals in minor units of an ISO 4217 currency.

use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors raised while pricing a backorder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The currency code is not a known ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The total does not fit in a signed 64-bit amount of minor units.
    #[error("order total overflows")]
    Overflow,
}

/// Look up an ISO 4217 currency by code (case-insensitive).
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] if the code is not recognised.
pub fn find_currency(code: &str) -> Result<&'static Currency, PricingError> {
    iso::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| PricingError::UnknownCurrency(code.to_string()))
}

/// `Σ price × quantity` over `lines`, each price given in minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the total exceeds `i64::MAX` minor units.
pub fn order_total<I>(
    lines: I,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError>
where
    I: IntoIterator<Item = (u64, u64)>,
{
    let mut total = 0_u64;

    for (price, quantity) in lines {
        total = price
            .checked_mul(quantity)
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or(PricingError::Overflow)?;
    }

    let minor = i64::try_from(total).map_err(|_err| PricingError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn finds_currencies_case_insensitively() -> TestResult {
        assert_eq!(find_currency("gbp")?, iso::GBP);
        assert_eq!(find_currency(" USD ")?, iso::USD);

        Ok(())
    }

    #[test]
    fn rejects_unknown_currencies() {
        assert_eq!(
            find_currency("XYZ1"),
            Err(PricingError::UnknownCurrency("XYZ1".to_string()))
        );
    }

    #[test]
    fn totals_every_line() -> TestResult {
        let total = order_total([(1_250, 2), (999, 1)], iso::GBP)?;

        assert_eq!(total, Money::from_minor(3_499, iso::GBP));

        Ok(())
    }

    #[test]
    fn rejects_overflowing_totals() {
        assert_eq!(
            order_total([(u64::MAX, 2)], iso::GBP),
            Err(PricingError::Overflow)
        );
        assert_eq!(
            order_total([(u64::MAX / 2, 1), (u64::MAX / 2, 1)], iso::GBP),
            Err(PricingError::Overflow)
        );
    }
}

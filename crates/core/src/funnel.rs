//! Funnel
//!
//! Conversion rates for restock notifications: sent, opened, clicked, purchased.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw funnel counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelCounts {
    /// Notifications delivered.
    pub total_sent: u64,

    /// Notifications opened.
    pub opened: u64,

    /// Notifications whose link was clicked.
    pub clicked: u64,

    /// Notifications that led to a purchase.
    pub purchased: u64,
}

/// Funnel rates in percent points, each within `0..=100` and rounded to two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunnelRates {
    /// Notifications delivered.
    pub total_sent: u64,

    /// `opened / total_sent`.
    pub open_rate: Decimal,

    /// `clicked / total_sent`.
    pub click_rate: Decimal,

    /// `purchased / total_sent`.
    pub conversion_rate: Decimal,
}

impl FunnelCounts {
    /// Compute the rates for these counters.
    #[must_use]
    pub fn rates(&self) -> FunnelRates {
        FunnelRates {
            total_sent: self.total_sent,
            open_rate: rate(self.opened, self.total_sent),
            click_rate: rate(self.clicked, self.total_sent),
            conversion_rate: rate(self.purchased, self.total_sent),
        }
    }
}

/// `count / total` in percent points, clamped to `0..=100` and rounded to 2dp; zero when
/// nothing was sent.
#[must_use]
pub fn rate(count: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }

    let fraction = Percentage::from(Decimal::from(count) / Decimal::from(total));

    percent_points(fraction).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_zero_when_nothing_was_sent() {
        let rates = FunnelCounts::default().rates();

        assert_eq!(rates.open_rate, Decimal::ZERO);
        assert_eq!(rates.click_rate, Decimal::ZERO);
        assert_eq!(rates.conversion_rate, Decimal::ZERO);
    }

    #[test]
    fn rates_are_rounded_to_two_places() {
        assert_eq!(rate(1, 3), Decimal::new(3333, 2));
        assert_eq!(rate(2, 3), Decimal::new(6667, 2));
        assert_eq!(rate(1, 4), Decimal::new(25, 0));
    }

    #[test]
    fn rates_are_clamped_to_one_hundred() {
        assert_eq!(rate(5, 4), Decimal::ONE_HUNDRED);
        assert_eq!(rate(4, 4), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn funnel_rates_follow_each_counter() {
        let rates = FunnelCounts {
            total_sent: 10,
            opened: 6,
            clicked: 3,
            purchased: 1,
        }
        .rates();

        assert_eq!(rates.total_sent, 10);
        assert_eq!(rates.open_rate, Decimal::new(60, 0));
        assert_eq!(rates.click_rate, Decimal::new(30, 0));
        assert_eq!(rates.conversion_rate, Decimal::new(10, 0));
    }
}

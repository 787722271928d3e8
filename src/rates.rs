//! Fixed-rate math.
//!
//! Pure functions mapping a pool [`Reading`] to the fixed APR its pricing
//! implies, plus the day-count and display-rounding rules the report uses.
//! The math is opaque to the rest of the crate: the assembler only sees
//! the [`RateCalculator`] trait.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::chain::Reading;

/// Seconds in one report day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds in one (non-leap) year, the APR annualization basis.
const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Principal tokens and pool shares are 18-decimal fixed point.
const PT_SCALE: f64 = 1e18;

/// Maps a reading snapshot to a fixed APR value.
///
/// Implemented by [`YieldSpace`] in production; tests substitute fixed
/// values to pin down assembler behavior independent of the math.
pub trait RateCalculator {
    /// Returns the implied fixed APR as a percentage (unrounded).
    fn fixed_apr(&self, reading: &Reading) -> f64;
}

/// The production calculator: yield-space spot price, then annualization.
pub struct YieldSpace;

impl RateCalculator for YieldSpace {
    fn fixed_apr(&self, reading: &Reading) -> f64 {
        fixed_apr(spot_price(reading), reading.seconds_remaining)
    }
}

/// Spot price of the principal token in base-asset terms.
///
/// `(base / (pt + supply))^t` with `t = seconds_remaining / unit_seconds`;
/// the pool's share supply acts as a virtual principal-token reserve, and
/// both sides are normalized to whole-token units first.
pub fn spot_price(reading: &Reading) -> f64 {
    if reading.seconds_remaining <= 0 || reading.unit_seconds <= 0 {
        // Expired pools trade at par.
        return 1.0;
    }

    let t = reading.seconds_remaining as f64 / reading.unit_seconds as f64;
    let base = reading.base_reserves as f64 / 10f64.powi(i32::from(reading.base_decimals));
    let pt = (reading.pt_reserves as f64 + reading.total_supply as f64) / PT_SCALE;

    (base / pt).powf(t)
}

/// Annualizes a discount to a fixed APR percentage.
///
/// Zero when no time remains; expiry at exactly `now` therefore never
/// contributes to a report.
pub fn fixed_apr(spot_price: f64, seconds_remaining: i64) -> f64 {
    if seconds_remaining <= 0 {
        return 0.0;
    }

    let years = seconds_remaining as f64 / SECONDS_PER_YEAR;
    ((1.0 - spot_price) / spot_price / years) * 100.0
}

/// Days until expiry, rounded up. Monotonic in `seconds_remaining`.
pub fn days_remaining(seconds_remaining: i64) -> i64 {
    // Equivalent to `i64::div_ceil`, which is still unstable on this
    // toolchain (`int_roundings`). Rounds toward positive infinity.
    let quotient = seconds_remaining / SECONDS_PER_DAY;
    let remainder = seconds_remaining % SECONDS_PER_DAY;
    if (remainder > 0 && SECONDS_PER_DAY > 0) || (remainder < 0 && SECONDS_PER_DAY < 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// Rounds an APR to two decimal digits, half away from zero, always
/// carrying two fractional digits for display (`3.1` renders as `3.10`).
///
/// Non-finite inputs collapse to zero, which the inclusion filter drops.
pub fn round_apr(apr: f64) -> Decimal {
    let mut rounded = Decimal::from_f64(apr)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reading(seconds_remaining: i64) -> Reading {
        Reading {
            base_reserves: 10_000_000_000_000_000_000_000,
            pt_reserves: 6_000_000_000_000_000_000_000,
            total_supply: 4_100_000_000_000_000_000_000,
            base_decimals: 18,
            seconds_remaining,
            unit_seconds: 1_000_000_000,
        }
    }

    #[test]
    fn one_day_boundary_rounds_up() {
        assert_eq!(days_remaining(86_400), 1);
        assert_eq!(days_remaining(86_401), 2);
        assert_eq!(days_remaining(1), 1);
        assert_eq!(days_remaining(2_592_000), 30);
    }

    #[test]
    fn days_remaining_is_monotonic() {
        let mut prev = days_remaining(1);
        for seconds in (1..1_000_000).step_by(7_919) {
            let current = days_remaining(seconds);
            assert!(current >= prev, "not monotonic at {seconds}");
            prev = current;
        }
    }

    #[test]
    fn apr_is_zero_at_and_after_expiry() {
        assert_eq!(fixed_apr(0.95, 0), 0.0);
        assert_eq!(fixed_apr(0.95, -86_400), 0.0);
    }

    #[test]
    fn discounted_price_implies_positive_apr() {
        // A principal token at 0.99 base with 90 days left yields ~4.1%.
        let apr = fixed_apr(0.99, 90 * SECONDS_PER_DAY);
        assert!(apr > 4.0 && apr < 4.2, "apr = {apr}");
    }

    #[test]
    fn premium_price_implies_negative_apr() {
        assert!(fixed_apr(1.01, 90 * SECONDS_PER_DAY) < 0.0);
    }

    #[test]
    fn spot_price_of_discounted_pool_is_below_par() {
        let price = spot_price(&reading(2_592_000));
        assert!(price > 0.0 && price < 1.0, "price = {price}");
    }

    #[test]
    fn spot_price_of_expired_pool_is_par() {
        assert_eq!(spot_price(&reading(0)), 1.0);
        assert_eq!(spot_price(&reading(-5)), 1.0);
    }

    #[test]
    fn yield_space_combines_price_and_annualization() {
        let reading = reading(2_592_000);
        let expected = fixed_apr(spot_price(&reading), reading.seconds_remaining);
        assert_eq!(YieldSpace.fixed_apr(&reading), expected);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_apr(4.255), dec!(4.26));
        assert_eq!(round_apr(-0.005), dec!(-0.01));
        assert_eq!(round_apr(2.344), dec!(2.34));
    }

    #[test]
    fn rounded_apr_always_shows_two_digits() {
        assert_eq!(round_apr(3.1).to_string(), "3.10");
        assert_eq!(round_apr(5.0).to_string(), "5.00");
        assert_eq!(round_apr(4.255).to_string(), "4.26");
    }

    #[test]
    fn non_finite_apr_collapses_to_zero() {
        assert_eq!(round_apr(f64::NAN), dec!(0.00));
        assert_eq!(round_apr(f64::INFINITY), dec!(0.00));
    }
}

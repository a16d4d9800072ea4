#![deny(warnings)]

//! Unit-economics helpers for the SaaS credit model.
//!
//! This crate provides the pure formulas used by the monthly recurrence:
//! - Step-function team cost driven by user count thresholds
//! - Customer lifetime, lifetime value, payback period and runway
//! - Gross and net margins with their zero-revenue sentinels
//! - Emission rounding into whole-unit `Decimal` money and display formatting

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Sentinel for "never" (payback) and "unbounded" (runway).
pub const NEVER: f64 = 999.0;

/// Runway sentinel when the business is not burning cash.
pub const RUNWAY_UNBOUNDED: u64 = 999;

/// Net margin reported when there is no revenue.
pub const UNDEFINED_NET_MARGIN: f64 = -100.0;

/// Customer lifetime used when churn is zero.
pub const LIFETIME_CAP_MONTHS: f64 = 60.0;

/// Percentage to fraction.
#[inline]
pub fn pct(rate: f64) -> f64 {
    rate / 100.0
}

/// Monthly team cost as a step function of the user count.
///
/// Each full multiple of `trigger_users` adds `increase_pct` of the base.
/// Non-positive user counts and a non-positive trigger yield the base cost.
///
/// Example:
/// assert_eq!(team_cost(15_000.0, 1_000.0, 20.0, 999.0), 15_000.0);
/// assert_eq!(team_cost(15_000.0, 1_000.0, 20.0, 2_500.0), 21_000.0);
pub fn team_cost(base: f64, trigger_users: f64, increase_pct: f64, users: f64) -> f64 {
    if users <= 0.0 || trigger_users <= 0.0 {
        return base;
    }
    let steps = (users / trigger_users).floor();
    base * (1.0 + steps * pct(increase_pct))
}

/// Average retained lifetime in months, `1 / churn`, capped when churn is zero.
pub fn average_lifetime_months(churn_rate: f64) -> f64 {
    if churn_rate > 0.0 {
        1.0 / pct(churn_rate)
    } else {
        LIFETIME_CAP_MONTHS
    }
}

/// Lifetime value of one paying user; zero while nobody pays.
pub fn lifetime_value(
    paying_users: f64,
    monthly_purchase: f64,
    lifetime_months: f64,
    markup_pct: f64,
    fee_pct: f64,
) -> f64 {
    if paying_users > 0.0 {
        monthly_purchase * lifetime_months * (1.0 + pct(markup_pct)) * (1.0 + pct(fee_pct))
    } else {
        0.0
    }
}

/// `num / den`, or zero when the denominator is not positive.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Months needed to recover `cac` from each paying user's monthly net revenue.
pub fn payback_period(cac: f64, net_per_paying_user: f64) -> f64 {
    if net_per_paying_user > 0.0 {
        cac / net_per_paying_user
    } else {
        NEVER
    }
}

/// Gross margin (%) after AI provider costs; zero without revenue.
pub fn gross_margin(revenue: f64, ai_provider_cost: f64) -> f64 {
    if revenue > 0.0 {
        (revenue - ai_provider_cost) / revenue * 100.0
    } else {
        0.0
    }
}

/// Net margin (%); [`UNDEFINED_NET_MARGIN`] without revenue.
pub fn net_margin(revenue: f64, profit: f64) -> f64 {
    if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        UNDEFINED_NET_MARGIN
    }
}

/// Whole months of cash left at `burn` per month.
///
/// Returns [`RUNWAY_UNBOUNDED`] when not burning and zero once cash is gone.
pub fn runway_months(cash: f64, burn: f64) -> u64 {
    if burn > 0.0 {
        // float to int casts saturate
        (cash / burn).floor().max(0.0) as u64
    } else {
        RUNWAY_UNBOUNDED
    }
}

/// Round half up to a whole number, so `-2.5` becomes `-2`.
#[inline]
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Round to `dp` decimal places for display ratios.
pub fn round_dp(x: f64, dp: i32) -> f64 {
    let scale = 10f64.powi(dp);
    (x * scale).round() / scale
}

/// Whole-unit money from a running float figure.
///
/// Values outside the `Decimal` range saturate; NaN maps to zero.
pub fn money(x: f64) -> Decimal {
    let rounded = round_half_up(x);
    match Decimal::from_f64(rounded) {
        Some(d) => d.round(),
        None if rounded.is_nan() => Decimal::ZERO,
        None if rounded > 0.0 => Decimal::MAX,
        None => Decimal::MIN,
    }
}

/// Lossy conversion back to `f64` for ratio arithmetic.
pub fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Format whole-unit money for display: `$1.25M`, `$12.5K`, `$640`.
///
/// Thresholds are inclusive; negative amounts are printed as-is.
///
/// Example:
/// assert_eq!(format_currency(Decimal::new(1_250_000, 0)), "$1.25M");
pub fn format_currency(amount: Decimal) -> String {
    let million = Decimal::new(1_000_000, 0);
    let thousand = Decimal::new(1_000, 0);
    if amount >= million {
        let m = (amount / million).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("${:.2}M", m)
    } else if amount >= thousand {
        let k = (amount / thousand).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        format!("${:.1}K", k)
    } else {
        format!("${}", amount.normalize())
    }
}

/// Average of decimal amounts; zero for an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let total = values
        .iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v));
    total / Decimal::from(values.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn team_cost_steps_at_trigger_multiples() {
        assert_eq!(team_cost(15_000.0, 1_000.0, 20.0, 999.0), 15_000.0);
        assert_eq!(team_cost(15_000.0, 1_000.0, 20.0, 1_000.0), 18_000.0);
        assert_eq!(team_cost(15_000.0, 1_000.0, 20.0, 2_500.0), 21_000.0);
    }

    #[test]
    fn team_cost_guards_degenerate_inputs() {
        assert_eq!(team_cost(15_000.0, 1_000.0, 20.0, 0.0), 15_000.0);
        assert_eq!(team_cost(15_000.0, 1_000.0, 20.0, -50.0), 15_000.0);
        assert_eq!(team_cost(15_000.0, 0.0, 20.0, 5_000.0), 15_000.0);
    }

    #[test]
    fn zero_churn_caps_lifetime() {
        assert_eq!(average_lifetime_months(0.0), 60.0);
        assert!((average_lifetime_months(5.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn ltv_is_zero_without_paying_users() {
        assert_eq!(lifetime_value(0.0, 75.0, 20.0, 30.0, 5.0), 0.0);
        let ltv = lifetime_value(7.0, 75.0, 20.0, 30.0, 5.0);
        assert!((ltv - 2_047.5).abs() < 1e-9);
    }

    #[test]
    fn sentinels_for_zero_denominators() {
        assert_eq!(payback_period(100.0, 0.0), NEVER);
        assert_eq!(ratio_or_zero(10.0, 0.0), 0.0);
        assert_eq!(gross_margin(0.0, 10.0), 0.0);
        assert_eq!(net_margin(0.0, -10.0), UNDEFINED_NET_MARGIN);
        assert_eq!(runway_months(1_000.0, 0.0), RUNWAY_UNBOUNDED);
    }

    #[test]
    fn runway_floors_and_clamps() {
        assert_eq!(runway_months(10_500.0, 1_000.0), 10);
        assert_eq!(runway_months(-5_000.0, 1_000.0), 0);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(money(4_129.125), Decimal::new(4_129, 0));
        assert_eq!(money(-17_488.5), Decimal::new(-17_488, 0));
        assert_eq!(round_dp(2.345_678, 2), 2.35);
    }

    #[test]
    fn money_saturates_instead_of_panicking() {
        assert_eq!(money(f64::INFINITY), Decimal::MAX);
        assert_eq!(money(f64::NEG_INFINITY), Decimal::MIN);
        assert_eq!(money(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn currency_suffixes() {
        assert_eq!(format_currency(Decimal::new(1_250_000, 0)), "$1.25M");
        assert_eq!(format_currency(Decimal::new(1_000_000, 0)), "$1.00M");
        assert_eq!(format_currency(Decimal::new(12_540, 0)), "$12.5K");
        assert_eq!(format_currency(Decimal::new(1_000, 0)), "$1.0K");
        assert_eq!(format_currency(Decimal::new(640, 0)), "$640");
        assert_eq!(format_currency(Decimal::new(-5_000, 0)), "$-5000");
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), Decimal::ZERO);
        let v = [Decimal::new(10, 0), Decimal::new(20, 0), Decimal::new(40, 0)];
        assert_eq!(mean(&v).round_dp(4), Decimal::new(233_333, 4));
    }

    proptest! {
        #[test]
        fn team_cost_monotonic_in_users(u in 0.0f64..1_000_000.0, extra in 0.0f64..10_000.0) {
            let lo = team_cost(15_000.0, 1_000.0, 20.0, u);
            let hi = team_cost(15_000.0, 1_000.0, 20.0, u + extra);
            prop_assert!(hi >= lo);
            prop_assert!(lo >= 15_000.0);
        }

        #[test]
        fn runway_never_negative(cash in -1e9f64..1e9, burn in 0.0f64..1e7) {
            let r = runway_months(cash, burn);
            prop_assert!(burn > 0.0 || r == RUNWAY_UNBOUNDED);
        }

        #[test]
        fn money_is_whole(x in -1e12f64..1e12) {
            let m = money(x);
            prop_assert_eq!(m, m.trunc());
        }
    }
}

//! Roll monthly snapshots up into quarters and years.
//!
//! Flows are summed, point-in-time figures come from the period's last month,
//! and margins and burn are averaged over the period's months.

use rust_decimal::Decimal;
use saas_core::{
    CashPosition, CostBreakdown, DerivedMetrics, Period, RevenueBreakdown, Snapshot, UserCounts,
};
use saas_econ as econ;

/// Quarter length in months.
pub const QUARTER: usize = 3;
/// Year length in months.
pub const YEAR: usize = 12;

/// Aggregate `months` into consecutive periods of `period_len` months.
///
/// A trailing partial period is emitted from the months available.
/// `period_len == 0` yields nothing.
pub fn aggregate(months: &[Snapshot], period_len: usize) -> Vec<Snapshot> {
    if period_len == 0 {
        return Vec::new();
    }
    months
        .chunks(period_len)
        .filter_map(|chunk| roll_up(chunk, period_len))
        .collect()
}

/// Quarterly view, labelled `Y{year}Q{quarter}`.
pub fn quarterly(months: &[Snapshot]) -> Vec<Snapshot> {
    aggregate(months, QUARTER)
}

/// Yearly view, labelled `Year {year}`.
pub fn yearly(months: &[Snapshot]) -> Vec<Snapshot> {
    aggregate(months, YEAR)
}

fn period_label(first: &Period, period_len: usize) -> String {
    let offset = first.index % YEAR;
    match period_len {
        YEAR => format!("Year {}", first.year),
        QUARTER => format!("Y{}Q{}", first.year, offset / QUARTER + 1),
        n => format!("M{}-M{}", first.index + 1, first.index + n),
    }
}

fn sum_by(chunk: &[Snapshot], f: impl Fn(&Snapshot) -> Decimal) -> Decimal {
    chunk
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc.saturating_add(f(s)))
}

fn sum_users(chunk: &[Snapshot], f: impl Fn(&Snapshot) -> i64) -> i64 {
    chunk.iter().fold(0i64, |acc, s| acc.saturating_add(f(s)))
}

fn average(chunk: &[Snapshot], f: impl Fn(&Snapshot) -> f64) -> f64 {
    chunk.iter().map(f).sum::<f64>() / chunk.len() as f64
}

fn roll_up(chunk: &[Snapshot], period_len: usize) -> Option<Snapshot> {
    let first = chunk.first()?;
    let last = chunk.last()?;
    let burns: Vec<Decimal> = chunk.iter().map(|s| s.cash.burn).collect();

    Some(Snapshot {
        period: Period {
            index: first.period.index,
            year: first.period.year,
            month: 0,
            label: period_label(&first.period, period_len),
        },
        users: UserCounts {
            total: last.users.total,
            paying: last.users.paying,
            new: sum_users(chunk, |s| s.users.new),
            lost: sum_users(chunk, |s| s.users.lost),
        },
        revenue: RevenueBreakdown {
            initial_purchases: sum_by(chunk, |s| s.revenue.initial_purchases),
            recurring_purchases: sum_by(chunk, |s| s.revenue.recurring_purchases),
            total: sum_by(chunk, |s| s.revenue.total),
            mrr: last.revenue.mrr,
        },
        costs: CostBreakdown {
            ai_provider: sum_by(chunk, |s| s.costs.ai_provider),
            infrastructure: sum_by(chunk, |s| s.costs.infrastructure),
            team: sum_by(chunk, |s| s.costs.team),
            marketing: sum_by(chunk, |s| s.costs.marketing),
            user_acquisition: sum_by(chunk, |s| s.costs.user_acquisition),
            total: sum_by(chunk, |s| s.costs.total),
        },
        metrics: DerivedMetrics {
            gross_margin: average(chunk, |s| s.metrics.gross_margin),
            net_margin: average(chunk, |s| s.metrics.net_margin),
            cac: last.metrics.cac,
            ltv: last.metrics.ltv,
            ltv_cac_ratio: last.metrics.ltv_cac_ratio,
            payback_period: last.metrics.payback_period,
            runway_months: last.metrics.runway_months,
        },
        cash: CashPosition {
            burn: econ::mean(&burns),
            balance: last.cash.balance,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::month_period;

    fn month(index: usize, revenue: i64, burn: i64, users: i64, margin: f64) -> Snapshot {
        Snapshot {
            period: month_period(index),
            users: UserCounts {
                total: users,
                paying: users / 10,
                new: 10,
                lost: 1,
            },
            revenue: RevenueBreakdown {
                initial_purchases: Decimal::ZERO,
                recurring_purchases: Decimal::from(revenue),
                total: Decimal::from(revenue),
                mrr: Decimal::from(revenue),
            },
            costs: CostBreakdown {
                total: Decimal::from(revenue + burn),
                ..Default::default()
            },
            metrics: DerivedMetrics {
                gross_margin: margin,
                net_margin: -margin,
                runway_months: index as u64,
                ..Default::default()
            },
            cash: CashPosition {
                burn: Decimal::from(burn),
                balance: Decimal::from(1_000 - index as i64),
            },
        }
    }

    #[test]
    fn quarter_sums_flows_and_takes_last_point_in_time() {
        let months = vec![
            month(0, 100, 30, 10, 40.0),
            month(1, 200, 60, 20, 50.0),
            month(2, 300, 90, 30, 60.0),
        ];
        let q = quarterly(&months);
        assert_eq!(q.len(), 1);
        let q = &q[0];
        assert_eq!(q.period.label, "Y1Q1");
        assert_eq!(q.period.month, 0);
        assert_eq!(q.revenue.total, Decimal::from(600));
        assert_eq!(q.costs.total, Decimal::from(780));
        assert_eq!(q.users.total, 30);
        assert_eq!(q.users.paying, 3);
        assert_eq!(q.users.new, 30);
        assert_eq!(q.users.lost, 3);
        assert_eq!(q.revenue.mrr, Decimal::from(300));
        assert_eq!(q.cash.balance, Decimal::from(998));
        assert_eq!(q.metrics.runway_months, 2);
        assert_eq!(q.metrics.gross_margin, 50.0);
        assert_eq!(q.metrics.net_margin, -50.0);
        assert_eq!(q.cash.burn, Decimal::from(60));
    }

    #[test]
    fn trailing_partial_period_is_kept() {
        let months: Vec<_> = (0..14).map(|i| month(i, 100, 10, i as i64, 0.0)).collect();
        let q = quarterly(&months);
        assert_eq!(q.len(), 5);
        assert_eq!(q[4].period.label, "Y2Q1");
        assert_eq!(q[4].revenue.total, Decimal::from(200));
        assert_eq!(q[4].users.total, 13);

        let y = yearly(&months);
        assert_eq!(y.len(), 2);
        assert_eq!(y[0].period.label, "Year 1");
        assert_eq!(y[1].period.label, "Year 2");
        assert_eq!(y[1].revenue.total, Decimal::from(200));
    }

    #[test]
    fn burn_average_keeps_fraction() {
        let months = vec![month(0, 0, 10, 1, 0.0), month(1, 0, 15, 1, 0.0)];
        let p = aggregate(&months, 2);
        assert_eq!(p[0].cash.burn, Decimal::new(125, 1));
        assert_eq!(p[0].period.label, "M1-M2");
    }

    #[test]
    fn empty_inputs() {
        assert!(quarterly(&[]).is_empty());
        assert!(aggregate(&[month(0, 1, 1, 1, 0.0)], 0).is_empty());
    }
}

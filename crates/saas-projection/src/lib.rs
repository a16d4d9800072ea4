#![deny(warnings)]

//! Projection engine for the SaaS credit model.
//!
//! [`run_projection`] runs the monthly recurrence over a horizon, rolls the
//! months up into quarters and years, and collects run-level summary figures
//! (break-even, peak burn, investment needed) and sampled chart series.

pub mod aggregate;
pub mod engine;

use rust_decimal::Decimal;
use saas_core::{BusinessAssumptions, Snapshot};
use saas_econ as econ;
use serde::{Deserialize, Serialize};

pub use engine::{
    CarryState, InitialRevenueModel, MonthFigures, MonthOutcome, PeakBurn, ProjectionConfig,
};

/// Months between chart samples.
pub const CHART_SAMPLE_EVERY: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoint {
    pub label: String,
    pub users: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyPoint {
    pub label: String,
    pub value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginPoint {
    pub label: String,
    pub gross: f64,
    pub net: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayPoint {
    pub label: String,
    pub months: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioPoint {
    pub label: String,
    pub value: f64,
}

/// Time series sampled every [`CHART_SAMPLE_EVERY`] months, starting at month 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub user_growth: Vec<UserPoint>,
    pub revenue: Vec<MoneyPoint>,
    pub costs: Vec<MoneyPoint>,
    pub margins: Vec<MarginPoint>,
    pub runway: Vec<RunwayPoint>,
    pub ltv_cac: Vec<RatioPoint>,
}

impl ChartSeries {
    fn sample(months: &[MonthOutcome]) -> Self {
        let mut series = Self::default();
        for m in months.iter().step_by(CHART_SAMPLE_EVERY) {
            let label = &m.snapshot.period.label;
            let f = &m.figures;
            series.user_growth.push(UserPoint {
                label: label.clone(),
                users: m.snapshot.users.total,
            });
            series.revenue.push(MoneyPoint {
                label: label.clone(),
                value: econ::money(f.revenue),
            });
            series.costs.push(MoneyPoint {
                label: label.clone(),
                value: econ::money(f.costs),
            });
            series.margins.push(MarginPoint {
                label: label.clone(),
                gross: econ::round_dp(f.gross_margin, 1),
                net: econ::round_dp(f.net_margin, 1),
            });
            series.runway.push(RunwayPoint {
                label: label.clone(),
                months: f.runway_months,
            });
            series.ltv_cac.push(RatioPoint {
                label: label.clone(),
                value: econ::round_dp(f.ltv_cac_ratio, 2),
            });
        }
        series
    }
}

/// Complete output of one projection run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub initial_capital: Decimal,
    pub monthly_data: Vec<Snapshot>,
    pub quarterly_data: Vec<Snapshot>,
    pub yearly_data: Vec<Snapshot>,
    /// Chart series sit beside the snapshot vectors in JSON.
    #[serde(flatten)]
    pub series: ChartSeries,
    /// First month index with positive profit.
    pub break_even_month: Option<usize>,
    /// Break-even as `Year Y, Month M`.
    pub break_even_date: Option<String>,
    #[serde(rename = "peakBurnMonth")]
    pub peak_burn: PeakBurn,
    pub total_investment_needed: Decimal,
}

impl ProjectionResult {
    pub fn final_month(&self) -> Option<&Snapshot> {
        self.monthly_data.last()
    }

    /// Lowest cash balance reached, starting from the initial capital.
    pub fn min_cash_balance(&self) -> Decimal {
        self.monthly_data
            .iter()
            .map(|s| s.cash.balance)
            .fold(self.initial_capital, Decimal::min)
    }
}

/// Human form of a break-even month index.
pub fn break_even_date(month: usize) -> String {
    format!("Year {}, Month {}", month / 12 + 1, month % 12 + 1)
}

/// Capital needed to survive the run: the initial capital plus the depth of
/// the lowest negative balance.
pub fn total_investment_needed(initial_capital: Decimal, min_balance: Decimal) -> Decimal {
    if min_balance < Decimal::ZERO {
        initial_capital.saturating_add(min_balance.abs())
    } else {
        initial_capital
    }
}

/// Run the recurrence and aggregation for `cfg`.
pub fn project(a: &BusinessAssumptions, cfg: &ProjectionConfig) -> ProjectionResult {
    let run = engine::run(a, cfg);
    let series = ChartSeries::sample(&run.months);
    let monthly_data: Vec<Snapshot> = run.months.into_iter().map(|m| m.snapshot).collect();
    let quarterly_data = aggregate::quarterly(&monthly_data);
    let yearly_data = aggregate::yearly(&monthly_data);

    let mut result = ProjectionResult {
        initial_capital: cfg.initial_capital,
        monthly_data,
        quarterly_data,
        yearly_data,
        series,
        break_even_month: run.break_even_month,
        break_even_date: run.break_even_month.map(break_even_date),
        peak_burn: run.peak_burn,
        total_investment_needed: cfg.initial_capital,
    };
    result.total_investment_needed =
        total_investment_needed(cfg.initial_capital, result.min_cash_balance());
    result
}

/// Primary entry point: `horizon_years` of monthly projection.
pub fn run_projection(
    a: &BusinessAssumptions,
    initial_capital: Decimal,
    horizon_years: u32,
) -> ProjectionResult {
    project(a, &ProjectionConfig::for_years(initial_capital, horizon_years))
}

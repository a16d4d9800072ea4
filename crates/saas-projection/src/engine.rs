//! Monthly recurrence: advances users and cash one month at a time.
//!
//! The running state is a [`CarryState`] value threaded through [`step`];
//! nothing is kept between calls, so every run owns its own state.

use rust_decimal::Decimal;
use saas_core::{
    BusinessAssumptions, CashPosition, CostBreakdown, DerivedMetrics, Period, RevenueBreakdown,
    Snapshot, UserCounts,
};
use saas_econ as econ;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// How first purchases of new users turn into revenue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitialRevenueModel {
    /// `new * avg_initial_credit_purchase * conversion`; the executive model.
    #[default]
    ConversionScaled,
    /// `new * avg_initial_credit_purchase`; the planning form variant.
    Unscaled,
}

/// Run parameters besides the business assumptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionConfig {
    pub initial_capital: Decimal,
    pub horizon_months: u32,
    pub initial_revenue: InitialRevenueModel,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            initial_capital: Decimal::from(saas_core::DEFAULT_INITIAL_CAPITAL),
            horizon_months: saas_core::DEFAULT_HORIZON_YEARS * 12,
            initial_revenue: InitialRevenueModel::default(),
        }
    }
}

impl ProjectionConfig {
    /// Config for `years` of projection with the given starting capital.
    pub fn for_years(initial_capital: Decimal, years: u32) -> Self {
        Self {
            initial_capital,
            horizon_months: years.saturating_mul(12),
            ..Default::default()
        }
    }
}

/// Running state carried from one month to the next. Never rounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarryState {
    pub users: f64,
    pub cash: f64,
}

impl CarryState {
    pub fn initial(a: &BusinessAssumptions, cfg: &ProjectionConfig) -> Self {
        Self {
            users: a.initial_users,
            cash: econ::to_f64(cfg.initial_capital),
        }
    }
}

/// Unrounded figures of one month, kept for chart sampling and tracking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonthFigures {
    pub users: f64,
    pub revenue: f64,
    pub costs: f64,
    pub profit: f64,
    pub gross_margin: f64,
    pub net_margin: f64,
    pub ltv_cac_ratio: f64,
    pub runway_months: u64,
}

/// One emitted month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthOutcome {
    pub snapshot: Snapshot,
    pub figures: MonthFigures,
}

/// Label for month `index` counted from simulation start, e.g. `Y2M3`.
pub fn month_period(index: usize) -> Period {
    let year = (index / 12) as u32 + 1;
    let month = (index % 12) as u32 + 1;
    Period {
        index,
        year,
        month,
        label: format!("Y{year}M{month}"),
    }
}

/// Advance the simulation by month `index`.
///
/// Returns the month's snapshot and the carry state for the next month.
pub fn step(
    a: &BusinessAssumptions,
    cfg: &ProjectionConfig,
    index: usize,
    carry: CarryState,
) -> (MonthOutcome, CarryState) {
    let growth = 1.0 + econ::pct(a.monthly_growth_rate);
    let new_users = if index == 0 {
        carry.users
    } else {
        (carry.users * (growth - 1.0)).floor()
    };
    let churned = (carry.users * econ::pct(a.churn_rate)).floor();
    let users = carry.users + new_users - churned;
    let paying = (users * econ::pct(a.conversion_rate)).floor();

    let initial_purchases = match cfg.initial_revenue {
        InitialRevenueModel::ConversionScaled => {
            new_users * a.avg_initial_credit_purchase * econ::pct(a.conversion_rate)
        }
        InitialRevenueModel::Unscaled => new_users * a.avg_initial_credit_purchase,
    };
    let recurring = paying * a.avg_monthly_credit_purchase;
    let base_revenue = initial_purchases + recurring;
    let revenue = a.priced(base_revenue);

    // AI providers bill on credit value, not on what users pay us.
    let ai_provider = base_revenue * econ::pct(a.ai_provider_cost_percentage);
    let infrastructure = a.infrastructure_costs_base + users * a.infrastructure_costs_per_user;
    let team = econ::team_cost(
        a.team_costs_base,
        a.team_growth_trigger_users,
        a.team_cost_increase_percentage,
        users,
    );
    let marketing =
        a.marketing_budget_base + revenue * econ::pct(a.marketing_budget_percentage_of_revenue);
    let acquisition = new_users * a.user_acquisition_cost;
    let costs = ai_provider + infrastructure + team + marketing + acquisition;

    let profit = revenue - costs;
    let cash = carry.cash + profit;

    let gross_margin = econ::gross_margin(revenue, ai_provider);
    let net_margin = econ::net_margin(revenue, profit);
    let lifetime = econ::average_lifetime_months(a.churn_rate);
    let ltv = econ::lifetime_value(
        paying,
        a.avg_monthly_credit_purchase,
        lifetime,
        a.markup_on_ai_costs,
        a.service_fee,
    );
    let cac = a.user_acquisition_cost;
    let ltv_cac_ratio = econ::ratio_or_zero(ltv, cac);
    let net_per_paying = if paying > 0.0 {
        (revenue - ai_provider) / paying
    } else {
        0.0
    };
    let payback = econ::payback_period(cac, net_per_paying);
    let burn = if profit < 0.0 { -profit } else { 0.0 };
    let runway = econ::runway_months(cash, burn);

    trace!(index, users, revenue, costs, profit, cash, "month stepped");

    let snapshot = Snapshot {
        period: month_period(index),
        users: UserCounts {
            total: users as i64,
            paying: paying as i64,
            new: new_users as i64,
            lost: churned as i64,
        },
        revenue: RevenueBreakdown {
            initial_purchases: econ::money(initial_purchases),
            recurring_purchases: econ::money(recurring),
            total: econ::money(revenue),
            mrr: econ::money(a.priced(recurring)),
        },
        costs: CostBreakdown {
            ai_provider: econ::money(ai_provider),
            infrastructure: econ::money(infrastructure),
            team: econ::money(team),
            marketing: econ::money(marketing),
            user_acquisition: econ::money(acquisition),
            total: econ::money(costs),
        },
        metrics: DerivedMetrics {
            gross_margin: econ::round_half_up(gross_margin),
            net_margin: econ::round_half_up(net_margin),
            cac,
            ltv: econ::money(ltv),
            ltv_cac_ratio: econ::round_dp(ltv_cac_ratio, 2),
            payback_period: econ::round_dp(payback, 1),
            runway_months: runway,
        },
        cash: CashPosition {
            burn: econ::money(burn),
            balance: econ::money(cash),
        },
    };
    let figures = MonthFigures {
        users,
        revenue,
        costs,
        profit,
        gross_margin,
        net_margin,
        ltv_cac_ratio,
        runway_months: runway,
    };
    (
        MonthOutcome { snapshot, figures },
        CarryState { users, cash },
    )
}

/// Largest single-month loss seen in a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakBurn {
    pub month: usize,
    pub amount: Decimal,
}

/// Raw output of [`run`]: emitted months plus run-level tracking.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionRun {
    pub months: Vec<MonthOutcome>,
    pub break_even_month: Option<usize>,
    pub peak_burn: PeakBurn,
    pub final_state: CarryState,
}

/// Run the recurrence over `cfg.horizon_months` months.
pub fn run(a: &BusinessAssumptions, cfg: &ProjectionConfig) -> ProjectionRun {
    let horizon = cfg.horizon_months as usize;
    debug!(horizon, capital = %cfg.initial_capital, model = ?cfg.initial_revenue, "projection started");

    let mut months = Vec::with_capacity(horizon);
    let mut break_even_month = None;
    let mut peak_loss = (0usize, 0.0f64);
    let mut carry = CarryState::initial(a, cfg);

    for index in 0..horizon {
        let (outcome, next) = step(a, cfg, index, carry);
        let profit = outcome.figures.profit;
        if break_even_month.is_none() && profit > 0.0 {
            break_even_month = Some(index);
        }
        if profit < 0.0 && -profit > peak_loss.1 {
            peak_loss = (index, -profit);
        }
        months.push(outcome);
        carry = next;
    }

    debug!(months = months.len(), ?break_even_month, cash = carry.cash, "projection finished");
    ProjectionRun {
        months,
        break_even_month,
        peak_burn: PeakBurn {
            month: peak_loss.0,
            amount: econ::money(peak_loss.1),
        },
        final_state: carry,
    }
}

#![deny(warnings)]

//! Core domain models for the SaaS credit model.
//!
//! This crate defines the serializable input assumptions and the snapshot
//! shape shared by the projection engine, the aggregator and the reporting
//! layers, plus optional validation helpers for callers that need basic
//! guarantees before running a projection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default starting capital in currency units.
pub const DEFAULT_INITIAL_CAPITAL: i64 = 500_000;

/// Default projection horizon in years.
pub const DEFAULT_HORIZON_YEARS: u32 = 5;

/// Business assumptions driving one projection run.
///
/// Rates are plain percentages, so `30.0` means 30%.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAssumptions {
    /// Total addressable market, in users.
    pub total_addressable_market: f64,
    /// Share of the addressable market to capture (%).
    pub market_share_goal: f64,
    /// Years allotted to reach the market share goal.
    pub time_to_reach_goal_years: f64,

    /// Users at simulation start.
    pub initial_users: f64,
    /// Month-over-month user growth (%).
    pub monthly_growth_rate: f64,
    /// Cost to acquire one user (CAC).
    pub user_acquisition_cost: f64,
    /// Monthly churn (%).
    pub churn_rate: f64,

    /// First credit purchase per new user.
    pub avg_initial_credit_purchase: f64,
    /// Recurring monthly credit purchase per paying user.
    pub avg_monthly_credit_purchase: f64,
    /// Free to paid conversion (%).
    pub conversion_rate: f64,
    /// Markup on AI provider costs (%).
    #[serde(rename = "markupOnAICosts", alias = "markupOnAiCosts")]
    pub markup_on_ai_costs: f64,
    /// Service fee on top of the markup (%).
    pub service_fee: f64,

    /// Share of base credit value paid to AI providers (%).
    pub ai_provider_cost_percentage: f64,
    /// Fixed monthly infrastructure cost.
    pub infrastructure_costs_base: f64,
    /// Additional monthly infrastructure cost per user.
    pub infrastructure_costs_per_user: f64,
    /// Monthly team cost before any headcount step.
    pub team_costs_base: f64,
    /// User count that triggers each team cost step.
    pub team_growth_trigger_users: f64,
    /// Team cost increase per step (%).
    pub team_cost_increase_percentage: f64,
    /// Fixed monthly marketing budget.
    pub marketing_budget_base: f64,
    /// Additional marketing as a share of adjusted revenue (%).
    pub marketing_budget_percentage_of_revenue: f64,
}

impl Default for BusinessAssumptions {
    /// Reference assumptions for a credit-based AI aggregator targeting
    /// freelancers and small agencies.
    fn default() -> Self {
        Self {
            total_addressable_market: 500_000.0,
            market_share_goal: 5.0,
            time_to_reach_goal_years: 5.0,
            initial_users: 50.0,
            monthly_growth_rate: 30.0,
            user_acquisition_cost: 100.0,
            churn_rate: 5.0,
            avg_initial_credit_purchase: 50.0,
            avg_monthly_credit_purchase: 75.0,
            conversion_rate: 15.0,
            markup_on_ai_costs: 30.0,
            service_fee: 5.0,
            ai_provider_cost_percentage: 70.0,
            infrastructure_costs_base: 1_000.0,
            infrastructure_costs_per_user: 0.25,
            team_costs_base: 15_000.0,
            team_growth_trigger_users: 1_000.0,
            team_cost_increase_percentage: 20.0,
            marketing_budget_base: 3_500.0,
            marketing_budget_percentage_of_revenue: 10.0,
        }
    }
}

impl BusinessAssumptions {
    /// Apply markup, then the service fee, to a base credit amount.
    pub fn priced(&self, base: f64) -> f64 {
        base * (1.0 + self.markup_on_ai_costs / 100.0) * (1.0 + self.service_fee / 100.0)
    }

    /// Named view over every field, in declaration order.
    pub fn fields(&self) -> [(&'static str, f64); 20] {
        [
            ("totalAddressableMarket", self.total_addressable_market),
            ("marketShareGoal", self.market_share_goal),
            ("timeToReachGoalYears", self.time_to_reach_goal_years),
            ("initialUsers", self.initial_users),
            ("monthlyGrowthRate", self.monthly_growth_rate),
            ("userAcquisitionCost", self.user_acquisition_cost),
            ("churnRate", self.churn_rate),
            ("avgInitialCreditPurchase", self.avg_initial_credit_purchase),
            ("avgMonthlyCreditPurchase", self.avg_monthly_credit_purchase),
            ("conversionRate", self.conversion_rate),
            ("markupOnAICosts", self.markup_on_ai_costs),
            ("serviceFee", self.service_fee),
            ("aiProviderCostPercentage", self.ai_provider_cost_percentage),
            ("infrastructureCostsBase", self.infrastructure_costs_base),
            ("infrastructureCostsPerUser", self.infrastructure_costs_per_user),
            ("teamCostsBase", self.team_costs_base),
            ("teamGrowthTriggerUsers", self.team_growth_trigger_users),
            ("teamCostIncreasePercentage", self.team_cost_increase_percentage),
            ("marketingBudgetBase", self.marketing_budget_base),
            (
                "marketingBudgetPercentageOfRevenue",
                self.marketing_budget_percentage_of_revenue,
            ),
        ]
    }
}

/// Partial set of assumption fields merged over a base.
///
/// Unset fields keep the base value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AssumptionOverrides {
    pub total_addressable_market: Option<f64>,
    pub market_share_goal: Option<f64>,
    pub time_to_reach_goal_years: Option<f64>,
    pub initial_users: Option<f64>,
    pub monthly_growth_rate: Option<f64>,
    pub user_acquisition_cost: Option<f64>,
    pub churn_rate: Option<f64>,
    pub avg_initial_credit_purchase: Option<f64>,
    pub avg_monthly_credit_purchase: Option<f64>,
    pub conversion_rate: Option<f64>,
    #[serde(rename = "markupOnAICosts", alias = "markupOnAiCosts")]
    pub markup_on_ai_costs: Option<f64>,
    pub service_fee: Option<f64>,
    pub ai_provider_cost_percentage: Option<f64>,
    pub infrastructure_costs_base: Option<f64>,
    pub infrastructure_costs_per_user: Option<f64>,
    pub team_costs_base: Option<f64>,
    pub team_growth_trigger_users: Option<f64>,
    pub team_cost_increase_percentage: Option<f64>,
    pub marketing_budget_base: Option<f64>,
    pub marketing_budget_percentage_of_revenue: Option<f64>,
}

impl AssumptionOverrides {
    /// Returns a copy of `base` with every set field replaced.
    pub fn apply(&self, base: &BusinessAssumptions) -> BusinessAssumptions {
        let pick = |o: Option<f64>, b: f64| o.unwrap_or(b);
        BusinessAssumptions {
            total_addressable_market: pick(
                self.total_addressable_market,
                base.total_addressable_market,
            ),
            market_share_goal: pick(self.market_share_goal, base.market_share_goal),
            time_to_reach_goal_years: pick(
                self.time_to_reach_goal_years,
                base.time_to_reach_goal_years,
            ),
            initial_users: pick(self.initial_users, base.initial_users),
            monthly_growth_rate: pick(self.monthly_growth_rate, base.monthly_growth_rate),
            user_acquisition_cost: pick(self.user_acquisition_cost, base.user_acquisition_cost),
            churn_rate: pick(self.churn_rate, base.churn_rate),
            avg_initial_credit_purchase: pick(
                self.avg_initial_credit_purchase,
                base.avg_initial_credit_purchase,
            ),
            avg_monthly_credit_purchase: pick(
                self.avg_monthly_credit_purchase,
                base.avg_monthly_credit_purchase,
            ),
            conversion_rate: pick(self.conversion_rate, base.conversion_rate),
            markup_on_ai_costs: pick(self.markup_on_ai_costs, base.markup_on_ai_costs),
            service_fee: pick(self.service_fee, base.service_fee),
            ai_provider_cost_percentage: pick(
                self.ai_provider_cost_percentage,
                base.ai_provider_cost_percentage,
            ),
            infrastructure_costs_base: pick(
                self.infrastructure_costs_base,
                base.infrastructure_costs_base,
            ),
            infrastructure_costs_per_user: pick(
                self.infrastructure_costs_per_user,
                base.infrastructure_costs_per_user,
            ),
            team_costs_base: pick(self.team_costs_base, base.team_costs_base),
            team_growth_trigger_users: pick(
                self.team_growth_trigger_users,
                base.team_growth_trigger_users,
            ),
            team_cost_increase_percentage: pick(
                self.team_cost_increase_percentage,
                base.team_cost_increase_percentage,
            ),
            marketing_budget_base: pick(self.marketing_budget_base, base.marketing_budget_base),
            marketing_budget_percentage_of_revenue: pick(
                self.marketing_budget_percentage_of_revenue,
                base.marketing_budget_percentage_of_revenue,
            ),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Position of a snapshot on the projection timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// Month index from simulation start of the first month covered.
    pub index: usize,
    /// 1-based projection year.
    pub year: u32,
    /// 1-based month within the year; 0 for quarters and years.
    pub month: u32,
    /// Human label, e.g. `Y1M3`, `Y2Q1`, `Year 3`.
    pub label: String,
}

/// User counts for a period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    /// Users at the end of the period.
    pub total: i64,
    /// Paying users at the end of the period.
    pub paying: i64,
    /// Users gained during the period.
    pub new: i64,
    /// Users churned during the period.
    pub lost: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBreakdown {
    pub initial_purchases: Decimal,
    pub recurring_purchases: Decimal,
    /// Revenue after markup and service fee.
    pub total: Decimal,
    /// Monthly recurring revenue after markup and service fee.
    pub mrr: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub ai_provider: Decimal,
    pub infrastructure: Decimal,
    pub team: Decimal,
    pub marketing: Decimal,
    pub user_acquisition: Decimal,
    pub total: Decimal,
}

/// Unit economics and health ratios.
///
/// Sentinels: `payback_period` and `runway_months` are 999 when unbounded,
/// `net_margin` is -100 without revenue, ratios are 0 with a zero denominator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Gross margin (%).
    pub gross_margin: f64,
    /// Net margin (%).
    pub net_margin: f64,
    pub cac: f64,
    pub ltv: Decimal,
    pub ltv_cac_ratio: f64,
    /// Months to recover CAC.
    pub payback_period: f64,
    /// Months of cash left at the current burn.
    pub runway_months: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashPosition {
    /// Monthly loss; zero when profitable.
    pub burn: Decimal,
    pub balance: Decimal,
}

/// Financial state for one month, or one quarter/year once aggregated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub period: Period,
    pub users: UserCounts,
    pub revenue: RevenueBreakdown,
    pub costs: CostBreakdown,
    pub metrics: DerivedMetrics,
    pub cash: CashPosition,
}

impl Snapshot {
    /// Revenue minus costs as emitted.
    pub fn profit(&self) -> Decimal {
        self.revenue.total - self.costs.total
    }
}

/// Validation errors for business assumptions.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("field {0} is not a finite number")]
    NonFinite(&'static str),
    /// Counts, money and rates must be non-negative.
    #[error("field {0} must not be negative")]
    Negative(&'static str),
    /// Rate must lie within [0, 100].
    #[error("field {field} is a percentage but was {value}")]
    RateOutOfRange { field: &'static str, value: f64 },
    /// Team growth trigger must be strictly positive.
    #[error("team growth trigger must be > 0")]
    NonPositiveTrigger,
}

const BOUNDED_RATES: [&str; 4] = [
    "marketShareGoal",
    "churnRate",
    "conversionRate",
    "aiProviderCostPercentage",
];

/// Validate assumptions before a run.
///
/// The projection engine accepts anything; this is for callers that want
/// out-of-domain inputs rejected up front.
pub fn validate_assumptions(a: &BusinessAssumptions) -> Result<(), ValidationError> {
    for (name, value) in a.fields() {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite(name));
        }
        if value < 0.0 {
            return Err(ValidationError::Negative(name));
        }
        if BOUNDED_RATES.contains(&name) && value > 100.0 {
            return Err(ValidationError::RateOutOfRange { field: name, value });
        }
    }
    if a.team_growth_trigger_users <= 0.0 {
        return Err(ValidationError::NonPositiveTrigger);
    }
    Ok(())
}

//! What-if comparison: the base assumptions plus named override sets, each
//! projected and summarized independently, then lined up metric by metric.

use rust_decimal::Decimal;
use saas_core::{AssumptionOverrides, BusinessAssumptions};
use saas_projection::{run_projection, ProjectionResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::summary::{self, ExecutiveSummary};
use crate::InsightError;

pub const BASE_SLUG: &str = "base";
pub const BASE_NAME: &str = "Base Case";
pub const BASE_DESCRIPTION: &str = "Expected business trajectory with current assumptions";

/// Key metrics lined up across scenarios, in display order.
pub const COMPARED_METRICS: [&str; 7] = [
    summary::TOTAL_USERS,
    summary::FINAL_YEAR_REVENUE,
    summary::FINAL_ARR,
    summary::BREAK_EVEN_MONTH,
    summary::LTV_CAC_RATIO,
    summary::NET_MARGIN,
    summary::TOTAL_INVESTMENT,
];

/// A named set of overrides over the base assumptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScenarioVariant {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "metricChanges")]
    pub overrides: AssumptionOverrides,
}

impl ScenarioVariant {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            overrides: AssumptionOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: AssumptionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Key used for this variant in a [`ScenarioSet`].
    pub fn slug(&self) -> String {
        slug(&self.name)
    }

    /// The stock what-if variants.
    pub fn presets() -> Vec<ScenarioVariant> {
        vec![
            Self::new(
                "Conservative Growth",
                "Lower growth rate and higher acquisition costs",
            )
            .with_overrides(AssumptionOverrides {
                monthly_growth_rate: Some(15.0),
                user_acquisition_cost: Some(150.0),
                churn_rate: Some(7.0),
                ..Default::default()
            }),
            Self::new(
                "Aggressive Growth",
                "Higher growth rate with increased marketing spend",
            )
            .with_overrides(AssumptionOverrides {
                monthly_growth_rate: Some(40.0),
                marketing_budget_base: Some(7_000.0),
                marketing_budget_percentage_of_revenue: Some(15.0),
                user_acquisition_cost: Some(130.0),
                ..Default::default()
            }),
            Self::new(
                "Higher Monetization",
                "Higher average purchase amounts with improved conversion",
            )
            .with_overrides(AssumptionOverrides {
                avg_initial_credit_purchase: Some(75.0),
                avg_monthly_credit_purchase: Some(100.0),
                conversion_rate: Some(20.0),
                ..Default::default()
            }),
            Self::new(
                "Market Pressure",
                "Competitive pressure requiring lower margins",
            )
            .with_overrides(AssumptionOverrides {
                markup_on_ai_costs: Some(20.0),
                service_fee: Some(3.0),
                user_acquisition_cost: Some(120.0),
                ..Default::default()
            }),
        ]
    }
}

/// Lowercased name with each whitespace run replaced by `_`.
///
/// Example: `"Aggressive  Growth"` becomes `aggressive_growth`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.extend(c.to_lowercase());
            in_space = false;
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub assumptions: BusinessAssumptions,
    pub projection: ProjectionResult,
    pub summary: ExecutiveSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioValue {
    pub scenario: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub metric: String,
    pub values: Vec<ScenarioValue>,
}

impl ComparisonRow {
    pub fn value(&self, scenario: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.scenario == scenario)
            .and_then(|v| v.value.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSet {
    /// Base case first, then variants in input order.
    pub scenarios: Vec<ScenarioOutcome>,
    pub comparison: Vec<ComparisonRow>,
}

impl ScenarioSet {
    pub fn scenario(&self, slug: &str) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|s| s.slug == slug)
    }

    pub fn row(&self, metric: &str) -> Option<&ComparisonRow> {
        self.comparison.iter().find(|r| r.metric == metric)
    }
}

/// Insert keeping first-seen position; a repeated key replaces the value.
fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T, &T) -> bool) {
    match items.iter().position(|x| same(x, &item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

fn outcome(
    slug: String,
    name: &str,
    description: &str,
    assumptions: BusinessAssumptions,
    initial_capital: Decimal,
    horizon_years: u32,
) -> Result<ScenarioOutcome, InsightError> {
    let projection = run_projection(&assumptions, initial_capital, horizon_years);
    let summary = summary::summarize(&projection)?;
    debug!(
        slug = %slug,
        break_even = ?projection.break_even_month,
        "scenario projected"
    );
    Ok(ScenarioOutcome {
        slug,
        name: name.to_string(),
        description: description.to_string(),
        assumptions,
        projection,
        summary,
    })
}

fn comparison(scenarios: &[ScenarioOutcome]) -> Vec<ComparisonRow> {
    COMPARED_METRICS
        .iter()
        .map(|&metric| {
            let mut values = Vec::with_capacity(scenarios.len());
            for s in scenarios {
                upsert(
                    &mut values,
                    ScenarioValue {
                        scenario: s.name.clone(),
                        value: s.summary.metric(metric).map(str::to_string),
                    },
                    |a, b| a.scenario == b.scenario,
                );
            }
            ComparisonRow {
                metric: metric.to_string(),
                values,
            }
        })
        .collect()
}

/// Project the base case and every variant, then compare their summaries.
///
/// Variants whose slugs collide replace the earlier scenario in place.
pub fn compare(
    base: &BusinessAssumptions,
    variants: &[ScenarioVariant],
    initial_capital: Decimal,
    horizon_years: u32,
) -> Result<ScenarioSet, InsightError> {
    info!(variants = variants.len(), horizon_years, "comparing scenarios");
    let mut scenarios = Vec::with_capacity(variants.len() + 1);
    scenarios.push(outcome(
        BASE_SLUG.to_string(),
        BASE_NAME,
        BASE_DESCRIPTION,
        base.clone(),
        initial_capital,
        horizon_years,
    )?);

    for v in variants {
        let merged = v.overrides.apply(base);
        let o = outcome(
            v.slug(),
            &v.name,
            &v.description,
            merged,
            initial_capital,
            horizon_years,
        )?;
        upsert(&mut scenarios, o, |a, b| a.slug == b.slug);
    }

    let comparison = comparison(&scenarios);
    Ok(ScenarioSet {
        scenarios,
        comparison,
    })
}

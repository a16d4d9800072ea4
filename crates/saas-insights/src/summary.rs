//! Executive summary: headline metrics, recommendations, risks and milestones.

use rust_decimal::Decimal;
use saas_core::Snapshot;
use saas_econ as econ;
use saas_projection::ProjectionResult;
use serde::{Deserialize, Serialize};

use crate::InsightError;

pub const TOTAL_USERS: &str = "Total Users (End of Projection)";
pub const PAYING_USERS: &str = "Paying Users (End of Projection)";
pub const FIRST_YEAR_REVENUE: &str = "First Year Revenue";
pub const FINAL_YEAR_REVENUE: &str = "Final Year Revenue";
pub const FINAL_MRR: &str = "Monthly Recurring Revenue (Final)";
pub const FINAL_ARR: &str = "Annual Recurring Revenue (Final)";
pub const TOTAL_INVESTMENT: &str = "Total Investment Required";
pub const BREAK_EVEN_MONTH: &str = "Break Even Month";
pub const LTV_CAC_RATIO: &str = "LTV/CAC Ratio (Final)";
pub const GROSS_MARGIN: &str = "Gross Margin (Final)";
pub const NET_MARGIN: &str = "Net Margin (Final)";
pub const RULE_OF_40: &str = "Rule of 40 Score (Final)";
pub const CAPITAL_EFFICIENCY: &str = "Capital Efficiency";

const STRATEGIC_RECOMMENDATIONS: [&str; 3] = [
    "Continually optimize AI model pricing to maximize value for users while maintaining healthy margins",
    "Consider strategic partnerships with AI providers to reduce cost structure",
    "Develop tiered service levels to appeal to different customer segments",
];

pub const RISKS: [&str; 6] = [
    "AI provider pricing changes could impact margins significantly",
    "Emerging competitors could increase CAC and reduce growth rate",
    "Changes in AI regulations could require compliance investments",
    "Higher than projected churn would significantly impact unit economics",
    "Slower growth than projected would extend cash runway requirements",
    "Technical scaling challenges may require additional infrastructure investment",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetric {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Month index from simulation start.
    pub month: usize,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub key_metrics: Vec<KeyMetric>,
    pub recommendations: Vec<String>,
    pub risks: Vec<String>,
    pub milestones: Vec<Milestone>,
}

impl ExecutiveSummary {
    /// Formatted value of a key metric by label.
    pub fn metric(&self, label: &str) -> Option<&str> {
        self.key_metrics
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.value.as_str())
    }
}

/// Month-over-month user growth (%) between the last two months.
fn last_month_user_growth(monthly: &[Snapshot]) -> f64 {
    match monthly {
        [.., prev, last] if prev.users.total != 0 => {
            (last.users.total - prev.users.total) as f64 / prev.users.total as f64 * 100.0
        }
        _ => 0.0,
    }
}

/// Rule of 40: final net margin plus the latest user growth rate.
pub fn rule_of_40(monthly: &[Snapshot]) -> f64 {
    let Some(last) = monthly.last() else {
        return 0.0;
    };
    let growth = if last.revenue.mrr > Decimal::ZERO {
        last_month_user_growth(monthly)
    } else {
        0.0
    };
    last.metrics.net_margin + growth
}

/// Total investment per unit of final ARR; zero without recurring revenue.
pub fn capital_efficiency(total_investment: Decimal, arr: Decimal) -> f64 {
    if arr > Decimal::ZERO {
        econ::to_f64(total_investment / arr)
    } else {
        0.0
    }
}

fn first_month(monthly: &[Snapshot], pred: impl Fn(&Snapshot) -> bool) -> Option<usize> {
    monthly.iter().position(pred)
}

/// First crossing of each milestone, in chronological order.
pub fn milestones(p: &ProjectionResult) -> Vec<Milestone> {
    let m = &p.monthly_data;
    let ten_k = Decimal::from(10_000);
    let hundred_k = Decimal::from(100_000);
    let crossings = [
        (first_month(m, |s| s.users.total >= 100), "Reach 100 total users"),
        (first_month(m, |s| s.users.total >= 1_000), "Reach 1,000 total users"),
        (first_month(m, |s| s.revenue.mrr >= ten_k), "Achieve $10K MRR"),
        (first_month(m, |s| s.revenue.mrr >= hundred_k), "Achieve $100K MRR"),
        (p.break_even_month, "Reach break-even (positive cash flow)"),
        (first_month(m, |s| s.metrics.ltv_cac_ratio >= 3.0), "Achieve 3:1 LTV:CAC ratio"),
    ];
    let mut found: Vec<Milestone> = crossings
        .into_iter()
        .filter_map(|(month, description)| {
            month.map(|month| Milestone {
                month,
                description: description.to_string(),
            })
        })
        .collect();
    // conditions complete out of declaration order
    found.sort_by_key(|m| m.month);
    found
}

fn recommendations(last: &Snapshot, negative_months: usize, efficiency: f64) -> Vec<String> {
    let metrics = &last.metrics;
    let rules = [
        (
            metrics.ltv_cac_ratio < 3.0,
            "Improve LTV/CAC ratio by reducing acquisition costs or increasing customer lifetime value",
        ),
        (
            metrics.payback_period > 12.0,
            "Reduce customer payback period through improved monetization or reduced acquisition costs",
        ),
        (
            metrics.gross_margin < 50.0,
            "Increase gross margins by negotiating better terms with AI providers or adjusting pricing model",
        ),
        (
            negative_months > 24,
            "Extend fundraising runway to accommodate longer path to profitability",
        ),
        (
            last.users.total < 1_000,
            "Accelerate user growth strategies to achieve scale faster",
        ),
        (
            metrics.net_margin < 10.0,
            "Focus on operational efficiency to improve net margins",
        ),
        (
            efficiency > 1.5,
            "Improve capital efficiency by finding ways to generate more revenue with less investment",
        ),
    ];
    rules
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, text)| text)
        .chain(STRATEGIC_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

/// Summarize a completed projection.
pub fn summarize(p: &ProjectionResult) -> Result<ExecutiveSummary, InsightError> {
    let last = p.monthly_data.last().ok_or(InsightError::EmptyProjection)?;
    let (first_year, final_year) = match (p.yearly_data.first(), p.yearly_data.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(InsightError::EmptyProjection),
    };

    let mrr = last.revenue.mrr;
    let arr = mrr.saturating_mul(Decimal::from(12));
    let negative_months = p
        .monthly_data
        .iter()
        .filter(|s| s.metrics.net_margin < 0.0)
        .count();
    let efficiency = capital_efficiency(p.total_investment_needed, arr);
    let break_even = match p.break_even_month {
        Some(k) => format!("Month {}", k + 1),
        None => "Beyond projection period".to_string(),
    };

    let key_metrics = [
        (TOTAL_USERS, last.users.total.to_string()),
        (PAYING_USERS, last.users.paying.to_string()),
        (FIRST_YEAR_REVENUE, econ::format_currency(first_year.revenue.total)),
        (FINAL_YEAR_REVENUE, econ::format_currency(final_year.revenue.total)),
        (FINAL_MRR, econ::format_currency(mrr)),
        (FINAL_ARR, econ::format_currency(arr)),
        (TOTAL_INVESTMENT, econ::format_currency(p.total_investment_needed)),
        (BREAK_EVEN_MONTH, break_even),
        (LTV_CAC_RATIO, format!("{:.2}", last.metrics.ltv_cac_ratio)),
        (GROSS_MARGIN, format!("{}%", econ::round_half_up(last.metrics.gross_margin) as i64)),
        (NET_MARGIN, format!("{}%", econ::round_half_up(last.metrics.net_margin) as i64)),
        (RULE_OF_40, format!("{:.1}", rule_of_40(&p.monthly_data))),
        (CAPITAL_EFFICIENCY, format!("{:.2}", efficiency)),
    ]
    .into_iter()
    .map(|(label, value)| KeyMetric {
        label: label.to_string(),
        value,
    })
    .collect();

    Ok(ExecutiveSummary {
        key_metrics,
        recommendations: recommendations(last, negative_months, efficiency),
        risks: RISKS.iter().map(|r| r.to_string()).collect(),
        milestones: milestones(p),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saas_core::BusinessAssumptions;
    use saas_projection::run_projection;

    fn capital() -> Decimal {
        Decimal::from(500_000)
    }

    #[test]
    fn default_summary_key_metrics() {
        let p = run_projection(&BusinessAssumptions::default(), capital(), 5);
        let s = summarize(&p).unwrap();
        assert_eq!(s.key_metrics.len(), 13);
        assert_eq!(s.key_metrics[0].label, TOTAL_USERS);
        assert_eq!(s.metric(TOTAL_USERS), Some("51226174"));
        assert_eq!(s.metric(PAYING_USERS), Some("7683926"));
        assert_eq!(s.metric(FIRST_YEAR_REVENUE), Some("$94.3K"));
        assert_eq!(s.metric(BREAK_EVEN_MONTH), Some("Beyond projection period"));
        assert_eq!(s.metric(LTV_CAC_RATIO), Some("20.48"));
        assert_eq!(s.metric(GROSS_MARGIN), Some("49%"));
        assert_eq!(s.metric(NET_MARGIN), Some("-114%"));
        assert_eq!(s.metric(RULE_OF_40), Some("-89.0"));
        assert_eq!(s.metric(CAPITAL_EFFICIENCY), Some("0.55"));
        assert_eq!(s.risks.len(), 6);
    }

    #[test]
    fn recommendations_follow_thresholds_then_strategy() {
        let p = run_projection(&BusinessAssumptions::default(), capital(), 5);
        let s = summarize(&p).unwrap();
        // gross margin 49%, 60 loss-making months, net margin -114%
        assert_eq!(s.recommendations.len(), 6);
        assert!(s.recommendations[0].starts_with("Increase gross margins"));
        assert!(s.recommendations[1].starts_with("Extend fundraising runway"));
        assert!(s.recommendations[2].starts_with("Focus on operational efficiency"));
        assert_eq!(s.recommendations[3..], STRATEGIC_RECOMMENDATIONS);
    }

    #[test]
    fn milestones_are_chronological() {
        let a = BusinessAssumptions {
            user_acquisition_cost: 10.0,
            ..Default::default()
        };
        let p = run_projection(&a, capital(), 5);
        let s = summarize(&p).unwrap();
        let months: Vec<usize> = s.milestones.iter().map(|m| m.month).collect();
        assert_eq!(months, [0, 1, 9, 11, 19, 23]);
        // the LTV:CAC milestone is declared last but happens first
        assert_eq!(s.milestones[0].description, "Achieve 3:1 LTV:CAC ratio");
        assert_eq!(
            s.milestones[5].description,
            "Reach break-even (positive cash flow)"
        );
        assert_eq!(s.metric(BREAK_EVEN_MONTH), Some("Month 24"));
    }

    #[test]
    fn unmet_milestones_are_omitted() {
        let a = BusinessAssumptions {
            monthly_growth_rate: 0.0,
            user_acquisition_cost: 0.0,
            ..Default::default()
        };
        let p = run_projection(&a, capital(), 1);
        let s = summarize(&p).unwrap();
        assert!(s.milestones.iter().all(|m| m.description != "Reach 1,000 total users"));
        assert!(s.milestones.iter().all(|m| m.description != "Achieve 3:1 LTV:CAC ratio"));
    }

    #[test]
    fn empty_projection_is_an_error() {
        let p = run_projection(&BusinessAssumptions::default(), capital(), 0);
        assert_eq!(summarize(&p), Err(InsightError::EmptyProjection));
    }

    #[test]
    fn rule_of_40_without_recurring_revenue_is_net_margin() {
        let a = BusinessAssumptions {
            conversion_rate: 0.0,
            ..Default::default()
        };
        let p = run_projection(&a, capital(), 1);
        let last = p.final_month().unwrap();
        assert_eq!(last.revenue.mrr, Decimal::ZERO);
        assert_eq!(rule_of_40(&p.monthly_data), last.metrics.net_margin);
    }

    #[test]
    fn capital_efficiency_guards_zero_arr() {
        assert_eq!(capital_efficiency(Decimal::from(10), Decimal::ZERO), 0.0);
        assert_eq!(capital_efficiency(Decimal::from(30), Decimal::from(20)), 1.5);
    }
}

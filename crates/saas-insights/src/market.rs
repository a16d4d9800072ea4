//! Market sizing against the addressable-market goal.

use saas_core::BusinessAssumptions;
use saas_econ as econ;
use saas_projection::ProjectionResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPosition {
    /// Users needed to hold the goal share of the addressable market.
    pub target_users: f64,
    pub final_users: i64,
    /// Final users as a percentage of the addressable market.
    pub final_share: f64,
    pub target_reached_month: Option<usize>,
    pub reached_within_goal: bool,
}

pub fn market_position(a: &BusinessAssumptions, p: &ProjectionResult) -> MarketPosition {
    let target_users = a.total_addressable_market * econ::pct(a.market_share_goal);
    let final_users = p.final_month().map_or(0, |s| s.users.total);
    let final_share = if a.total_addressable_market > 0.0 {
        final_users as f64 / a.total_addressable_market * 100.0
    } else {
        0.0
    };
    let target_reached_month = p
        .monthly_data
        .iter()
        .position(|s| s.users.total as f64 >= target_users);
    let goal_months = a.time_to_reach_goal_years * 12.0;
    MarketPosition {
        target_users,
        final_users,
        final_share,
        target_reached_month,
        reached_within_goal: target_reached_month.is_some_and(|m| (m as f64) < goal_months),
    }
}

#![deny(warnings)]

//! Reporting on top of projections: executive summaries, scenario
//! comparison and market sizing.

pub mod market;
pub mod scenario;
pub mod summary;

use rust_decimal::Decimal;
use saas_core::BusinessAssumptions;
use thiserror::Error;

pub use market::{market_position, MarketPosition};
pub use scenario::{compare, ScenarioOutcome, ScenarioSet, ScenarioVariant};
pub use summary::{summarize, ExecutiveSummary, KeyMetric, Milestone};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsightError {
    /// A summary needs at least one projected month.
    #[error("projection has no months to summarize")]
    EmptyProjection,
}

/// Base case plus `variants` over `horizon_years`, summarized and compared.
pub fn run_scenario_comparison(
    base: &BusinessAssumptions,
    variants: &[ScenarioVariant],
    initial_capital: Decimal,
    horizon_years: u32,
) -> Result<ScenarioSet, InsightError> {
    compare(base, variants, initial_capital, horizon_years)
}

#![deny(warnings)]

//! Plan files: a YAML or JSON description of one modelling run.
//!
//! A plan carries partial assumptions merged over the reference defaults, the
//! starting capital and horizon, an optional calendar start date and any
//! what-if scenarios to compare against the base case.
//!
//! Example:
//!
//! ```yaml
//! assumptions:
//!   monthlyGrowthRate: 20
//!   churnRate: 4
//! initialCapital: 750000
//! horizonYears: 3
//! startDate: 2025-01-01
//! scenarios:
//!   - name: Cheap Acquisition
//!     overrides: { userAcquisitionCost: 40 }
//! ```

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use saas_core::{
    validate_assumptions, AssumptionOverrides, BusinessAssumptions, ValidationError,
    DEFAULT_HORIZON_YEARS, DEFAULT_INITIAL_CAPITAL,
};
use saas_insights::ScenarioVariant;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Scenario name used when the base assumptions fail validation.
pub const BASE_SCENARIO: &str = "base";

/// Longest horizon a plan may request.
pub const MAX_HORIZON_YEARS: u32 = 100;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported plan format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("horizon must be at least one year")]
    EmptyHorizon,
    #[error("horizon of {0} years exceeds the {max}-year limit", max = MAX_HORIZON_YEARS)]
    HorizonTooLong(u32),
    #[error("initial capital must not be negative, got {0}")]
    NegativeCapital(Decimal),
    #[error("scenario {scenario}: {source}")]
    Invalid {
        scenario: String,
        #[source]
        source: ValidationError,
    },
}

fn default_capital() -> Decimal {
    Decimal::from(DEFAULT_INITIAL_CAPITAL)
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_YEARS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlanFile {
    #[serde(default)]
    pub assumptions: AssumptionOverrides,
    #[serde(default = "default_capital")]
    pub initial_capital: Decimal,
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioVariant>,
}

impl Default for PlanFile {
    fn default() -> Self {
        Self {
            assumptions: AssumptionOverrides::default(),
            initial_capital: default_capital(),
            horizon_years: default_horizon(),
            start_date: None,
            scenarios: Vec::new(),
        }
    }
}

impl PlanFile {
    /// Load a plan, picking the parser from the file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let text = fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => return Err(PlanError::UnsupportedFormat(path.to_path_buf())),
        };
        info!(
            path = %path.display(),
            scenarios = plan.scenarios.len(),
            "loaded plan"
        );
        Ok(plan)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, PlanError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Plan assumptions merged over the reference defaults.
    pub fn base_assumptions(&self) -> BusinessAssumptions {
        self.assumptions.apply(&BusinessAssumptions::default())
    }

    /// Check the horizon, the capital, the base assumptions and every merged
    /// scenario.
    pub fn validate(&self) -> Result<(), PlanError> {
        match self.horizon_years {
            0 => return Err(PlanError::EmptyHorizon),
            y if y > MAX_HORIZON_YEARS => return Err(PlanError::HorizonTooLong(y)),
            _ => {}
        }
        if self.initial_capital < Decimal::ZERO {
            return Err(PlanError::NegativeCapital(self.initial_capital));
        }
        let base = self.base_assumptions();
        validate_assumptions(&base).map_err(|source| PlanError::Invalid {
            scenario: BASE_SCENARIO.to_string(),
            source,
        })?;
        for s in &self.scenarios {
            debug!(scenario = %s.name, "validating scenario");
            validate_assumptions(&s.overrides.apply(&base)).map_err(|source| {
                PlanError::Invalid {
                    scenario: s.name.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    /// Calendar date of month `index`, if the plan has a start date.
    pub fn calendar_month(&self, index: usize) -> Option<NaiveDate> {
        add_months(self.start_date?, index)
    }
}

/// Shift `start` by `months`; a day past the end of the target month falls
/// back to the 1st.
fn add_months(start: NaiveDate, months: usize) -> Option<NaiveDate> {
    let total = i64::from(start.month0()) + i64::try_from(months).ok()?;
    let year = i32::try_from(i64::from(start.year()) + total / 12).ok()?;
    let month = u32::try_from(total % 12 + 1).ok()?;
    NaiveDate::from_ymd_opt(year, month, start.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 1))
}

/// `YYYY-MM` label for a calendar month.
pub fn month_label(date: NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

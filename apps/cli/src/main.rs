#![deny(warnings)]

//! Headless CLI: run a projection from a plan file (or the reference
//! assumptions), print the executive summary and optionally compare scenarios.

use anyhow::{bail, Context, Result};
use planfile::PlanFile;
use rust_decimal::Decimal;
use saas_insights::{
    market_position, run_scenario_comparison, summarize, ExecutiveSummary, MarketPosition,
    ScenarioSet, ScenarioVariant,
};
use saas_projection::{run_projection, ProjectionResult};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: saas-model [--plan FILE] [--years N] [--capital AMOUNT] [--scenarios] [--json] [--version] [--help]";

#[derive(Debug, Default)]
struct Args {
    plan: Option<PathBuf>,
    years: Option<u32>,
    capital: Option<Decimal>,
    scenarios: bool,
    json: bool,
    version: bool,
    help: bool,
}

fn parse_args<I>(argv: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args::default();
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--plan" => args.plan = it.next().map(PathBuf::from),
            "--years" => {
                let v = it.next().context("--years needs a value")?;
                args.years = Some(v.parse().with_context(|| format!("bad --years {v}"))?);
            }
            "--capital" => {
                let v = it.next().context("--capital needs a value")?;
                args.capital = Some(v.parse().with_context(|| format!("bad --capital {v}"))?);
            }
            "--scenarios" => args.scenarios = true,
            "--json" => args.json = true,
            "--version" | "-V" => args.version = true,
            "--help" | "-h" => args.help = true,
            other => bail!("unknown argument {other}\n{USAGE}"),
        }
    }
    Ok(args)
}

fn load_plan(args: &Args) -> Result<PlanFile> {
    let mut plan = match &args.plan {
        Some(path) => PlanFile::load(path)
            .with_context(|| format!("loading plan {}", path.display()))?,
        None => PlanFile::default(),
    };
    if let Some(years) = args.years {
        plan.horizon_years = years;
    }
    if let Some(capital) = args.capital {
        plan.initial_capital = capital;
    }
    plan.validate()?;
    Ok(plan)
}

fn month_name(plan: &PlanFile, index: usize) -> String {
    match plan.calendar_month(index) {
        Some(date) => format!("Month {} ({})", index + 1, planfile::month_label(date)),
        None => format!("Month {}", index + 1),
    }
}

fn print_summary(
    plan: &PlanFile,
    projection: &ProjectionResult,
    summary: &ExecutiveSummary,
    market: &MarketPosition,
) {
    println!(
        "Projection | months: {} | initial capital: ${}",
        projection.monthly_data.len(),
        projection.initial_capital
    );
    println!("\nKey metrics");
    for m in &summary.key_metrics {
        println!("  {:<36} {}", m.label, m.value);
    }
    if let Some(k) = projection.break_even_month {
        println!("  {:<36} {}", "Break-even", month_name(plan, k));
    }
    println!(
        "  {:<36} {:.1}% of TAM (target {:.0} users{})",
        "Market share (Final)",
        market.final_share,
        market.target_users,
        match market.target_reached_month {
            Some(k) => format!(", reached {}", month_name(plan, k)),
            None => String::new(),
        }
    );

    println!("\nMilestones");
    for m in &summary.milestones {
        println!("  {:<20} {}", month_name(plan, m.month), m.description);
    }
    println!("\nRecommendations");
    for r in &summary.recommendations {
        println!("  - {r}");
    }
    println!("\nRisks");
    for r in &summary.risks {
        println!("  - {r}");
    }
}

fn print_comparison(set: &ScenarioSet) {
    println!("\nScenario comparison");
    let names: Vec<&str> = set.scenarios.iter().map(|s| s.name.as_str()).collect();
    let mut header = format!("  {:<36}", "");
    for name in &names {
        header.push_str(&format!(" {:>22}", name));
    }
    println!("{header}");
    for row in &set.comparison {
        let mut line = format!("  {:<36}", row.metric);
        for name in &names {
            line.push_str(&format!(" {:>22}", row.value(name).unwrap_or("-")));
        }
        println!("{line}");
    }
}

/// Log subscriber honouring `filter`; logs go to stderr so --json output
/// stays clean.
fn subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    subscriber(filter).init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    if args.version {
        println!(
            "saas-model {} ({} built {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(plan = ?args.plan, years = ?args.years, scenarios = args.scenarios, "starting CLI");

    let plan = load_plan(&args)?;
    let assumptions = plan.base_assumptions();
    for (name, value) in assumptions.fields() {
        debug!(name, value, "assumption");
    }

    let projection = run_projection(&assumptions, plan.initial_capital, plan.horizon_years);
    let summary = summarize(&projection).context("summarizing projection")?;
    let market = market_position(&assumptions, &projection);

    let scenarios = if args.scenarios {
        let variants = if plan.scenarios.is_empty() {
            ScenarioVariant::presets()
        } else {
            plan.scenarios.clone()
        };
        Some(run_scenario_comparison(
            &assumptions,
            &variants,
            plan.initial_capital,
            plan.horizon_years,
        )?)
    } else {
        None
    };

    if args.json {
        let out = serde_json::json!({
            "assumptions": assumptions,
            "projection": projection,
            "summary": summary,
            "market": market,
            "scenarios": scenarios,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_summary(&plan, &projection, &summary, &market);
    if let Some(set) = &scenarios {
        print_comparison(set);
    }
    Ok(())
}

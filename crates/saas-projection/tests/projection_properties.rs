use proptest::prelude::*;
use rust_decimal::Decimal;
use saas_core::BusinessAssumptions;
use saas_projection::{project, run_projection, InitialRevenueModel, ProjectionConfig};

fn capital() -> Decimal {
    Decimal::from(500_000)
}

#[test]
fn identical_inputs_give_identical_output() {
    let a = BusinessAssumptions::default();
    let r1 = run_projection(&a, capital(), 5);
    let r2 = run_projection(&a, capital(), 5);
    assert_eq!(r1, r2);
    assert_eq!(
        serde_json::to_string(&r1).unwrap(),
        serde_json::to_string(&r2).unwrap()
    );
}

#[test]
fn quarters_conserve_monthly_totals() {
    let r = run_projection(&BusinessAssumptions::default(), capital(), 5);
    for (q, months) in r.quarterly_data.iter().zip(r.monthly_data.chunks(3)) {
        let revenue: Decimal = months.iter().map(|m| m.revenue.total).sum();
        let costs: Decimal = months.iter().map(|m| m.costs.total).sum();
        assert_eq!(q.revenue.total, revenue, "{}", q.period.label);
        assert_eq!(q.costs.total, costs, "{}", q.period.label);
        assert_eq!(q.users.total, months[2].users.total);
        assert_eq!(q.cash.balance, months[2].cash.balance);
    }
    let y1 = &r.yearly_data[0];
    assert_eq!(y1.revenue.total, Decimal::from(94_256));
    assert_eq!(y1.users.total, 1_143);
}

#[test]
fn break_even_is_first_positive_month() {
    let a = BusinessAssumptions {
        user_acquisition_cost: 10.0,
        ..Default::default()
    };
    let r = run_projection(&a, capital(), 5);
    let k = r.break_even_month.expect("break-even within horizon");
    assert!(r.monthly_data[..k]
        .iter()
        .all(|m| m.profit() <= Decimal::ZERO));
    assert!(r.monthly_data[k].profit() > Decimal::ZERO);
    assert_eq!(r.break_even_date.as_deref(), Some("Year 2, Month 12"));
    // never dips below the starting capital by more than it holds
    assert_eq!(r.total_investment_needed, capital());
}

#[test]
fn team_cost_steps_with_users() {
    let a = BusinessAssumptions {
        initial_users: 500.0,
        monthly_growth_rate: 0.0,
        churn_rate: 0.0,
        ..Default::default()
    };
    // month 0 doubles the initial cohort to 1000 users
    let r = run_projection(&a, capital(), 1);
    assert_eq!(r.monthly_data[0].users.total, 1_000);
    assert_eq!(r.monthly_data[0].costs.team, Decimal::from(18_000));
    assert_eq!(r.monthly_data[11].users.total, 1_000);

    let a = BusinessAssumptions {
        initial_users: 1_250.0,
        ..a
    };
    let r = run_projection(&a, capital(), 1);
    assert_eq!(r.monthly_data[0].users.total, 2_500);
    assert_eq!(r.monthly_data[0].costs.team, Decimal::from(21_000));
}

#[test]
fn zero_churn_caps_customer_lifetime() {
    let a = BusinessAssumptions {
        churn_rate: 0.0,
        ..Default::default()
    };
    let r = run_projection(&a, capital(), 1);
    // 75 * 60 months * 1.3 * 1.05
    let ltv = r.monthly_data[0].metrics.ltv;
    assert!(ltv >= Decimal::from(6_142) && ltv <= Decimal::from(6_143));
}

#[test]
fn zero_growth_is_a_flat_projection() {
    let a = BusinessAssumptions {
        monthly_growth_rate: 0.0,
        churn_rate: 0.0,
        ..Default::default()
    };
    let r = run_projection(&a, capital(), 2);
    let users: Vec<i64> = r.monthly_data.iter().map(|m| m.users.total).collect();
    assert!(users.iter().all(|&u| u == 100));
    assert!(r.monthly_data[1..].iter().all(|m| m.users.new == 0));
}

#[test]
fn degenerate_churn_is_not_floored() {
    let a = BusinessAssumptions {
        monthly_growth_rate: 0.0,
        churn_rate: 250.0,
        ..Default::default()
    };
    let r = run_projection(&a, capital(), 1);
    assert!(r.monthly_data.iter().any(|m| m.users.total < 0));
}

#[test]
fn planning_variant_month_one() {
    let a = BusinessAssumptions {
        initial_users: 50.0,
        monthly_growth_rate: 30.0,
        user_acquisition_cost: 0.0,
        churn_rate: 0.0,
        infrastructure_costs_per_user: 0.0,
        marketing_budget_percentage_of_revenue: 0.0,
        ..Default::default()
    };
    let cfg = ProjectionConfig {
        horizon_months: 12,
        initial_revenue: InitialRevenueModel::Unscaled,
        ..Default::default()
    };
    let r = project(&a, &cfg);
    let m1 = &r.monthly_data[0];
    assert_eq!(m1.revenue.initial_purchases, Decimal::from(2_500));
    assert_eq!(
        m1.costs.infrastructure + m1.costs.team + m1.costs.marketing,
        Decimal::from(19_500)
    );
    assert!(m1.profit() < Decimal::ZERO);
}

prop_compose! {
    fn assumptions()(
        growth in 0.0f64..40.0,
        churn in 0.0f64..20.0,
        conversion in 0.0f64..50.0,
        cac in 0.0f64..200.0,
        monthly in 0.0f64..300.0,
    ) -> BusinessAssumptions {
        BusinessAssumptions {
            monthly_growth_rate: growth,
            churn_rate: churn,
            conversion_rate: conversion,
            user_acquisition_cost: cac,
            avg_monthly_credit_purchase: monthly,
            ..Default::default()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn aggregation_conserves_flows(a in assumptions(), years in 1u32..5) {
        let r = run_projection(&a, capital(), years);
        prop_assert_eq!(r.monthly_data.len(), years as usize * 12);
        for (y, months) in r.yearly_data.iter().zip(r.monthly_data.chunks(12)) {
            let revenue: Decimal = months.iter().map(|m| m.revenue.total).sum();
            let costs: Decimal = months.iter().map(|m| m.costs.total).sum();
            prop_assert_eq!(y.revenue.total, revenue);
            prop_assert_eq!(y.costs.total, costs);
            prop_assert_eq!(y.users.total, months[months.len() - 1].users.total);
        }
    }

    #[test]
    fn totals_are_non_negative(a in assumptions()) {
        let r = run_projection(&a, capital(), 2);
        for m in &r.monthly_data {
            prop_assert!(m.revenue.total >= Decimal::ZERO);
            prop_assert!(m.costs.total >= Decimal::ZERO);
        }
    }

    #[test]
    fn break_even_precedes_only_losses(a in assumptions()) {
        let r = run_projection(&a, capital(), 3);
        if let Some(k) = r.break_even_month {
            for m in &r.monthly_data[..k] {
                prop_assert!(m.profit() <= Decimal::ZERO);
            }
        }
    }
}

//! Tests for the `FinanceEngine` pipeline
//!
//! These tests verify that:
//! - Repeated calls are served from the cache and match the computed result
//! - Tag invalidation removes only the dependent entries
//! - Every call, hit or miss, leaves a performance sample
//! - Monte Carlo seeds are honoured and reported

use jiff::ToSpan;
use jiff::civil::date;

use crate::config::EngineConfig;
use crate::engine::FinanceEngine;
use crate::metrics::Complexity;
use crate::model::{
    CompoundInterestParams, DebtAccount, DebtPayoffParams, FireParams, Goal, MonteCarloParams,
    PayoffStrategy, Priority, SavingsPlanParams,
};
use crate::monte_carlo::SimulationProgress;

fn compound_params() -> CompoundInterestParams {
    CompoundInterestParams {
        principal: 1_000.0,
        annual_rate: 0.05,
        compounding_frequency: 12,
        time_in_years: 10.0,
        contribution: None,
    }
}

fn fire_params() -> FireParams {
    FireParams {
        monthly_expenses: Some(4_000.0),
        ..FireParams::default()
    }
}

fn debt_params() -> DebtPayoffParams {
    DebtPayoffParams {
        debts: vec![
            DebtAccount {
                id: "visa".into(),
                name: "Visa".into(),
                balance: 3_000.0,
                annual_interest_rate: 0.19,
                minimum_payment: 90.0,
            },
            DebtAccount {
                id: "loan".into(),
                name: "Student loan".into(),
                balance: 15_000.0,
                annual_interest_rate: 0.045,
                minimum_payment: 180.0,
            },
        ],
        extra_payment: 250.0,
        strategy: PayoffStrategy::Avalanche,
        context: None,
        consolidation: None,
    }
}

fn savings_params() -> SavingsPlanParams {
    SavingsPlanParams {
        as_of: Some(date(2025, 3, 1)),
        current_age: 32,
        monthly_income: 7_000.0,
        current_savings: 25_000.0,
        monthly_expenses: 3_500.0,
        goals: vec![Goal {
            id: "house".into(),
            name: "House deposit".into(),
            target_amount: 60_000.0,
            current_progress: 10_000.0,
            target_date: date(2028, 3, 1),
            priority: Priority::High,
            is_flexible: false,
        }],
        income_growth: None,
        constraints: Default::default(),
        preferences: Default::default(),
        expense_categories: Vec::new(),
    }
}

fn mc_params(seed: Option<u64>) -> MonteCarloParams {
    MonteCarloParams {
        initial_value: 50_000.0,
        monthly_contribution: 1_000.0,
        years: 10,
        expected_annual_return: 0.07,
        annual_volatility: 0.15,
        iterations: 300,
        inflation_rate: Some(0.025),
        seed,
        target_value: None,
    }
}

#[test]
fn test_second_call_is_a_cache_hit() {
    let engine = FinanceEngine::default();
    let first = engine.calculate_compound_interest(&compound_params()).unwrap();
    let second = engine.calculate_compound_interest(&compound_params()).unwrap();
    assert_eq!(first, second);
    assert!((first.future_value - 1647.01).abs() < 0.01);

    let cache = engine.cache_stats();
    assert_eq!(cache.hits, 1);
    assert_eq!(cache.misses, 1);
    assert_eq!(cache.entries, 1);

    let perf = engine.performance_metrics();
    assert_eq!(perf.total_calls, 2);
    assert_eq!(perf.cache_hits, 1);
    assert_eq!(perf.cache_hit_rate, 0.5);

    let samples = engine.performance_samples();
    assert!(!samples[0].cache_hit);
    assert!(samples[1].cache_hit);
    assert_eq!(samples[0].complexity, Complexity::Constant);
}

#[test]
fn test_cached_result_equals_direct_calculation() {
    let engine = FinanceEngine::default();
    let via_engine = engine.calculate_fire_number(&fire_params()).unwrap();
    let direct = crate::fire::calculate(&fire_params()).unwrap();
    assert_eq!(via_engine, direct);
    assert_eq!(engine.calculate_fire_number(&fire_params()).unwrap(), direct);
}

#[test]
fn test_different_params_do_not_collide() {
    let engine = FinanceEngine::default();
    let a = engine.calculate_compound_interest(&compound_params()).unwrap();
    let mut other = compound_params();
    other.annual_rate = 0.06;
    let b = engine.calculate_compound_interest(&other).unwrap();
    assert_ne!(a.future_value, b.future_value);
    assert_eq!(engine.cache_stats().entries, 2);
}

#[test]
fn test_tag_invalidation_is_selective() {
    let engine = FinanceEngine::default();
    engine.calculate_compound_interest(&compound_params()).unwrap();
    engine.calculate_fire_number(&fire_params()).unwrap();
    engine.plan_debt_payoff(&debt_params()).unwrap();
    engine.optimize_savings_plan(&savings_params()).unwrap();
    assert_eq!(engine.cache_stats().entries, 4);

    assert_eq!(engine.clear_cache(Some(&["debt:visa"])), 1);
    assert_eq!(engine.clear_cache(Some(&["income", "expenses"])), 2);
    // Compound results carry no tags
    assert_eq!(engine.clear_cache(Some(&["debts"])), 0);
    assert_eq!(engine.cache_stats().entries, 1);

    assert_eq!(engine.clear_cache(None), 1);
    engine.calculate_compound_interest(&compound_params()).unwrap();
    assert_eq!(engine.cache_stats().hits, 0);
}

#[test]
fn test_seeded_monte_carlo_is_reproducible_across_engines() {
    let a = FinanceEngine::default()
        .simulate_monte_carlo(&mc_params(Some(11)))
        .unwrap();
    let b = FinanceEngine::default()
        .simulate_monte_carlo(&mc_params(Some(11)))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.seed, Some(11));
}

#[test]
fn test_unseeded_monte_carlo_uses_engine_seed() {
    let config = EngineConfig::default().with_seed(2024);
    let a = FinanceEngine::new(config.clone())
        .unwrap()
        .simulate_monte_carlo(&mc_params(None))
        .unwrap();
    let b = FinanceEngine::new(config)
        .unwrap()
        .simulate_monte_carlo(&mc_params(None))
        .unwrap();
    assert_eq!(a, b);
    let seed = a.seed.expect("engine reports the drawn seed");
    assert_eq!(crate::monte_carlo::simulate_seeded(&mc_params(None), seed).unwrap(), a);
}

#[test]
fn test_cancelled_simulation_is_not_cached() {
    let engine = FinanceEngine::default();
    let progress = SimulationProgress::new();
    progress.cancel();
    assert!(engine
        .simulate_monte_carlo_with_progress(&mc_params(Some(1)), &progress)
        .is_err());
    assert_eq!(engine.cache_stats().entries, 0);

    let perf = engine.performance_metrics();
    assert_eq!(perf.total_calls, 1);
    assert_eq!(perf.cache_hits, 0);
}

#[test]
fn test_savings_without_as_of_is_pinned_to_today() {
    let engine = FinanceEngine::default();
    let mut params = savings_params();
    params.as_of = None;
    params.goals[0].target_date = jiff::Zoned::now().date().saturating_add(3.years());
    let result = engine.optimize_savings_plan(&params).unwrap();
    assert_eq!(result.as_of, jiff::Zoned::now().date());
    assert_eq!(result.allocations[0].months_to_target, 36);
}

#[test]
fn test_failed_call_records_sample() {
    let engine = FinanceEngine::default();
    let mut params = debt_params();
    params.debts[1].minimum_payment = 10.0;
    params.debts[1].annual_interest_rate = 0.5;
    params.extra_payment = 0.0;
    assert!(engine.plan_debt_payoff(&params).is_err());
    assert_eq!(engine.cache_stats().entries, 0);
    let perf = engine.performance_metrics();
    assert_eq!(perf.total_calls, 1);
    assert_eq!(perf.per_function["debt_payoff"].calls, 1);
}

#[test]
fn test_ttl_and_capacity_come_from_config() {
    let engine = FinanceEngine::new(
        EngineConfig::default()
            .with_cache_capacity(1)
            .with_cache_ttl(std::time::Duration::from_secs(60)),
    )
    .unwrap();
    engine.calculate_compound_interest(&compound_params()).unwrap();
    engine.calculate_fire_number(&fire_params()).unwrap();
    let stats = engine.cache_stats();
    assert_eq!(stats.capacity, 1);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.ttl.as_secs(), 60);
}

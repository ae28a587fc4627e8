//! FIRE number calculator
//!
//! The base number is annual expenses divided by the withdrawal rate. The
//! adjusted number scales it by cost of living and a safety margin. Healthcare
//! before Medicare and the value of a future Social Security benefit move the
//! total up and down, and stress scenarios re-run the adjusted number under
//! perturbed assumptions.

use crate::error::{EngineError, Result, ensure_finite};
use crate::model::{
    CategoryBreakdown, CategoryProjection, FireParams, FireResult, FireVariants,
    HealthcareBridge, HealthcareProfile, Priority, Recommendation, RiskLevel,
    SocialSecurityOffset, StressScenario, StressTestResult, sort_recommendations,
};
use crate::validation::{
    require_in_range, require_non_negative, require_positive, require_rate_above_total_loss,
};

const OPERATION: &str = "fire number";

const LEAN_MULTIPLIER: f64 = 0.7;
const FAT_MULTIPLIER: f64 = 2.0;
const COAST_MULTIPLIER: f64 = 0.6;
const BARISTA_MULTIPLIER: f64 = 0.5;

/// Discount rate applied to future Social Security benefits
const SOCIAL_SECURITY_DISCOUNT_RATE: f64 = 0.03;
/// Years of elevated inflation assumed by a stress scenario
const STRESS_HORIZON_YEARS: i32 = 5;
const MIN_STRESSED_WITHDRAWAL_RATE: f64 = 0.01;
const MAX_YEARS_TO_FIRE: u32 = 100;

const SAFE_WITHDRAWAL_RATE: f64 = 0.04;
const RECOMMENDED_SAFETY_MARGIN: f64 = 0.10;
const DISCRETIONARY_SHARE_LIMIT: f64 = 0.30;
const DISCRETIONARY_CUT: f64 = 0.20;

// Placeholder coverage used to size the "missing healthcare" recommendation
const ESTIMATED_MONTHLY_PREMIUM: f64 = 500.0;
const ESTIMATED_OUT_OF_POCKET: f64 = 2_000.0;

/// Annual spending: monthly expenses when positive, then the annual figure,
/// then the category total
pub fn annual_expenses(params: &FireParams) -> Result<f64> {
    if let Some(monthly) = params.monthly_expenses {
        require_non_negative("monthly_expenses", monthly)?;
    }
    if let Some(annual) = params.annual_expenses {
        require_non_negative("annual_expenses", annual)?;
    }
    let category_total = params
        .expense_categories
        .iter()
        .map(|c| c.monthly_amount)
        .sum::<f64>()
        * 12.0;

    let annual = match (params.monthly_expenses, params.annual_expenses) {
        (Some(monthly), _) if monthly > 0.0 => monthly * 12.0,
        (_, Some(annual)) if annual > 0.0 => annual,
        _ if category_total > 0.0 => category_total,
        (None, None) if params.expense_categories.is_empty() => {
            return Err(EngineError::invalid(
                "expenses",
                "one of monthly_expenses, annual_expenses or expense_categories is required",
            ));
        }
        _ => 0.0,
    };
    require_positive("expenses", annual)?;
    Ok(annual)
}

pub fn validate(params: &FireParams) -> Result<()> {
    for category in &params.expense_categories {
        require_non_negative("expense_categories.monthly_amount", category.monthly_amount)?;
        require_rate_above_total_loss("expense_categories.inflation_rate", category.inflation_rate)?;
    }
    annual_expenses(params)?;
    require_in_range("withdrawal_rate", params.withdrawal_rate, 0.0, 1.0)?;
    require_non_negative("safety_margin", params.safety_margin)?;
    require_positive("cost_of_living_multiplier", params.cost_of_living_multiplier)?;

    if let Some(hc) = &params.healthcare {
        require_non_negative("healthcare.monthly_premium", hc.monthly_premium)?;
        require_non_negative("healthcare.annual_out_of_pocket", hc.annual_out_of_pocket)?;
        require_rate_above_total_loss("healthcare.inflation_rate", hc.inflation_rate)?;
        require_positive("healthcare.coverage_gap_years", f64::from(hc.coverage_gap_years))?;
    }
    if let Some(ss) = &params.social_security {
        require_non_negative("social_security.monthly_benefit", ss.monthly_benefit)?;
    }
    if let (Some(current), Some(retirement)) = (params.current_age, params.retirement_age) {
        if retirement < current {
            return Err(EngineError::invalid(
                "retirement_age",
                format!("must not be before current_age ({current}), got {retirement}"),
            ));
        }
    }
    require_non_negative("current_savings", params.current_savings)?;
    require_non_negative("annual_savings", params.annual_savings)?;
    require_rate_above_total_loss("expected_return", params.expected_return)?;

    for scenario in &params.stress_scenarios {
        require_rate_above_total_loss(
            "stress_scenarios.market_return_change",
            scenario.market_return_change,
        )?;
        require_rate_above_total_loss("stress_scenarios.inflation_change", scenario.inflation_change)?;
        require_rate_above_total_loss("stress_scenarios.expense_change", scenario.expense_change)?;
    }
    Ok(())
}

pub(crate) fn dependency_tags(params: &FireParams) -> Vec<String> {
    let mut tags = vec!["expenses".to_string()];
    if params.healthcare.is_some() {
        tags.push("healthcare".to_string());
    }
    if params.social_security.is_some() {
        tags.push("social_security".to_string());
    }
    tags
}

/// Market downturn, high inflation and recession
#[must_use]
pub fn default_stress_scenarios() -> Vec<StressScenario> {
    vec![
        StressScenario {
            name: "Market downturn".to_string(),
            market_return_change: -0.25,
            inflation_change: 0.0,
            expense_change: 0.0,
        },
        StressScenario {
            name: "High inflation".to_string(),
            market_return_change: 0.0,
            inflation_change: 0.05,
            expense_change: 0.0,
        },
        StressScenario {
            name: "Recession".to_string(),
            market_return_change: -0.15,
            inflation_change: 0.0,
            expense_change: 0.10,
        },
    ]
}

fn healthcare_bridge(hc: &HealthcareProfile) -> HealthcareBridge {
    let annual_cost = hc.monthly_premium * 12.0 + hc.annual_out_of_pocket;
    let gap = f64::from(hc.coverage_gap_years);
    // Mid-gap inflation approximates the growth over the whole bridge
    let total_cost = annual_cost * gap * (1.0 + hc.inflation_rate).powf(gap / 2.0);
    HealthcareBridge {
        annual_cost,
        coverage_gap_years: hc.coverage_gap_years,
        total_cost,
    }
}

fn years_until_retirement(params: &FireParams) -> Option<u32> {
    match (params.current_age, params.retirement_age) {
        (Some(current), Some(retirement)) => Some(retirement.saturating_sub(current)),
        _ => None,
    }
}

fn category_breakdown(params: &FireParams) -> Option<CategoryBreakdown> {
    if params.expense_categories.is_empty() {
        return None;
    }
    let years = years_until_retirement(params).unwrap_or(0) as i32;
    let categories: Vec<CategoryProjection> = params
        .expense_categories
        .iter()
        .map(|c| {
            let annual_amount = c.monthly_amount * 12.0;
            CategoryProjection {
                name: c.name.clone(),
                annual_amount,
                projected_annual_amount: annual_amount * (1.0 + c.inflation_rate).powi(years),
                essential: c.essential,
            }
        })
        .collect();
    let essential_annual: f64 = categories
        .iter()
        .filter(|c| c.essential)
        .map(|c| c.annual_amount)
        .sum();
    let discretionary_annual: f64 = categories
        .iter()
        .filter(|c| !c.essential)
        .map(|c| c.annual_amount)
        .sum();
    Some(CategoryBreakdown {
        categories,
        essential_annual,
        discretionary_annual,
        essential_only_fire_number: essential_annual / params.withdrawal_rate,
    })
}

fn stress_test(
    scenario: &StressScenario,
    params: &FireParams,
    annual: f64,
    adjusted: f64,
) -> StressTestResult {
    let adjusted_withdrawal_rate = (params.withdrawal_rate * (1.0 + scenario.market_return_change))
        .max(MIN_STRESSED_WITHDRAWAL_RATE);
    let adjusted_annual_expenses = annual
        * (1.0 + scenario.expense_change)
        * (1.0 + scenario.inflation_change).powi(STRESS_HORIZON_YEARS);
    let fire_number = adjusted_annual_expenses / adjusted_withdrawal_rate
        * params.cost_of_living_multiplier
        * (1.0 + params.safety_margin);
    let increase_pct = (fire_number - adjusted) / adjusted * 100.0;
    let risk = if increase_pct > 50.0 {
        RiskLevel::High
    } else if increase_pct > 25.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    StressTestResult {
        scenario: scenario.name.clone(),
        adjusted_withdrawal_rate,
        adjusted_annual_expenses,
        fire_number,
        increase_pct,
        risk,
    }
}

/// Years until savings compounding monthly reach `target`
fn years_to_fire(params: &FireParams, target: f64) -> Option<f64> {
    if params.current_savings >= target {
        return Some(0.0);
    }
    if params.annual_savings <= 0.0 && params.current_savings <= 0.0 {
        return None;
    }
    let monthly_rate = params.expected_return / 12.0;
    let monthly_saving = params.annual_savings / 12.0;
    let mut balance = params.current_savings;
    for month in 1..=MAX_YEARS_TO_FIRE * 12 {
        balance = balance * (1.0 + monthly_rate) + monthly_saving;
        if balance >= target {
            return Some(f64::from(month) / 12.0);
        }
    }
    None
}

fn recommendations(
    params: &FireParams,
    annual: f64,
    base: f64,
    breakdown: Option<&CategoryBreakdown>,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let wr = params.withdrawal_rate;

    if wr > SAFE_WITHDRAWAL_RATE {
        recs.push(Recommendation::new(
            "withdrawal_rate",
            format!(
                "A {:.1}% withdrawal rate is aggressive; planning around 4% needs more capital but survives longer retirements",
                wr * 100.0
            ),
            annual / SAFE_WITHDRAWAL_RATE - annual / wr,
            Priority::High,
        ));
    }

    if params.healthcare.is_none() {
        let estimate = healthcare_bridge(&HealthcareProfile {
            monthly_premium: ESTIMATED_MONTHLY_PREMIUM,
            annual_out_of_pocket: ESTIMATED_OUT_OF_POCKET,
            inflation_rate: 0.05,
            coverage_gap_years: 10,
        });
        recs.push(Recommendation::new(
            "healthcare",
            "Budget for private health coverage between early retirement and Medicare eligibility",
            estimate.total_cost,
            Priority::Medium,
        ));
    }

    if params.safety_margin < RECOMMENDED_SAFETY_MARGIN {
        recs.push(Recommendation::new(
            "safety_margin",
            "Raise the safety margin to at least 10% to absorb unplanned expenses",
            base * params.cost_of_living_multiplier
                * (RECOMMENDED_SAFETY_MARGIN - params.safety_margin),
            Priority::Medium,
        ));
    }

    if let Some(b) = breakdown {
        let total = b.essential_annual + b.discretionary_annual;
        if total > 0.0 && b.discretionary_annual / total > DISCRETIONARY_SHARE_LIMIT {
            recs.push(Recommendation::new(
                "discretionary_spending",
                format!(
                    "Discretionary spending is {:.0}% of the budget; a 20% cut lowers the FIRE number",
                    b.discretionary_annual / total * 100.0
                ),
                b.discretionary_annual * DISCRETIONARY_CUT / wr,
                Priority::Low,
            ));
        }
    }

    sort_recommendations(&mut recs);
    recs
}

/// Compute every FIRE figure. Callers go through [`validate`] first.
pub fn calculate(params: &FireParams) -> Result<FireResult> {
    let annual = annual_expenses(params)?;
    let wr = params.withdrawal_rate;
    let base = annual / wr;
    let adjusted = ensure_finite(
        OPERATION,
        "adjusted fire number",
        base * params.cost_of_living_multiplier * (1.0 + params.safety_margin),
    )?;

    let variants = FireVariants {
        lean: base * LEAN_MULTIPLIER,
        fat: base * FAT_MULTIPLIER,
        coast: base * COAST_MULTIPLIER,
        barista: base * BARISTA_MULTIPLIER,
    };

    let category_breakdown = category_breakdown(params);
    let healthcare = params.healthcare.as_ref().map(healthcare_bridge);

    let social_security = params.social_security.as_ref().map(|ss| {
        // Without a current age the benefit is treated as already payable
        let years_until_benefit = params
            .current_age
            .map_or(0, |age| ss.start_age.saturating_sub(age));
        let present_value_annual_benefit = ss.monthly_benefit * 12.0
            / (1.0 + SOCIAL_SECURITY_DISCOUNT_RATE).powi(years_until_benefit as i32);
        SocialSecurityOffset {
            years_until_benefit,
            present_value_annual_benefit,
            fire_reduction: present_value_annual_benefit / wr,
        }
    });

    let total_fire_number = (adjusted
        + healthcare.map_or(0.0, |h| h.total_cost)
        - social_security.map_or(0.0, |s| s.fire_reduction))
    .max(0.0);

    let coast_fire_present_value = years_until_retirement(params)
        .map(|years| adjusted / (1.0 + params.expected_return).powi(years as i32));

    let scenarios = if params.stress_scenarios.is_empty() {
        default_stress_scenarios()
    } else {
        params.stress_scenarios.clone()
    };
    let stress_tests = scenarios
        .iter()
        .map(|s| stress_test(s, params, annual, adjusted))
        .collect();

    let recommendations = recommendations(params, annual, base, category_breakdown.as_ref());

    Ok(FireResult {
        annual_expenses: annual,
        base_fire_number: base,
        adjusted_fire_number: adjusted,
        total_fire_number,
        variants,
        category_breakdown,
        healthcare,
        social_security,
        coast_fire_present_value,
        years_to_fire: years_to_fire(params, total_fire_number),
        stress_tests,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpenseCategory, SocialSecurityProfile};

    fn params(annual: f64) -> FireParams {
        FireParams {
            annual_expenses: Some(annual),
            ..FireParams::default()
        }
    }

    #[test]
    fn test_base_and_adjusted_numbers() {
        let result = calculate(&params(40_000.0)).unwrap();
        assert!((result.base_fire_number - 1_000_000.0).abs() < 1e-6);
        assert!((result.adjusted_fire_number - 1_100_000.0).abs() < 1e-6);
        assert!((result.variants.lean - 700_000.0).abs() < 1e-6);
        assert!((result.variants.fat - 2_000_000.0).abs() < 1e-6);
        assert!((result.variants.coast - 600_000.0).abs() < 1e-6);
        assert!((result.variants.barista - 500_000.0).abs() < 1e-6);
        assert_eq!(result.total_fire_number, result.adjusted_fire_number);
    }

    #[test]
    fn test_expense_source_precedence() {
        let mut p = FireParams {
            monthly_expenses: Some(3_000.0),
            ..FireParams::default()
        };
        assert_eq!(annual_expenses(&p).unwrap(), 36_000.0);
        // Monthly wins when both are given
        p.annual_expenses = Some(50_000.0);
        assert_eq!(annual_expenses(&p).unwrap(), 36_000.0);
        p.monthly_expenses = Some(0.0);
        assert_eq!(annual_expenses(&p).unwrap(), 50_000.0);
        p.monthly_expenses = None;
        assert_eq!(annual_expenses(&p).unwrap(), 50_000.0);

        let p = FireParams {
            expense_categories: vec![
                ExpenseCategory {
                    name: "rent".into(),
                    monthly_amount: 1_500.0,
                    inflation_rate: 0.03,
                    essential: true,
                },
                ExpenseCategory {
                    name: "travel".into(),
                    monthly_amount: 500.0,
                    inflation_rate: 0.03,
                    essential: false,
                },
            ],
            ..FireParams::default()
        };
        assert_eq!(annual_expenses(&p).unwrap(), 24_000.0);
    }

    #[test]
    fn test_doubling_cost_of_living_doubles_adjusted() {
        let one = calculate(&params(30_000.0)).unwrap();
        let mut p = params(30_000.0);
        p.cost_of_living_multiplier = 2.0;
        let two = calculate(&p).unwrap();
        assert!((two.adjusted_fire_number - 2.0 * one.adjusted_fire_number).abs() < 1e-6);
        assert_eq!(two.base_fire_number, one.base_fire_number);
    }

    #[test]
    fn test_healthcare_and_social_security_adjust_total() {
        let mut p = params(40_000.0);
        p.current_age = Some(40);
        p.healthcare = Some(HealthcareProfile {
            monthly_premium: 500.0,
            annual_out_of_pocket: 2_000.0,
            inflation_rate: 0.05,
            coverage_gap_years: 10,
        });
        p.social_security = Some(SocialSecurityProfile {
            monthly_benefit: 2_000.0,
            start_age: 67,
        });
        let result = calculate(&p).unwrap();

        let hc = result.healthcare.unwrap();
        assert_eq!(hc.annual_cost, 8_000.0);
        assert!((hc.total_cost - 80_000.0 * 1.05_f64.powi(5)).abs() < 1e-6);

        let ss = result.social_security.unwrap();
        assert_eq!(ss.years_until_benefit, 27);
        let pv = 24_000.0 / 1.03_f64.powi(27);
        assert!((ss.fire_reduction - pv / 0.04).abs() < 1e-6);

        let expected = 1_100_000.0 + hc.total_cost - ss.fire_reduction;
        assert!((result.total_fire_number - expected).abs() < 1e-6);
        assert_eq!(
            dependency_tags(&p),
            vec!["expenses", "healthcare", "social_security"]
        );
    }

    #[test]
    fn test_total_is_floored_at_zero() {
        let mut p = params(1_000.0);
        p.social_security = Some(SocialSecurityProfile {
            monthly_benefit: 5_000.0,
            start_age: 62,
        });
        let result = calculate(&p).unwrap();
        assert_eq!(result.total_fire_number, 0.0);
        assert_eq!(result.years_to_fire, Some(0.0));
    }

    #[test]
    fn test_default_stress_scenarios() {
        let result = calculate(&params(40_000.0)).unwrap();
        assert_eq!(result.stress_tests.len(), 3);
        let downturn = &result.stress_tests[0];
        assert_eq!(downturn.scenario, "Market downturn");
        assert!((downturn.adjusted_withdrawal_rate - 0.03).abs() < 1e-12);
        assert!((downturn.increase_pct - 100.0 / 3.0).abs() < 1e-6);
        assert_eq!(downturn.risk, RiskLevel::Medium);
        assert!(result.stress_tests.iter().all(|s| s.fire_number > result.adjusted_fire_number));
    }

    #[test]
    fn test_severe_scenario_is_high_risk() {
        let mut p = params(40_000.0);
        p.stress_scenarios = vec![StressScenario {
            name: "Crash".into(),
            market_return_change: -0.99,
            inflation_change: 0.0,
            expense_change: 0.0,
        }];
        let result = calculate(&p).unwrap();
        let crash = &result.stress_tests[0];
        // Floored at 1%
        assert_eq!(crash.adjusted_withdrawal_rate, 0.01);
        assert_eq!(crash.risk, RiskLevel::High);
    }

    #[test]
    fn test_coast_and_years_to_fire() {
        let mut p = params(40_000.0);
        p.current_age = Some(30);
        p.retirement_age = Some(50);
        p.current_savings = 100_000.0;
        p.annual_savings = 50_000.0;
        let result = calculate(&p).unwrap();
        let coast = result.coast_fire_present_value.unwrap();
        assert!((coast - 1_100_000.0 / 1.07_f64.powi(20)).abs() < 1e-6);
        let years = result.years_to_fire.unwrap();
        assert!(years > 5.0 && years < 20.0, "got {years}");

        p.current_savings = 0.0;
        p.annual_savings = 0.0;
        assert_eq!(calculate(&p).unwrap().years_to_fire, None);
    }

    #[test]
    fn test_unvalidated_ages_do_not_underflow() {
        let mut p = params(40_000.0);
        p.current_age = Some(50);
        p.retirement_age = Some(45);
        let result = calculate(&p).unwrap();
        assert_eq!(
            result.coast_fire_present_value,
            Some(result.adjusted_fire_number)
        );
    }

    #[test]
    fn test_recommendations() {
        let mut p = params(40_000.0);
        p.withdrawal_rate = 0.05;
        p.safety_margin = 0.0;
        let result = calculate(&p).unwrap();
        let categories: Vec<_> = result
            .recommendations
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(categories[0], "withdrawal_rate");
        assert!(categories.contains(&"healthcare"));
        assert!(categories.contains(&"safety_margin"));
        assert!((result.recommendations[0].impact - 200_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            validate(&FireParams::default()).unwrap_err().field(),
            Some("expenses")
        );
        assert!(validate(&params(0.0)).is_err());

        let mut p = params(40_000.0);
        p.monthly_expenses = Some(-100.0);
        assert_eq!(validate(&p).unwrap_err().field(), Some("monthly_expenses"));
        p.monthly_expenses = Some(f64::NAN);
        assert_eq!(validate(&p).unwrap_err().field(), Some("monthly_expenses"));
        let p = FireParams {
            monthly_expenses: Some(3_000.0),
            annual_expenses: Some(-1.0),
            ..FireParams::default()
        };
        assert_eq!(validate(&p).unwrap_err().field(), Some("annual_expenses"));

        let mut p = params(40_000.0);
        p.withdrawal_rate = 0.0;
        assert_eq!(validate(&p).unwrap_err().field(), Some("withdrawal_rate"));
        p.withdrawal_rate = 1.5;
        assert!(validate(&p).is_err());

        let mut p = params(40_000.0);
        p.cost_of_living_multiplier = 0.0;
        assert!(validate(&p).is_err());

        let mut p = params(40_000.0);
        p.current_age = Some(50);
        p.retirement_age = Some(45);
        assert_eq!(validate(&p).unwrap_err().field(), Some("retirement_age"));

        let mut p = params(40_000.0);
        p.healthcare = Some(HealthcareProfile {
            monthly_premium: 100.0,
            annual_out_of_pocket: 0.0,
            inflation_rate: 0.05,
            coverage_gap_years: 0,
        });
        assert_eq!(
            validate(&p).unwrap_err().field(),
            Some("healthcare.coverage_gap_years")
        );

        assert!(validate(&params(40_000.0)).is_ok());
    }
}

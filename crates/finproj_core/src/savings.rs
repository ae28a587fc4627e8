//! Savings-rate optimisation across prioritised goals
//!
//! Each goal is sized into a required monthly contribution. Goals are ranked
//! by priority and achievability and funded greedily from the monthly savings
//! capacity. Flexible goals are stretched when the total does not fit.

use jiff::ToSpan;
use jiff::civil::Date;
use jiff::{Unit, Zoned};
use rustc_hash::FxHashSet;

use crate::error::{EngineError, Result, ensure_finite};
use crate::finance_math::{Timing, future_value_annuity, required_payment};
use crate::model::{
    BudgetAdjustment, Ease, Goal, GoalAllocation, IncomeStrategy, Milestone,
    OptimizationPreferences, Priority, Recommendation, SavingsPlanParams, SavingsPlanResult,
    SavingsScenario, TimelineSummary, sort_recommendations,
};
use crate::validation::{
    require_in_range, require_non_empty, require_non_negative, require_positive,
    require_rate_above_total_loss,
};

const OPERATION: &str = "savings plan";

const MAX_EXTENSION_FACTOR: f64 = 2.0;
/// Goals needing longer than this at their allocation never complete
const MAX_PLAN_MONTHS: u32 = 1200;
const MILESTONE_INTERVAL: u32 = 3;
const MILESTONE_HORIZON: u32 = 24;
const DISCRETIONARY_CUT: f64 = 0.20;
const ESSENTIAL_CUT: f64 = 0.05;
/// Allocations within half a cent of the requirement count as fully funded
const FUNDING_TOLERANCE: f64 = 0.005;
const TARGET_SAVINGS_RATE: f64 = 0.15;

/// `params.as_of`, or today in the system time zone
#[must_use]
pub fn as_of(params: &SavingsPlanParams) -> Date {
    params.as_of.unwrap_or_else(|| Zoned::now().date())
}

pub fn validate(params: &SavingsPlanParams) -> Result<()> {
    let today = as_of(params);
    require_non_empty("goals", &params.goals)?;
    let mut seen = FxHashSet::default();
    for goal in &params.goals {
        if !seen.insert(&goal.id) {
            return Err(EngineError::invalid(
                "goals.id",
                format!("duplicate goal id {}", goal.id),
            ));
        }
        require_positive("goals.target_amount", goal.target_amount)?;
        require_non_negative("goals.current_progress", goal.current_progress)?;
        if goal.target_date <= today {
            return Err(EngineError::invalid(
                "goals.target_date",
                format!(
                    "goal {} is due {} which is not after {today}",
                    goal.id, goal.target_date
                ),
            ));
        }
    }

    require_positive("monthly_income", params.monthly_income)?;
    require_non_negative("monthly_expenses", params.monthly_expenses)?;
    require_non_negative("current_savings", params.current_savings)?;
    if let Some(growth) = &params.income_growth {
        require_rate_above_total_loss("income_growth.annual_rate", growth.annual_rate)?;
    }

    let c = &params.constraints;
    require_in_range("constraints.max_savings_rate", c.max_savings_rate, 0.0, 1.0)?;
    require_non_negative("constraints.essential_expense_ratio", c.essential_expense_ratio)?;
    if c.essential_expense_ratio > 1.0 {
        return Err(EngineError::invalid(
            "constraints.essential_expense_ratio",
            format!("must be at most 1.0, got {}", c.essential_expense_ratio),
        ));
    }
    require_non_negative("constraints.emergency_fund_months", c.emergency_fund_months)?;

    require_rate_above_total_loss("preferences.inflation_rate", params.preferences.inflation_rate)?;
    require_rate_above_total_loss(
        "preferences.expected_return",
        params.preferences.expected_return,
    )?;
    for category in &params.expense_categories {
        require_non_negative("expense_categories.monthly_amount", category.monthly_amount)?;
    }
    Ok(())
}

pub(crate) fn dependency_tags(params: &SavingsPlanParams) -> Vec<String> {
    std::iter::once("income".to_string())
        .chain(params.goals.iter().map(|g| format!("goal:{}", g.id)))
        .collect()
}

/// Whole months from `from` to `to`, partial months rounded up, at least one
pub fn months_between(from: Date, to: Date) -> Result<u32> {
    let span = from
        .until((Unit::Month, to))
        .map_err(|e| EngineError::computation(OPERATION, e))?;
    let months = span.get_months() + i32::from(span.get_days() > 0);
    Ok(months.max(1) as u32)
}

fn add_months(date: Date, months: u32) -> Result<Date> {
    date.checked_add(i64::from(months).months())
        .map_err(|e| EngineError::computation(OPERATION, e))
}

/// Months of `payment` deposits needed to reach `target`, if within the plan horizon
fn months_to_accumulate(target: f64, payment: f64, monthly_rate: f64) -> Option<u32> {
    if target <= 0.0 {
        return Some(0);
    }
    if payment <= 0.0 {
        return None;
    }
    let months = if monthly_rate == 0.0 {
        target / payment
    } else {
        (1.0 + target * monthly_rate / payment).ln() / (1.0 + monthly_rate).ln()
    };
    (months.is_finite() && months <= f64::from(MAX_PLAN_MONTHS)).then(|| months.ceil() as u32)
}

/// A goal sized for a given number of months
#[derive(Debug, Clone)]
struct GoalPlan<'a> {
    goal: &'a Goal,
    original_months: u32,
    months: u32,
    adjusted_target: f64,
    required: f64,
    achievability: f64,
}

impl GoalPlan<'_> {
    fn timeline_extended(&self) -> bool {
        self.months > self.original_months
    }
}

fn size_goal<'a>(
    goal: &'a Goal,
    original_months: u32,
    months: u32,
    prefs: &OptimizationPreferences,
    max_possible: f64,
) -> Result<GoalPlan<'a>> {
    let remaining = (goal.target_amount - goal.current_progress).max(0.0);
    let adjusted_target = if prefs.adjust_for_inflation {
        remaining * (1.0 + prefs.inflation_rate).powf(f64::from(months) / 12.0)
    } else {
        remaining
    };
    let required = if adjusted_target > 0.0 {
        required_payment(adjusted_target, prefs.expected_return / 12.0, f64::from(months))?
    } else {
        0.0
    };
    let achievability = if required > 0.0 {
        (max_possible / required * 100.0).min(100.0)
    } else {
        100.0
    };
    Ok(GoalPlan {
        goal,
        original_months,
        months,
        adjusted_target,
        required: ensure_finite(OPERATION, "required monthly contribution", required)?,
        achievability,
    })
}

fn stretch<'a>(
    plan: &GoalPlan<'a>,
    factor: f64,
    prefs: &OptimizationPreferences,
    max_possible: f64,
) -> Result<GoalPlan<'a>> {
    let months = (f64::from(plan.original_months) * factor).ceil() as u32;
    size_goal(plan.goal, plan.original_months, months, prefs, max_possible)
}

/// How one goal fares under a monthly budget
#[derive(Debug, Clone, Copy)]
struct Funding {
    allocated: f64,
    on_track: bool,
    /// Months until the goal is reached at the allocated rate
    months_to_complete: Option<u32>,
}

fn fund(plans: &[GoalPlan<'_>], budget: f64, monthly_rate: f64) -> Vec<Funding> {
    let mut remaining = budget.max(0.0);
    plans
        .iter()
        .map(|plan| {
            let allocated = plan.required.min(remaining);
            remaining -= allocated;
            let on_track = allocated >= plan.required - FUNDING_TOLERANCE;
            let months_to_complete = if on_track {
                Some(if plan.required > 0.0 { plan.months } else { 0 })
            } else {
                months_to_accumulate(plan.adjusted_target, allocated, monthly_rate)
            };
            Funding {
                allocated,
                on_track,
                months_to_complete,
            }
        })
        .collect()
}

/// Months a funded goal keeps drawing contributions
fn active_months(funding: &Funding) -> u32 {
    if funding.allocated <= 0.0 {
        0
    } else {
        funding.months_to_complete.unwrap_or(MAX_PLAN_MONTHS)
    }
}

fn income_in_year(params: &SavingsPlanParams, year: u32) -> f64 {
    let growth = params.income_growth.map_or(0.0, |g| g.annual_rate);
    params.monthly_income * (1.0 + growth).powi(year as i32)
}

fn budget_adjustments(params: &SavingsPlanParams) -> Vec<BudgetAdjustment> {
    let adjustment = |category: &str, current_monthly: f64, essential: bool| BudgetAdjustment {
        category: category.to_string(),
        current_monthly,
        suggested_reduction: current_monthly
            * if essential {
                ESSENTIAL_CUT
            } else {
                DISCRETIONARY_CUT
            },
        ease: if essential { Ease::Hard } else { Ease::Easy },
    };

    let mut adjustments: Vec<BudgetAdjustment> = if params.expense_categories.is_empty() {
        let essential = params.monthly_expenses * params.constraints.essential_expense_ratio;
        vec![
            adjustment("essential", essential, true),
            adjustment("discretionary", params.monthly_expenses - essential, false),
        ]
    } else {
        params
            .expense_categories
            .iter()
            .map(|c| adjustment(&c.name, c.monthly_amount, c.essential))
            .collect()
    };
    adjustments.retain(|a| a.suggested_reduction > 0.0);
    adjustments.sort_by(|a, b| {
        a.ease
            .cmp(&b.ease)
            .then_with(|| b.suggested_reduction.total_cmp(&a.suggested_reduction))
    });
    adjustments
}

fn income_optimizations(monthly_income: f64) -> Vec<IncomeStrategy> {
    [
        (
            "raise_negotiation",
            "Negotiate a raise at the next review",
            0.6,
            0.05,
        ),
        (
            "side_income",
            "Take on freelance or part-time work",
            0.5,
            0.10,
        ),
        (
            "certification",
            "Earn a certification that commands higher pay",
            0.4,
            0.08,
        ),
        (
            "job_change",
            "Move to a better-paying role",
            0.3,
            0.15,
        ),
    ]
    .into_iter()
    .map(|(strategy, description, probability, share)| IncomeStrategy {
        strategy: strategy.to_string(),
        description: description.to_string(),
        probability,
        monthly_impact: monthly_income * share,
    })
    .collect()
}

fn timeline(
    params: &SavingsPlanParams,
    allocations: &[GoalAllocation],
    fundings: &[Funding],
) -> TimelineSummary {
    let completions = allocations.iter().filter_map(|a| a.projected_completion);
    let earliest_completion = completions.clone().min();
    let latest_completion = completions.max();

    let horizon_months = fundings.iter().map(active_months).max().unwrap_or(0);
    let years = horizon_months.div_ceil(12);
    let rates: Vec<f64> = (0..years)
        .map(|year| {
            let committed: f64 = fundings
                .iter()
                .filter(|f| active_months(f) > year * 12)
                .map(|f| f.allocated)
                .sum();
            committed / income_in_year(params, year)
        })
        .collect();

    TimelineSummary {
        earliest_completion,
        latest_completion,
        peak_savings_rate: rates.iter().copied().fold(0.0, f64::max),
        average_savings_rate: if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        },
    }
}

fn scenario(name: &str, plans: &[GoalPlan<'_>], budget: f64, params: &SavingsPlanParams) -> SavingsScenario {
    let fundings = fund(plans, budget, params.preferences.expected_return / 12.0);
    let monthly_savings: f64 = fundings.iter().map(|f| f.allocated).sum();
    let completions: Vec<u32> = fundings.iter().filter_map(|f| f.months_to_complete).collect();
    SavingsScenario {
        name: name.to_string(),
        monthly_savings,
        savings_rate: monthly_savings / params.monthly_income,
        goals_on_track: fundings.iter().filter(|f| f.on_track).count(),
        average_months_to_complete: if completions.is_empty() {
            0.0
        } else {
            completions.iter().map(|m| f64::from(*m)).sum::<f64>() / completions.len() as f64
        },
    }
}

fn milestones(
    params: &SavingsPlanParams,
    as_of: Date,
    fundings: &[Funding],
) -> Result<Vec<Milestone>> {
    let monthly_rate = params.preferences.expected_return / 12.0;
    (MILESTONE_INTERVAL..=MILESTONE_HORIZON)
        .step_by(MILESTONE_INTERVAL as usize)
        .map(|month| {
            let mut cumulative_saved = 0.0;
            for f in fundings {
                let paying = f64::from(active_months(f).min(month));
                cumulative_saved += future_value_annuity(f.allocated, monthly_rate, paying, Timing::End)?;
            }
            Ok(Milestone {
                month,
                date: add_months(as_of, month)?,
                cumulative_saved,
                goals_completed: fundings
                    .iter()
                    .filter(|f| f.months_to_complete.is_some_and(|m| m <= month))
                    .count(),
                projected_monthly_income: income_in_year(params, month / 12),
            })
        })
        .collect()
}

fn recommendations(
    params: &SavingsPlanParams,
    total_required: f64,
    total_allocated: f64,
    max_possible: f64,
    emergency_fund_gap: f64,
    extended_goals: usize,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    let shortfall = total_required - total_allocated;
    if shortfall > FUNDING_TOLERANCE {
        recs.push(Recommendation::new(
            "shortfall",
            format!(
                "Goals need {total_required:.2} a month but at most {max_possible:.2} can be saved; raise income, trim spending or move deadlines"
            ),
            shortfall,
            Priority::High,
        ));
    }

    if emergency_fund_gap > 0.0 {
        recs.push(Recommendation::new(
            "emergency_fund",
            format!(
                "Build an emergency fund of {:.0} months of expenses before funding other goals",
                params.constraints.emergency_fund_months
            ),
            emergency_fund_gap,
            Priority::High,
        ));
    }

    let free_cash = params.monthly_income - params.monthly_expenses;
    if free_cash < total_allocated {
        recs.push(Recommendation::new(
            "cash_flow",
            "Planned savings exceed income after expenses; current spending cannot support this plan",
            total_allocated - free_cash,
            Priority::High,
        ));
    }

    let rate = total_allocated / params.monthly_income;
    if rate < TARGET_SAVINGS_RATE && max_possible >= params.monthly_income * TARGET_SAVINGS_RATE {
        recs.push(Recommendation::new(
            "savings_rate",
            format!(
                "Saving {:.1}% of income; 15% builds long-term wealth faster",
                rate * 100.0
            ),
            params.monthly_income * TARGET_SAVINGS_RATE - total_allocated,
            Priority::Low,
        ));
    }

    if extended_goals > 0 {
        recs.push(Recommendation::new(
            "timeline",
            format!("{extended_goals} flexible goal(s) were pushed back to fit the budget"),
            0.0,
            Priority::Medium,
        ));
    }

    sort_recommendations(&mut recs);
    recs
}

/// Build the allocation plan. Callers go through [`validate`] first.
pub fn calculate(params: &SavingsPlanParams) -> Result<SavingsPlanResult> {
    let as_of = as_of(params);
    let prefs = &params.preferences;
    let monthly_rate = prefs.expected_return / 12.0;
    let max_possible = params.monthly_income * params.constraints.max_savings_rate;

    let mut plans = params
        .goals
        .iter()
        .map(|goal| {
            let months = months_between(as_of, goal.target_date)?;
            size_goal(goal, months, months, prefs, max_possible)
        })
        .collect::<Result<Vec<_>>>()?;

    // Stable, so equal priority and achievability keep input order
    plans.sort_by(|a, b| {
        b.goal
            .priority
            .cmp(&a.goal.priority)
            .then_with(|| b.achievability.total_cmp(&a.achievability))
    });

    let original_total: f64 = plans.iter().map(|p| p.required).sum();
    if original_total > max_possible {
        let factor = (original_total / max_possible).clamp(1.0, MAX_EXTENSION_FACTOR);
        for plan in plans.iter_mut().filter(|p| p.goal.is_flexible) {
            *plan = stretch(plan, factor, prefs, max_possible)?;
        }
    }

    let fundings = fund(&plans, max_possible, monthly_rate);
    let allocations = plans
        .iter()
        .zip(&fundings)
        .map(|(plan, funding)| {
            let projected_completion = funding
                .months_to_complete
                .map(|m| add_months(as_of, m))
                .transpose()?;
            Ok(GoalAllocation {
                goal_id: plan.goal.id.clone(),
                name: plan.goal.name.clone(),
                priority: plan.goal.priority,
                original_months: plan.original_months,
                months_to_target: plan.months,
                adjusted_target: plan.adjusted_target,
                required_monthly: plan.required,
                allocated_monthly: funding.allocated,
                achievability_score: plan.achievability,
                timeline_extended: plan.timeline_extended(),
                projected_completion,
                on_track: funding.on_track,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let total_required_monthly: f64 = plans.iter().map(|p| p.required).sum();
    let total_allocated_monthly: f64 = fundings.iter().map(|f| f.allocated).sum();
    let shortfall = (total_required_monthly - total_allocated_monthly).max(0.0);
    let emergency_fund_gap = (params.constraints.emergency_fund_months * params.monthly_expenses
        - params.current_savings)
        .max(0.0);

    let aggressive_budget = (max_possible * 1.25)
        .min((params.monthly_income - params.monthly_expenses).max(0.0));
    let flexible_plans = plans
        .iter()
        .map(|p| stretch(p, MAX_EXTENSION_FACTOR, prefs, max_possible))
        .collect::<Result<Vec<_>>>()?;
    let scenarios = vec![
        scenario("conservative", &plans, max_possible * 0.75, params),
        scenario("moderate", &plans, max_possible, params),
        scenario("aggressive", &plans, aggressive_budget, params),
        scenario("flexible", &flexible_plans, max_possible, params),
    ];

    let extended_goals = allocations.iter().filter(|a| a.timeline_extended).count();

    Ok(SavingsPlanResult {
        as_of,
        timeline: timeline(params, &allocations, &fundings),
        milestones: milestones(params, as_of, &fundings)?,
        recommendations: recommendations(
            params,
            total_required_monthly,
            total_allocated_monthly,
            max_possible,
            emergency_fund_gap,
            extended_goals,
        ),
        allocations,
        total_required_monthly,
        max_possible_monthly: max_possible,
        total_allocated_monthly,
        shortfall,
        feasible: shortfall <= FUNDING_TOLERANCE,
        savings_rate: total_allocated_monthly / params.monthly_income,
        emergency_fund_gap,
        budget_adjustments: budget_adjustments(params),
        income_optimizations: income_optimizations(params.monthly_income),
        scenarios,
    })
}

//! Savings-rate and goal allocation parameters and results

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::common::{Priority, Recommendation};
use super::ids::GoalId;

fn default_max_savings_rate() -> f64 {
    0.5
}

fn default_essential_ratio() -> f64 {
    0.6
}

fn default_emergency_months() -> f64 {
    6.0
}

fn default_true() -> bool {
    true
}

fn default_inflation() -> f64 {
    0.03
}

fn default_savings_return() -> f64 {
    0.04
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_progress: f64,
    pub target_date: Date,
    #[serde(default)]
    pub priority: Priority,
    /// Whether the deadline may slip when the budget is short
    #[serde(default)]
    pub is_flexible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeGrowth {
    pub annual_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetConstraints {
    #[serde(default = "default_max_savings_rate")]
    pub max_savings_rate: f64,
    /// Share of expenses considered essential when no category list is given
    #[serde(default = "default_essential_ratio")]
    pub essential_expense_ratio: f64,
    #[serde(default = "default_emergency_months")]
    pub emergency_fund_months: f64,
}

impl Default for BudgetConstraints {
    fn default() -> Self {
        Self {
            max_savings_rate: default_max_savings_rate(),
            essential_expense_ratio: default_essential_ratio(),
            emergency_fund_months: default_emergency_months(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPreferences {
    #[serde(default = "default_true")]
    pub adjust_for_inflation: bool,
    #[serde(default = "default_inflation")]
    pub inflation_rate: f64,
    /// Annual return earned on money set aside for goals
    #[serde(default = "default_savings_return")]
    pub expected_return: f64,
}

impl Default for OptimizationPreferences {
    fn default() -> Self {
        Self {
            adjust_for_inflation: true,
            inflation_rate: default_inflation(),
            expected_return: default_savings_return(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingCategory {
    pub name: String,
    pub monthly_amount: f64,
    #[serde(default)]
    pub essential: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPlanParams {
    /// Valuation date; `None` resolves to today before validation
    #[serde(default)]
    pub as_of: Option<Date>,
    pub current_age: u32,
    pub monthly_income: f64,
    #[serde(default)]
    pub current_savings: f64,
    pub monthly_expenses: f64,
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub income_growth: Option<IncomeGrowth>,
    #[serde(default)]
    pub constraints: BudgetConstraints,
    #[serde(default)]
    pub preferences: OptimizationPreferences,
    #[serde(default)]
    pub expense_categories: Vec<SpendingCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAllocation {
    pub goal_id: GoalId,
    pub name: String,
    pub priority: Priority,
    pub original_months: u32,
    pub months_to_target: u32,
    /// Remaining amount after inflation adjustment
    pub adjusted_target: f64,
    pub required_monthly: f64,
    pub allocated_monthly: f64,
    pub achievability_score: f64,
    pub timeline_extended: bool,
    /// `None` when nothing could be allocated
    pub projected_completion: Option<Date>,
    pub on_track: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Easy,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAdjustment {
    pub category: String,
    pub current_monthly: f64,
    pub suggested_reduction: f64,
    pub ease: Ease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStrategy {
    pub strategy: String,
    pub description: String,
    pub probability: f64,
    pub monthly_impact: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub earliest_completion: Option<Date>,
    pub latest_completion: Option<Date>,
    pub peak_savings_rate: f64,
    pub average_savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsScenario {
    pub name: String,
    pub monthly_savings: f64,
    pub savings_rate: f64,
    pub goals_on_track: usize,
    pub average_months_to_complete: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub month: u32,
    pub date: Date,
    pub cumulative_saved: f64,
    pub goals_completed: usize,
    pub projected_monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPlanResult {
    pub as_of: Date,
    /// Goals in allocation order
    pub allocations: Vec<GoalAllocation>,
    pub total_required_monthly: f64,
    pub max_possible_monthly: f64,
    pub total_allocated_monthly: f64,
    pub shortfall: f64,
    pub feasible: bool,
    pub savings_rate: f64,
    pub emergency_fund_gap: f64,
    pub budget_adjustments: Vec<BudgetAdjustment>,
    pub income_optimizations: Vec<IncomeStrategy>,
    pub timeline: TimelineSummary,
    pub scenarios: Vec<SavingsScenario>,
    pub milestones: Vec<Milestone>,
    pub recommendations: Vec<Recommendation>,
}

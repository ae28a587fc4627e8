//! Parameter and result types for every calculator

mod common;
mod compound;
mod debt;
mod fire;
mod ids;
mod monte_carlo;
mod savings;

pub use common::{Priority, Recommendation, RiskLevel};
pub(crate) use common::sort_recommendations;
pub use compound::{CompoundInterestParams, CompoundInterestResult, Contribution, YearBalance};
pub use debt::{
    ConsolidationAnalysis, ConsolidationOffer, CreditScorePoint, DebtAccount, DebtPayoffParams,
    DebtPayoffResult, DebtPayoffSummary, EmergencyFundAnalysis, FinancialContext,
    FireIntegration, PayoffStrategy, ScheduleRow, StrategyComparison, StrategyOutcome,
};
pub use fire::{
    CategoryBreakdown, CategoryProjection, ExpenseCategory, FireParams, FireResult, FireVariants,
    HealthcareBridge, HealthcareProfile, SocialSecurityOffset, SocialSecurityProfile,
    StressScenario, StressTestResult,
};
pub use ids::{DebtId, GoalId};
pub use monte_carlo::{
    ConfidenceBands, ConfidenceInterval, DEFAULT_ITERATIONS, MonteCarloParams, MonteCarloResult,
    PercentileSet, YearlyProjection,
};
pub use savings::{
    BudgetAdjustment, BudgetConstraints, Ease, Goal, GoalAllocation, IncomeGrowth, IncomeStrategy,
    Milestone, OptimizationPreferences, SavingsPlanParams, SavingsPlanResult, SavingsScenario,
    SpendingCategory, TimelineSummary,
};

use serde::{Deserialize, Serialize};

/// Opaque payload stored in the result cache, one variant per calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum CalculationResult {
    CompoundInterest(CompoundInterestResult),
    MonteCarlo(MonteCarloResult),
    Fire(FireResult),
    DebtPayoff(DebtPayoffResult),
    SavingsPlan(SavingsPlanResult),
}

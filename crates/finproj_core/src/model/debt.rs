//! Debt payoff planner parameters and results

use serde::{Deserialize, Serialize};

use super::common::Recommendation;
use super::ids::DebtId;

fn default_emergency_months() -> f64 {
    3.0
}

fn default_expected_return() -> f64 {
    0.07
}

fn default_investment_horizon() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtAccount {
    pub id: DebtId,
    pub name: String,
    pub balance: f64,
    pub annual_interest_rate: f64,
    pub minimum_payment: f64,
}

impl DebtAccount {
    #[must_use]
    pub fn monthly_interest(&self) -> f64 {
        self.balance * self.annual_interest_rate / 12.0
    }
}

/// Order in which the extra payment pool targets debts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStrategy {
    /// Smallest balance first
    Snowball,
    /// Highest rate first
    #[default]
    Avalanche,
    /// Caller-supplied id order
    Custom(Vec<DebtId>),
}

impl PayoffStrategy {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PayoffStrategy::Snowball => "snowball",
            PayoffStrategy::Avalanche => "avalanche",
            PayoffStrategy::Custom(_) => "custom",
        }
    }
}

/// Household figures used by the extended analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialContext {
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub monthly_expenses: Option<f64>,
    #[serde(default)]
    pub emergency_fund: Option<f64>,
    #[serde(default = "default_emergency_months")]
    pub emergency_fund_target_months: f64,
    #[serde(default)]
    pub current_credit_score: Option<u32>,
    #[serde(default)]
    pub total_credit_limit: Option<f64>,
    #[serde(default = "default_expected_return")]
    pub expected_return: f64,
    #[serde(default = "default_investment_horizon")]
    pub investment_horizon_years: u32,
}

impl Default for FinancialContext {
    fn default() -> Self {
        Self {
            monthly_income: None,
            monthly_expenses: None,
            emergency_fund: None,
            emergency_fund_target_months: default_emergency_months(),
            current_credit_score: None,
            total_credit_limit: None,
            expected_return: default_expected_return(),
            investment_horizon_years: default_investment_horizon(),
        }
    }
}

/// A single new loan that would replace every debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationOffer {
    pub annual_rate: f64,
    pub term_months: u32,
    /// Fee charged up front as a fraction of the consolidated balance
    #[serde(default)]
    pub origination_fee_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoffParams {
    pub debts: Vec<DebtAccount>,
    #[serde(default)]
    pub extra_payment: f64,
    #[serde(default)]
    pub strategy: PayoffStrategy,
    #[serde(default)]
    pub context: Option<FinancialContext>,
    #[serde(default)]
    pub consolidation: Option<ConsolidationOffer>,
}

/// One debt's activity in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub debt_id: DebtId,
    pub payment: f64,
    pub principal_payment: f64,
    pub interest_payment: f64,
    pub remaining_balance: f64,
    pub is_paid_off: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoffSummary {
    pub debt_id: DebtId,
    pub name: String,
    /// Month the balance reached zero; 0 for debts that started paid off
    pub payoff_month: u32,
    pub interest_paid: f64,
    pub total_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub strategy: String,
    pub total_months: u32,
    pub total_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub snowball: StrategyOutcome,
    pub avalanche: StrategyOutcome,
    /// Chosen order with no extra payment; `None` if that plan never finishes
    pub without_extra_payment: Option<StrategyOutcome>,
    pub interest_saved_by_extra_payment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationAnalysis {
    pub total_balance: f64,
    pub monthly_payment: f64,
    pub origination_fee: f64,
    pub total_interest: f64,
    pub months: u32,
    /// Plan interest minus consolidation interest and fee; positive favours consolidating
    pub savings: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditScorePoint {
    pub month: u32,
    pub utilization: f64,
    pub projected_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireIntegration {
    /// Income left after expenses and every debt payment
    pub monthly_surplus: f64,
    /// Monthly outlay that becomes investable once debt free
    pub freed_monthly_payments: f64,
    pub debt_free_month: u32,
    pub invested_value_at_horizon: f64,
    pub debts_above_expected_return: Vec<DebtId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmergencyFundAnalysis {
    pub current_fund: f64,
    pub months_covered: f64,
    pub target_months: f64,
    pub shortfall: f64,
    pub recommended_monthly_to_fund: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoffResult {
    pub strategy: PayoffStrategy,
    pub total_months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub payoff_order: Vec<DebtPayoffSummary>,
    pub schedule: Vec<ScheduleRow>,
    pub strategy_comparison: StrategyComparison,
    pub consolidation: Option<ConsolidationAnalysis>,
    pub credit_score_projection: Vec<CreditScorePoint>,
    pub fire_integration: Option<FireIntegration>,
    pub emergency_fund: Option<EmergencyFundAnalysis>,
    pub recommendations: Vec<Recommendation>,
}

use serde::{Deserialize, Serialize};

use crate::finance_math::Timing;

/// A recurring deposit into a compounding balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub amount: f64,
    /// Deposits per year
    pub frequency: u32,
    #[serde(default)]
    pub timing: Timing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestParams {
    pub principal: f64,
    pub annual_rate: f64,
    /// Compounding periods per year
    pub compounding_frequency: u32,
    pub time_in_years: f64,
    #[serde(default)]
    pub contribution: Option<Contribution>,
}

/// Balance at a whole-year mark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearBalance {
    pub year: u32,
    pub balance: f64,
    pub contributions_to_date: f64,
    pub interest_to_date: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestResult {
    pub future_value: f64,
    pub principal: f64,
    pub total_contributions: f64,
    pub total_interest_earned: f64,
    pub effective_annual_rate: f64,
    pub yearly_breakdown: Vec<YearBalance>,
}

//! FIRE calculator parameters and results

use serde::{Deserialize, Serialize};

use super::common::{Recommendation, RiskLevel};

fn default_withdrawal_rate() -> f64 {
    0.04
}

fn default_safety_margin() -> f64 {
    0.10
}

fn default_one() -> f64 {
    1.0
}

fn default_general_inflation() -> f64 {
    0.03
}

fn default_healthcare_inflation() -> f64 {
    0.05
}

fn default_coverage_gap_years() -> u32 {
    10
}

fn default_expected_return() -> f64 {
    0.07
}

/// One line of the expense budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub name: String,
    pub monthly_amount: f64,
    #[serde(default = "default_general_inflation")]
    pub inflation_rate: f64,
    #[serde(default)]
    pub essential: bool,
}

/// Private health coverage needed between early retirement and Medicare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthcareProfile {
    pub monthly_premium: f64,
    #[serde(default)]
    pub annual_out_of_pocket: f64,
    #[serde(default = "default_healthcare_inflation")]
    pub inflation_rate: f64,
    /// Years until Medicare eligibility
    #[serde(default = "default_coverage_gap_years")]
    pub coverage_gap_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialSecurityProfile {
    pub monthly_benefit: f64,
    pub start_age: u32,
}

/// A named perturbation of the base assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    /// Relative change in market return, e.g. -0.25 for a 25% downturn
    #[serde(default)]
    pub market_return_change: f64,
    /// Extra annual inflation in percentage points, e.g. 0.05
    #[serde(default)]
    pub inflation_change: f64,
    /// Relative change in annual expenses
    #[serde(default)]
    pub expense_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireParams {
    #[serde(default)]
    pub monthly_expenses: Option<f64>,
    /// Used when `monthly_expenses` is absent or zero
    #[serde(default)]
    pub annual_expenses: Option<f64>,
    #[serde(default = "default_withdrawal_rate")]
    pub withdrawal_rate: f64,
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,
    #[serde(default = "default_one")]
    pub cost_of_living_multiplier: f64,
    #[serde(default)]
    pub expense_categories: Vec<ExpenseCategory>,
    #[serde(default)]
    pub healthcare: Option<HealthcareProfile>,
    #[serde(default)]
    pub social_security: Option<SocialSecurityProfile>,
    /// Empty means the default downturn / inflation / recession set
    #[serde(default)]
    pub stress_scenarios: Vec<StressScenario>,
    #[serde(default)]
    pub current_age: Option<u32>,
    #[serde(default)]
    pub retirement_age: Option<u32>,
    #[serde(default)]
    pub current_savings: f64,
    #[serde(default)]
    pub annual_savings: f64,
    #[serde(default = "default_expected_return")]
    pub expected_return: f64,
}

impl Default for FireParams {
    fn default() -> Self {
        Self {
            monthly_expenses: None,
            annual_expenses: None,
            withdrawal_rate: default_withdrawal_rate(),
            safety_margin: default_safety_margin(),
            cost_of_living_multiplier: 1.0,
            expense_categories: Vec::new(),
            healthcare: None,
            social_security: None,
            stress_scenarios: Vec::new(),
            current_age: None,
            retirement_age: None,
            current_savings: 0.0,
            annual_savings: 0.0,
            expected_return: default_expected_return(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireVariants {
    pub lean: f64,
    pub fat: f64,
    pub coast: f64,
    pub barista: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProjection {
    pub name: String,
    pub annual_amount: f64,
    /// Annual amount inflated at the category's own rate to retirement
    pub projected_annual_amount: f64,
    pub essential: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryProjection>,
    pub essential_annual: f64,
    pub discretionary_annual: f64,
    pub essential_only_fire_number: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthcareBridge {
    pub annual_cost: f64,
    pub coverage_gap_years: u32,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialSecurityOffset {
    pub years_until_benefit: u32,
    pub present_value_annual_benefit: f64,
    pub fire_reduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    pub scenario: String,
    pub adjusted_withdrawal_rate: f64,
    pub adjusted_annual_expenses: f64,
    pub fire_number: f64,
    /// Percentage increase over the adjusted FIRE number
    pub increase_pct: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireResult {
    pub annual_expenses: f64,
    pub base_fire_number: f64,
    pub adjusted_fire_number: f64,
    /// Adjusted number plus healthcare bridge, less the Social Security offset
    pub total_fire_number: f64,
    pub variants: FireVariants,
    pub category_breakdown: Option<CategoryBreakdown>,
    pub healthcare: Option<HealthcareBridge>,
    pub social_security: Option<SocialSecurityOffset>,
    /// Savings needed today to coast to the adjusted number by retirement age
    pub coast_fire_present_value: Option<f64>,
    pub years_to_fire: Option<f64>,
    pub stress_tests: Vec<StressTestResult>,
    pub recommendations: Vec<Recommendation>,
}

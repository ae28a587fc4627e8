use serde::{Deserialize, Serialize};

use crate::finance_math::SummaryStatistics;

/// Default number of simulated paths
pub const DEFAULT_ITERATIONS: u32 = 1000;

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloParams {
    pub initial_value: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    pub years: u32,
    pub expected_annual_return: f64,
    /// Annual standard deviation of returns
    pub annual_volatility: f64,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Used to express final values in today's dollars
    #[serde(default)]
    pub inflation_rate: Option<f64>,
    /// Fixes the random stream; an unseeded call draws a seed from the engine
    #[serde(default)]
    pub seed: Option<u64>,
    /// Reports the fraction of paths finishing at or above this value
    #[serde(default)]
    pub target_value: Option<f64>,
}

/// The fixed percentile set reported for final and yearly values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBands {
    pub p5_p95: ConfidenceInterval,
    pub p10_p90: ConfidenceInterval,
    pub p25_p75: ConfidenceInterval,
}

/// Distribution of portfolio values at the end of one simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: u32,
    pub mean: f64,
    pub percentiles: PercentileSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub iterations: u32,
    pub months: u32,
    /// Seed the paths were generated from, when generated by seed
    pub seed: Option<u64>,
    pub total_contributed: f64,
    /// Value of the same plan compounding at exactly the expected return
    pub expected_deterministic_value: f64,
    pub final_percentiles: PercentileSet,
    /// Final percentiles deflated to today's dollars
    pub real_final_percentiles: PercentileSet,
    pub confidence_bands: ConfidenceBands,
    pub statistics: SummaryStatistics,
    /// Fraction of paths ending below the total principal contributed
    pub probability_of_loss: f64,
    pub probability_of_target: Option<f64>,
    pub yearly: Vec<YearlyProjection>,
}

//! Types shared by several calculators

use serde::{Deserialize, Serialize};

/// Ordering is `Low < Medium < High`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A rule-based suggestion attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub suggestion: String,
    /// Estimated dollar impact of acting on the suggestion
    pub impact: f64,
    pub priority: Priority,
}

impl Recommendation {
    pub fn new(
        category: &str,
        suggestion: impl Into<String>,
        impact: f64,
        priority: Priority,
    ) -> Self {
        Self {
            category: category.to_string(),
            suggestion: suggestion.into(),
            impact,
            priority,
        }
    }
}

/// Most urgent first, larger impact breaking ties
pub(crate) fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.impact.total_cmp(&a.impact))
    });
}

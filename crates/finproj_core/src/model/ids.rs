//! Identifiers for caller-supplied entities
//!
//! Debts and goals arrive from the host with string identifiers; each gets
//! its own newtype so they cannot be mixed up.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a debt account supplied to the payoff planner
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebtId(pub String);

/// Identifier of a savings goal supplied to the allocator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub String);

impl fmt::Display for DebtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DebtId {
    fn from(s: &str) -> Self {
        DebtId(s.to_string())
    }
}

impl From<&str> for GoalId {
    fn from(s: &str) -> Self {
        GoalId(s.to_string())
    }
}

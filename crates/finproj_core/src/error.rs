use std::error::Error as StdError;

use crate::model::DebtId;

/// Boxed cause attached to a [`EngineError::ComputationFailure`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced by the projection engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Input invariants were violated. Raised before any computation or cache access.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameters { field: String, reason: String },

    /// The algorithm body failed on input that passed validation
    #[error("{operation} failed: {source}")]
    ComputationFailure {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// A debt's payments never cover its accruing interest
    #[error("debt {debt_id} never amortizes within {max_months} months")]
    DebtNeverAmortizes { debt_id: DebtId, max_months: u32 },

    /// Monte Carlo simulation was cancelled by the caller
    #[error("simulation cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameters {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn computation(operation: &'static str, source: impl Into<BoxError>) -> Self {
        EngineError::ComputationFailure {
            operation,
            source: source.into(),
        }
    }

    /// The offending field, for `InvalidParameters`
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::InvalidParameters { field, .. } => Some(field),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_invalid_parameters(&self) -> bool {
        matches!(self, EngineError::InvalidParameters { .. })
    }
}

/// A computed quantity came out as NaN or infinite
#[derive(Debug, Clone, thiserror::Error)]
#[error("{quantity} is not finite ({value})")]
pub struct NonFiniteValue {
    pub quantity: &'static str,
    pub value: f64,
}

/// Fail with `ComputationFailure` if `value` is NaN or infinite
pub(crate) fn ensure_finite(operation: &'static str, quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::computation(
            operation,
            NonFiniteValue { quantity, value },
        ))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Shared parameter checks used by every calculator's `validate`

use crate::error::{EngineError, Result};

pub fn require_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(EngineError::invalid(field, format!("must be finite, got {value}")));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(EngineError::invalid(
            field,
            format!("must be greater than zero, got {value}"),
        ));
    }
    Ok(())
}

/// `value` must lie in the half-open interval `(low, high]`
pub fn require_in_range(field: &str, value: f64, low: f64, high: f64) -> Result<()> {
    require_finite(field, value)?;
    if value <= low || value > high {
        return Err(EngineError::invalid(
            field,
            format!("must be in ({low}, {high}], got {value}"),
        ));
    }
    Ok(())
}

/// Rates of return may be negative but a rate at or below -100% wipes out the base
pub fn require_rate_above_total_loss(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value <= -1.0 {
        return Err(EngineError::invalid(
            field,
            format!("must be greater than -1.0, got {value}"),
        ));
    }
    Ok(())
}

pub fn require_non_empty<T>(field: &str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Err(EngineError::invalid(field, "must contain at least one entry"));
    }
    Ok(())
}

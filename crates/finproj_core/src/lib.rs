//! Personal-finance projection engine
//!
//! This crate computes long-horizon projections from a household's accounts,
//! debts, goals and assumptions:
//! - Deterministic compound growth with recurring contributions
//! - Monte Carlo outcome distributions with seedable, batched randomness
//! - FIRE numbers with variants, healthcare and Social Security adjustments, and stress tests
//! - Debt payoff schedules under snowball, avalanche or custom ordering
//! - Savings-rate optimisation across prioritised goals
//!
//! Every calculator is a pure function (`compound::calculate`, ...). The
//! [`FinanceEngine`] facade adds validation, a TTL result cache with
//! tag-based invalidation, and performance sampling on top.
//!
//! ```ignore
//! use finproj_core::{CompoundInterestParams, FinanceEngine};
//!
//! let engine = FinanceEngine::default();
//! let result = engine.calculate_compound_interest(&CompoundInterestParams {
//!     principal: 1_000.0,
//!     annual_rate: 0.05,
//!     compounding_frequency: 12,
//!     time_in_years: 10.0,
//!     contribution: None,
//! })?;
//! assert!((result.future_value - 1647.01).abs() < 0.01);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod finance_math;
pub mod metrics;
pub mod validation;

// ============================================================================
// Calculators
// ============================================================================

pub mod compound;
pub mod debt_payoff;
pub mod fire;
pub mod monte_carlo;
pub mod savings;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cache::{CacheStats, ResultCache};
pub use config::EngineConfig;
pub use engine::{Calculation, FinanceEngine};
pub use error::{EngineError, Result};
pub use finance_math::{SummaryStatistics, Timing};
pub use metrics::{Complexity, PerformanceSample, PerformanceStats};
pub use model::*;
pub use monte_carlo::SimulationProgress;

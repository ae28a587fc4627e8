//! The `FinanceEngine` facade
//!
//! Every calculator call runs the same pipeline: validate, build the cache
//! key, consult the cache, compute on a miss, store successful results with
//! their dependency tags, and record a performance sample.

use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::cache::{CacheStats, ResultCache, cache_key};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::metrics::{PerformanceRecorder, PerformanceSample, PerformanceStats};
use crate::model::{
    CalculationResult, CompoundInterestParams, CompoundInterestResult, DebtPayoffParams,
    DebtPayoffResult, FireParams, FireResult, MonteCarloParams, MonteCarloResult,
    SavingsPlanParams, SavingsPlanResult,
};
use crate::monte_carlo::SimulationProgress;
use crate::{compound, debt_payoff, fire, monte_carlo, savings};

/// A parameter set the engine knows how to validate, key, tag and cache
pub trait Calculation: Serialize {
    /// Calculator name used in cache keys and performance samples
    const NAME: &'static str;
    type Output: Clone;

    fn validate(&self) -> Result<()>;

    fn dependency_tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// The `n` in the calculator's complexity label
    fn input_size(&self) -> usize;

    fn into_cached(output: Self::Output) -> CalculationResult;

    fn from_cached(cached: CalculationResult) -> Option<Self::Output>;
}

impl Calculation for CompoundInterestParams {
    const NAME: &'static str = "compound_interest";
    type Output = CompoundInterestResult;

    fn validate(&self) -> Result<()> {
        compound::validate(self)
    }

    fn input_size(&self) -> usize {
        1
    }

    fn into_cached(output: Self::Output) -> CalculationResult {
        CalculationResult::CompoundInterest(output)
    }

    fn from_cached(cached: CalculationResult) -> Option<Self::Output> {
        match cached {
            CalculationResult::CompoundInterest(r) => Some(r),
            _ => None,
        }
    }
}

impl Calculation for MonteCarloParams {
    const NAME: &'static str = "monte_carlo";
    type Output = MonteCarloResult;

    fn validate(&self) -> Result<()> {
        monte_carlo::validate(self)
    }

    fn input_size(&self) -> usize {
        self.iterations as usize
    }

    fn into_cached(output: Self::Output) -> CalculationResult {
        CalculationResult::MonteCarlo(output)
    }

    fn from_cached(cached: CalculationResult) -> Option<Self::Output> {
        match cached {
            CalculationResult::MonteCarlo(r) => Some(r),
            _ => None,
        }
    }
}

impl Calculation for FireParams {
    const NAME: &'static str = "fire_number";
    type Output = FireResult;

    fn validate(&self) -> Result<()> {
        fire::validate(self)
    }

    fn dependency_tags(&self) -> Vec<String> {
        fire::dependency_tags(self)
    }

    fn input_size(&self) -> usize {
        self.expense_categories.len() + self.stress_scenarios.len()
    }

    fn into_cached(output: Self::Output) -> CalculationResult {
        CalculationResult::Fire(output)
    }

    fn from_cached(cached: CalculationResult) -> Option<Self::Output> {
        match cached {
            CalculationResult::Fire(r) => Some(r),
            _ => None,
        }
    }
}

impl Calculation for DebtPayoffParams {
    const NAME: &'static str = "debt_payoff";
    type Output = DebtPayoffResult;

    fn validate(&self) -> Result<()> {
        debt_payoff::validate(self)
    }

    fn dependency_tags(&self) -> Vec<String> {
        debt_payoff::dependency_tags(self)
    }

    fn input_size(&self) -> usize {
        self.debts.len()
    }

    fn into_cached(output: Self::Output) -> CalculationResult {
        CalculationResult::DebtPayoff(output)
    }

    fn from_cached(cached: CalculationResult) -> Option<Self::Output> {
        match cached {
            CalculationResult::DebtPayoff(r) => Some(r),
            _ => None,
        }
    }
}

impl Calculation for SavingsPlanParams {
    const NAME: &'static str = "savings_plan";
    type Output = SavingsPlanResult;

    fn validate(&self) -> Result<()> {
        savings::validate(self)
    }

    fn dependency_tags(&self) -> Vec<String> {
        savings::dependency_tags(self)
    }

    fn input_size(&self) -> usize {
        self.goals.len()
    }

    fn into_cached(output: Self::Output) -> CalculationResult {
        CalculationResult::SavingsPlan(output)
    }

    fn from_cached(cached: CalculationResult) -> Option<Self::Output> {
        match cached {
            CalculationResult::SavingsPlan(r) => Some(r),
            _ => None,
        }
    }
}

/// Caching, instrumented entry point to every calculator
#[derive(Debug)]
pub struct FinanceEngine {
    config: EngineConfig,
    cache: ResultCache,
    recorder: PerformanceRecorder,
    /// Draws seeds for Monte Carlo calls that do not bring their own
    rng: Mutex<StdRng>,
}

impl Default for FinanceEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl FinanceEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            cache: ResultCache::new(config.cache_capacity, config.cache_ttl()),
            recorder: PerformanceRecorder::new(config.performance_buffer_capacity),
            rng: Mutex::new(rng),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calculate_compound_interest(
        &self,
        params: &CompoundInterestParams,
    ) -> Result<CompoundInterestResult> {
        self.run(params, compound::calculate)
    }

    /// Unseeded parameters draw their seed from the engine RNG; the result
    /// reports the seed that was used
    pub fn simulate_monte_carlo(&self, params: &MonteCarloParams) -> Result<MonteCarloResult> {
        self.run(params, |p| monte_carlo::simulate_seeded(p, self.seed_for(p)))
    }

    /// Like [`Self::simulate_monte_carlo`] but reports progress and honours cancellation
    pub fn simulate_monte_carlo_with_progress(
        &self,
        params: &MonteCarloParams,
        progress: &SimulationProgress,
    ) -> Result<MonteCarloResult> {
        self.run(params, |p| {
            monte_carlo::simulate_seeded_with_progress(p, self.seed_for(p), progress)
        })
    }

    pub fn calculate_fire_number(&self, params: &FireParams) -> Result<FireResult> {
        self.run(params, fire::calculate)
    }

    pub fn plan_debt_payoff(&self, params: &DebtPayoffParams) -> Result<DebtPayoffResult> {
        self.run(params, debt_payoff::calculate)
    }

    /// A missing `as_of` is pinned to today before the cache key is built
    pub fn optimize_savings_plan(&self, params: &SavingsPlanParams) -> Result<SavingsPlanResult> {
        if params.as_of.is_some() {
            return self.run(params, savings::calculate);
        }
        let mut pinned = params.clone();
        pinned.as_of = Some(savings::as_of(params));
        self.run(&pinned, savings::calculate)
    }

    /// Remove every cached result (`None`) or those sharing a dependency tag
    pub fn clear_cache(&self, tags: Option<&[&str]>) -> usize {
        self.cache.invalidate(tags)
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn performance_metrics(&self) -> PerformanceStats {
        self.recorder.stats()
    }

    #[must_use]
    pub fn performance_samples(&self) -> Vec<PerformanceSample> {
        self.recorder.samples()
    }

    fn seed_for(&self, params: &MonteCarloParams) -> u64 {
        params.seed.unwrap_or_else(|| self.rng.lock().random())
    }

    fn run<P, F>(&self, params: &P, compute: F) -> Result<P::Output>
    where
        P: Calculation,
        F: FnOnce(&P) -> Result<P::Output>,
    {
        let span = tracing::debug_span!("calculate", calculator = P::NAME);
        let _enter = span.enter();

        let started = Instant::now();
        let outcome = self.lookup_or_compute(params, compute);
        let elapsed = started.elapsed();

        match outcome {
            Ok((output, cache_hit)) => {
                self.recorder
                    .record(P::NAME, elapsed, cache_hit, params.input_size());
                Ok(output)
            }
            Err(err) => {
                tracing::warn!(calculator = P::NAME, error = %err, "calculation failed");
                self.recorder
                    .record(P::NAME, elapsed, false, params.input_size());
                Err(err)
            }
        }
    }

    fn lookup_or_compute<P, F>(&self, params: &P, compute: F) -> Result<(P::Output, bool)>
    where
        P: Calculation,
        F: FnOnce(&P) -> Result<P::Output>,
    {
        params.validate()?;
        let key = cache_key(P::NAME, params)?;

        if let Some(hit) = self.cache.get(&key).and_then(P::from_cached) {
            return Ok((hit, true));
        }

        let started = Instant::now();
        let output = compute(params)?;
        let compute_duration = started.elapsed();
        tracing::debug!(
            calculator = P::NAME,
            elapsed_ms = compute_duration.as_secs_f64() * 1000.0,
            "computed"
        );
        self.cache.put(
            key,
            P::into_cached(output.clone()),
            params.dependency_tags(),
            compute_duration,
        );
        Ok((output, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_send_sync() {
        assert_send_sync::<FinanceEngine>();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default().with_cache_capacity(0);
        assert!(FinanceEngine::new(config).is_err());
    }

    #[test]
    fn test_cached_variant_mismatch_is_a_miss() {
        let fire = CalculationResult::Fire(
            fire::calculate(&FireParams {
                annual_expenses: Some(40_000.0),
                ..FireParams::default()
            })
            .unwrap(),
        );
        assert!(CompoundInterestParams::from_cached(fire).is_none());
    }
}

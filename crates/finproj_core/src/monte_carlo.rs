//! Stochastic portfolio projection
//!
//! Each path compounds a starting balance month by month with normally
//! distributed returns. Seeded runs split the paths into batches of
//! [`BATCH_SIZE`], each driven by its own `SmallRng` whose seed is drawn from a
//! master `StdRng`. Batch seeds depend only on the master seed, so a seeded run
//! produces the same result whether the batches run on rayon or in sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{EngineError, Result, ensure_finite};
use crate::finance_math::{
    SummaryStatistics, Timing, future_value_annuity, future_value_lump_sum, normal_distribution,
    percentile,
};
use crate::model::{
    ConfidenceBands, ConfidenceInterval, MonteCarloParams, MonteCarloResult, PercentileSet,
    YearlyProjection,
};
use crate::validation::{
    require_non_negative, require_positive, require_rate_above_total_loss,
};

const OPERATION: &str = "monte carlo simulation";

/// Paths simulated per seeded batch
pub const BATCH_SIZE: usize = 100;

/// Shared progress counter and cancel flag for a running simulation
#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    completed: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SimulationProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths finished so far
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn validate(params: &MonteCarloParams) -> Result<()> {
    require_positive("iterations", f64::from(params.iterations))?;
    require_positive("years", f64::from(params.years))?;
    require_non_negative("initial_value", params.initial_value)?;
    require_non_negative("monthly_contribution", params.monthly_contribution)?;
    require_rate_above_total_loss("expected_annual_return", params.expected_annual_return)?;
    require_non_negative("annual_volatility", params.annual_volatility)?;
    if let Some(inflation) = params.inflation_rate {
        require_rate_above_total_loss("inflation_rate", inflation)?;
    }
    if let Some(target) = params.target_value {
        require_non_negative("target_value", target)?;
    }
    Ok(())
}

/// Year-end balances of one simulated path; the last entry is the final value
type Path = Vec<f64>;

/// Distribution of one month's return
fn monthly_returns(params: &MonteCarloParams) -> Result<Normal<f64>> {
    normal_distribution(
        params.expected_annual_return / 12.0,
        params.annual_volatility / 12f64.sqrt(),
    )
}

fn simulate_path<R: Rng + ?Sized>(
    params: &MonteCarloParams,
    returns: &Normal<f64>,
    rng: &mut R,
) -> Path {
    let mut value = params.initial_value;
    let mut year_ends = Vec::with_capacity(params.years as usize);
    for month in 1..=params.years * 12 {
        let r = returns.sample(rng);
        value = ((value + params.monthly_contribution) * (1.0 + r)).max(0.0);
        if month % 12 == 0 {
            year_ends.push(value);
        }
    }
    year_ends
}

fn run_paths<R: Rng + ?Sized>(
    params: &MonteCarloParams,
    count: usize,
    rng: &mut R,
    progress: Option<&SimulationProgress>,
) -> Result<Vec<Path>> {
    let returns = monthly_returns(params)?;
    let mut paths = Vec::with_capacity(count);
    for _ in 0..count {
        if progress.is_some_and(SimulationProgress::is_cancelled) {
            return Err(EngineError::Cancelled);
        }
        paths.push(simulate_path(params, &returns, rng));
        if let Some(p) = progress {
            p.increment();
        }
    }
    Ok(paths)
}

/// Run every path sequentially from the caller's random source
pub fn simulate_with_rng<R: Rng + ?Sized>(
    params: &MonteCarloParams,
    rng: &mut R,
) -> Result<MonteCarloResult> {
    let paths = run_paths(params, params.iterations as usize, rng, None)?;
    summarize(params, paths, None)
}

/// Reproducible run from a single seed
pub fn simulate_seeded(params: &MonteCarloParams, seed: u64) -> Result<MonteCarloResult> {
    run_seeded(params, seed, None)
}

/// Seeded run that reports completed paths and stops with
/// [`EngineError::Cancelled`] once `progress` is cancelled
pub fn simulate_seeded_with_progress(
    params: &MonteCarloParams,
    seed: u64,
    progress: &SimulationProgress,
) -> Result<MonteCarloResult> {
    run_seeded(params, seed, Some(progress))
}

fn run_seeded(
    params: &MonteCarloParams,
    seed: u64,
    progress: Option<&SimulationProgress>,
) -> Result<MonteCarloResult> {
    let iterations = params.iterations as usize;
    let num_batches = iterations.div_ceil(BATCH_SIZE);

    let mut master = StdRng::seed_from_u64(seed);
    let batch_seeds: Vec<u64> = (0..num_batches).map(|_| master.random::<u64>()).collect();

    let run_batch = |(i, batch_seed): (usize, u64)| -> Result<Vec<Path>> {
        let mut rng = SmallRng::seed_from_u64(batch_seed);
        let batch_size = if i == num_batches - 1 {
            iterations - i * BATCH_SIZE
        } else {
            BATCH_SIZE
        };
        tracing::trace!(batch = i, batch_size, "simulating batch");
        run_paths(params, batch_size, &mut rng, progress)
    };

    #[cfg(feature = "parallel")]
    let batches: Vec<Vec<Path>> = batch_seeds
        .into_par_iter()
        .enumerate()
        .map(run_batch)
        .collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let batches: Vec<Vec<Path>> = batch_seeds
        .into_iter()
        .enumerate()
        .map(run_batch)
        .collect::<Result<_>>()?;

    let paths = batches.into_iter().flatten().collect();
    summarize(params, paths, Some(seed))
}

fn percentile_set(sorted: &[f64]) -> Result<PercentileSet> {
    Ok(PercentileSet {
        p5: percentile(sorted, 0.05)?,
        p10: percentile(sorted, 0.10)?,
        p25: percentile(sorted, 0.25)?,
        p50: percentile(sorted, 0.50)?,
        p75: percentile(sorted, 0.75)?,
        p90: percentile(sorted, 0.90)?,
        p95: percentile(sorted, 0.95)?,
    })
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// Value of the plan if every month returned exactly the expected rate
fn deterministic_value(params: &MonteCarloParams) -> Result<f64> {
    let rate = params.expected_annual_return / 12.0;
    let months = f64::from(params.years * 12);
    // Contributions land before the month's return is applied
    Ok(future_value_lump_sum(params.initial_value, rate, months)?
        + future_value_annuity(params.monthly_contribution, rate, months, Timing::Beginning)?)
}

fn summarize(
    params: &MonteCarloParams,
    paths: Vec<Path>,
    seed: Option<u64>,
) -> Result<MonteCarloResult> {
    let n = paths.len() as f64;
    let months = params.years * 12;
    let total_contributed = params.initial_value + params.monthly_contribution * f64::from(months);

    let finals = sorted(paths.iter().filter_map(|p| p.last().copied()).collect());
    let final_percentiles = percentile_set(&finals)?;
    let statistics = SummaryStatistics::from_sorted(&finals)?;
    ensure_finite(OPERATION, "mean final value", statistics.mean)?;

    let deflator = (1.0 + params.inflation_rate.unwrap_or(0.0)).powi(params.years as i32);
    let real: Vec<f64> = finals.iter().map(|v| v / deflator).collect();
    let real_final_percentiles = percentile_set(&real)?;

    let band = |lower: f64, upper: f64| ConfidenceInterval { lower, upper };
    let confidence_bands = ConfidenceBands {
        p5_p95: band(final_percentiles.p5, final_percentiles.p95),
        p10_p90: band(final_percentiles.p10, final_percentiles.p90),
        p25_p75: band(final_percentiles.p25, final_percentiles.p75),
    };

    let below = finals.iter().filter(|v| **v < total_contributed).count();
    let probability_of_loss = below as f64 / n;
    let probability_of_target = params
        .target_value
        .map(|target| finals.iter().filter(|v| **v >= target).count() as f64 / n);

    let mut yearly = Vec::with_capacity(params.years as usize);
    for (idx, year) in (1..=params.years).enumerate() {
        let values = sorted(paths.iter().map(|p| p[idx]).collect());
        let mean = values.iter().sum::<f64>() / n;
        yearly.push(YearlyProjection {
            year,
            mean,
            percentiles: percentile_set(&values)?,
        });
    }

    Ok(MonteCarloResult {
        iterations: params.iterations,
        months,
        seed,
        total_contributed,
        expected_deterministic_value: deterministic_value(params)?,
        final_percentiles,
        real_final_percentiles,
        confidence_bands,
        statistics,
        probability_of_loss,
        probability_of_target,
        yearly,
    })
}

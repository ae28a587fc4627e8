//! Numeric primitives: time value of money, percentiles and sampling
//!
//! Everything here is a pure function. Shape errors (negative period counts,
//! non-finite inputs) are reported as `InvalidParameters`, never clamped.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// When a periodic payment lands inside its period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    Beginning,
    #[default]
    End,
}

fn check_periods(periods: f64) -> Result<()> {
    if !periods.is_finite() || periods < 0.0 {
        return Err(EngineError::invalid(
            "periods",
            format!("must be a finite non-negative count, got {periods}"),
        ));
    }
    Ok(())
}

fn check_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(EngineError::invalid(
            "periodic_rate",
            format!("must be finite and greater than -1.0, got {rate}"),
        ));
    }
    Ok(())
}

/// `principal * (1 + r)^n`
pub fn future_value_lump_sum(principal: f64, periodic_rate: f64, periods: f64) -> Result<f64> {
    check_periods(periods)?;
    check_rate(periodic_rate)?;
    Ok(principal * (1.0 + periodic_rate).powf(periods))
}

/// Future value of a level payment stream.
///
/// With a zero rate this degrades to `payment * periods` exactly.
pub fn future_value_annuity(
    payment: f64,
    periodic_rate: f64,
    periods: f64,
    timing: Timing,
) -> Result<f64> {
    check_periods(periods)?;
    check_rate(periodic_rate)?;
    if periodic_rate == 0.0 {
        return Ok(payment * periods);
    }
    let ordinary = payment * ((1.0 + periodic_rate).powf(periods) - 1.0) / periodic_rate;
    Ok(match timing {
        Timing::End => ordinary,
        Timing::Beginning => ordinary * (1.0 + periodic_rate),
    })
}

/// `(1 + nominal/n)^n - 1`
pub fn effective_annual_rate(nominal_rate: f64, periods_per_year: f64) -> Result<f64> {
    if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
        return Err(EngineError::invalid(
            "periods_per_year",
            format!("must be greater than zero, got {periods_per_year}"),
        ));
    }
    check_rate(nominal_rate / periods_per_year)?;
    Ok((1.0 + nominal_rate / periods_per_year).powf(periods_per_year) - 1.0)
}

/// Periodic payment that grows to `future_value` after `periods` end-of-period deposits
pub fn required_payment(future_value: f64, periodic_rate: f64, periods: f64) -> Result<f64> {
    check_periods(periods)?;
    check_rate(periodic_rate)?;
    if periods == 0.0 {
        return Err(EngineError::invalid("periods", "must be greater than zero"));
    }
    if periodic_rate == 0.0 {
        return Ok(future_value / periods);
    }
    Ok(future_value / (((1.0 + periodic_rate).powf(periods) - 1.0) / periodic_rate))
}

/// Level payment that retires `principal` over `periods`
pub fn amortized_payment(principal: f64, periodic_rate: f64, periods: f64) -> Result<f64> {
    check_periods(periods)?;
    check_rate(periodic_rate)?;
    if periods == 0.0 {
        return Err(EngineError::invalid("periods", "must be greater than zero"));
    }
    if periodic_rate == 0.0 {
        return Ok(principal / periods);
    }
    let growth = (1.0 + periodic_rate).powf(periods);
    Ok(principal * periodic_rate * growth / (growth - 1.0))
}

/// Linear-interpolation percentile over an ascending slice.
///
/// `p` is a fraction in `[0, 1]`; sorting is the caller's job.
pub fn percentile(sorted: &[f64], p: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(EngineError::invalid("values", "cannot take a percentile of nothing"));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(EngineError::invalid(
            "percentile",
            format!("must be within [0, 1], got {p}"),
        ));
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Ok(sorted[lower]);
    }
    let weight = rank - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// N(mean, std_dev), for loops that draw many samples from the same distribution
pub fn normal_distribution(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev)
        .map_err(|e| EngineError::invalid("std_dev", format!("{e} (mean={mean}, std_dev={std_dev})")))
}

/// Draw one sample from N(mean, std_dev) using the injected random source
pub fn normal_random<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> Result<f64> {
    normal_distribution(mean, std_dev).map(|d| d.sample(rng))
}

/// Moments of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub skewness: f64,
    /// Excess kurtosis (a normal distribution scores 0)
    pub kurtosis: f64,
}

impl SummaryStatistics {
    /// Population moments over an ascending slice
    pub fn from_sorted(sorted: &[f64]) -> Result<Self> {
        let median = percentile(sorted, 0.5)?;
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for v in sorted {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        m2 /= n;
        m3 /= n;
        m4 /= n;

        let std_dev = m2.sqrt();
        // Degenerate samples have no shape
        let (skewness, kurtosis) = if m2 > f64::EPSILON * mean.abs().max(1.0) {
            (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
        } else {
            (0.0, 0.0)
        };

        Ok(Self {
            mean,
            median,
            std_dev,
            skewness,
            kurtosis,
        })
    }
}

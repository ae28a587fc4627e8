//! Deterministic compound growth with optional recurring contributions

use crate::error::{Result, ensure_finite};
use crate::finance_math::{effective_annual_rate, future_value_annuity, future_value_lump_sum};
use crate::model::{CompoundInterestParams, CompoundInterestResult, Contribution, YearBalance};
use crate::validation::{require_non_negative, require_positive};

const OPERATION: &str = "compound interest";

pub fn validate(params: &CompoundInterestParams) -> Result<()> {
    require_non_negative("principal", params.principal)?;
    require_non_negative("annual_rate", params.annual_rate)?;
    require_positive("compounding_frequency", f64::from(params.compounding_frequency))?;
    require_positive("time_in_years", params.time_in_years)?;
    if let Some(contribution) = &params.contribution {
        require_non_negative("contribution.amount", contribution.amount)?;
        require_positive("contribution.frequency", f64::from(contribution.frequency))?;
    }
    Ok(())
}

/// Balance split into its sources after `years`
struct Growth {
    balance: f64,
    contributed: f64,
}

fn grow(params: &CompoundInterestParams, years: f64) -> Result<Growth> {
    let n = f64::from(params.compounding_frequency);
    let periodic_rate = params.annual_rate / n;
    let mut balance = future_value_lump_sum(params.principal, periodic_rate, n * years)?;
    let mut contributed = 0.0;

    if let Some(Contribution {
        amount,
        frequency,
        timing,
    }) = params.contribution
    {
        let m = f64::from(frequency);
        // Restate the compounding rate per contribution period when the schedules differ
        let rate = if frequency == params.compounding_frequency {
            periodic_rate
        } else {
            (1.0 + periodic_rate).powf(n / m) - 1.0
        };
        balance += future_value_annuity(amount, rate, m * years, timing)?;
        contributed = amount * m * years;
    }

    Ok(Growth {
        balance,
        contributed,
    })
}

/// Project the balance forward. Callers go through [`validate`] first.
pub fn calculate(params: &CompoundInterestParams) -> Result<CompoundInterestResult> {
    let end = grow(params, params.time_in_years)?;
    let future_value = ensure_finite(OPERATION, "future value", end.balance)?;
    let effective =
        effective_annual_rate(params.annual_rate, f64::from(params.compounding_frequency))?;

    let whole_years = params.time_in_years.floor() as u32;
    let mut yearly_breakdown = Vec::with_capacity(whole_years as usize);
    for year in 1..=whole_years {
        let g = grow(params, f64::from(year))?;
        yearly_breakdown.push(YearBalance {
            year,
            balance: g.balance,
            contributions_to_date: g.contributed,
            interest_to_date: g.balance - params.principal - g.contributed,
        });
    }

    Ok(CompoundInterestResult {
        future_value,
        principal: params.principal,
        total_contributions: end.contributed,
        total_interest_earned: future_value - params.principal - end.contributed,
        effective_annual_rate: effective,
        yearly_breakdown,
    })
}

//! Multi-debt payoff planner
//!
//! Every active debt receives its minimum each month. The extra payment pool
//! goes to the first active debt in strategy order, and a retired debt's
//! minimum joins the pool from the following month. The order is fixed up
//! front and never re-sorted.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{EngineError, Result, ensure_finite};
use crate::finance_math::{Timing, amortized_payment, future_value_annuity};
use crate::model::{
    ConsolidationAnalysis, ConsolidationOffer, CreditScorePoint, DebtAccount, DebtId,
    DebtPayoffParams, DebtPayoffResult, DebtPayoffSummary, EmergencyFundAnalysis,
    FinancialContext, FireIntegration, PayoffStrategy, Priority, Recommendation, ScheduleRow,
    StrategyComparison, StrategyOutcome, sort_recommendations,
};
use crate::validation::{
    require_non_empty, require_non_negative, require_positive, require_rate_above_total_loss,
};

const OPERATION: &str = "debt payoff";

/// Hard stop for plans that never finish (100 years)
pub const MAX_MONTHS: u32 = 1200;
/// Balances at or below a cent count as paid
const PAID_OFF_TOLERANCE: f64 = 0.01;

const HIGH_INTEREST_RATE: f64 = 0.20;
const CREDIT_SCORE_UTILIZATION_WEIGHT: f64 = 200.0;
const CREDIT_SCORE_POINTS_PER_MONTH: f64 = 2.0;
const CREDIT_SCORE_MAX_GAIN: f64 = 120.0;
const CREDIT_SCORE_REPORT_INTERVAL: u32 = 3;

pub fn validate(params: &DebtPayoffParams) -> Result<()> {
    require_non_empty("debts", &params.debts)?;
    let mut seen = FxHashSet::default();
    for debt in &params.debts {
        if !seen.insert(&debt.id) {
            return Err(EngineError::invalid(
                "debts.id",
                format!("duplicate debt id {}", debt.id),
            ));
        }
        require_non_negative("debts.balance", debt.balance)?;
        require_non_negative("debts.annual_interest_rate", debt.annual_interest_rate)?;
        require_non_negative("debts.minimum_payment", debt.minimum_payment)?;
    }
    require_non_negative("extra_payment", params.extra_payment)?;

    if let PayoffStrategy::Custom(order) = &params.strategy {
        let mut listed = FxHashSet::default();
        let is_permutation = order.len() == params.debts.len()
            && order.iter().all(|id| seen.contains(id) && listed.insert(id));
        if !is_permutation {
            return Err(EngineError::invalid(
                "strategy",
                "custom order must list every debt id exactly once",
            ));
        }
    }

    if let Some(ctx) = &params.context {
        validate_context(ctx)?;
    }
    if let Some(offer) = &params.consolidation {
        require_non_negative("consolidation.annual_rate", offer.annual_rate)?;
        require_positive("consolidation.term_months", f64::from(offer.term_months))?;
        require_non_negative(
            "consolidation.origination_fee_rate",
            offer.origination_fee_rate,
        )?;
    }
    Ok(())
}

fn validate_context(ctx: &FinancialContext) -> Result<()> {
    for (field, value) in [
        ("context.monthly_income", ctx.monthly_income),
        ("context.monthly_expenses", ctx.monthly_expenses),
        ("context.emergency_fund", ctx.emergency_fund),
    ] {
        if let Some(v) = value {
            require_non_negative(field, v)?;
        }
    }
    require_non_negative(
        "context.emergency_fund_target_months",
        ctx.emergency_fund_target_months,
    )?;
    if let Some(score) = ctx.current_credit_score {
        if !(300..=850).contains(&score) {
            return Err(EngineError::invalid(
                "context.current_credit_score",
                format!("must be within 300..=850, got {score}"),
            ));
        }
    }
    if let Some(limit) = ctx.total_credit_limit {
        require_positive("context.total_credit_limit", limit)?;
    }
    require_rate_above_total_loss("context.expected_return", ctx.expected_return)?;
    Ok(())
}

pub(crate) fn dependency_tags(params: &DebtPayoffParams) -> Vec<String> {
    std::iter::once("debts".to_string())
        .chain(params.debts.iter().map(|d| format!("debt:{}", d.id)))
        .collect()
}

/// Indices into `debts` in the order the extra pool will target them.
/// Sorting is stable so ties keep input order.
pub fn payoff_order(debts: &[DebtAccount], strategy: &PayoffStrategy) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..debts.len()).collect();
    match strategy {
        PayoffStrategy::Snowball => {
            order.sort_by(|&a, &b| debts[a].balance.total_cmp(&debts[b].balance));
        }
        PayoffStrategy::Avalanche => order.sort_by(|&a, &b| {
            debts[b]
                .annual_interest_rate
                .total_cmp(&debts[a].annual_interest_rate)
        }),
        PayoffStrategy::Custom(ids) => {
            let index: FxHashMap<&DebtId, usize> =
                debts.iter().enumerate().map(|(i, d)| (&d.id, i)).collect();
            order = ids
                .iter()
                .map(|id| {
                    index.get(id).copied().ok_or_else(|| {
                        EngineError::invalid("strategy", format!("unknown debt id {id}"))
                    })
                })
                .collect::<Result<_>>()?;
        }
    }
    Ok(order)
}

/// Outcome of running the month loop for one ordering and extra payment
#[derive(Debug, Clone)]
struct Simulation {
    total_months: u32,
    total_interest: f64,
    total_paid: f64,
    summaries: Vec<DebtPayoffSummary>,
    schedule: Vec<ScheduleRow>,
    /// Sum of balances at the end of each month, month 0 first
    month_end_balances: Vec<f64>,
}

struct Working {
    balance: f64,
    interest_paid: f64,
    total_paid: f64,
    payoff_month: Option<u32>,
}

fn never_amortizes(debt: &DebtAccount) -> EngineError {
    EngineError::DebtNeverAmortizes {
        debt_id: debt.id.clone(),
        max_months: MAX_MONTHS,
    }
}

fn simulate(debts: &[DebtAccount], order: &[usize], extra_payment: f64) -> Result<Simulation> {
    let active_interest: f64 = debts
        .iter()
        .filter(|d| d.balance > PAID_OFF_TOLERANCE)
        .map(DebtAccount::monthly_interest)
        .sum();
    let outlay: f64 = debts.iter().map(|d| d.minimum_payment).sum::<f64>() + extra_payment;
    if active_interest > 0.0 && outlay <= active_interest {
        let culprit = order
            .iter()
            .map(|&i| &debts[i])
            .find(|d| d.balance > PAID_OFF_TOLERANCE && d.minimum_payment <= d.monthly_interest())
            .or_else(|| order.iter().map(|&i| &debts[i]).find(|d| d.balance > PAID_OFF_TOLERANCE));
        if let Some(debt) = culprit {
            return Err(never_amortizes(debt));
        }
    }

    let mut pool = extra_payment;
    let mut working: Vec<Working> = debts
        .iter()
        .map(|d| {
            let paid = d.balance <= PAID_OFF_TOLERANCE;
            if paid {
                pool += d.minimum_payment;
            }
            Working {
                balance: if paid { 0.0 } else { d.balance },
                interest_paid: 0.0,
                total_paid: 0.0,
                payoff_month: paid.then_some(0),
            }
        })
        .collect();

    let mut schedule = Vec::new();
    let mut month_end_balances = vec![working.iter().map(|w| w.balance).sum::<f64>()];
    let mut month = 0;

    while working.iter().any(|w| w.payoff_month.is_none()) {
        month += 1;
        if month > MAX_MONTHS {
            let stuck = order
                .iter()
                .find(|&&i| working[i].payoff_month.is_none())
                .map_or(&debts[order[0]], |&i| &debts[i]);
            return Err(never_amortizes(stuck));
        }

        let mut freed = 0.0;
        let mut focus_taken = false;
        for &i in order {
            let debt = &debts[i];
            let w = &mut working[i];
            if w.payoff_month.is_some() {
                continue;
            }

            let interest = w.balance * debt.annual_interest_rate / 12.0;
            let principal = (debt.minimum_payment - interest).min(w.balance);
            let mut payment = interest + principal;
            let mut principal_payment = principal;
            if !focus_taken {
                focus_taken = true;
                let extra = pool.min(w.balance - principal).max(0.0);
                payment += extra;
                principal_payment += extra;
            }

            w.balance -= principal_payment;
            w.interest_paid += interest;
            w.total_paid += payment;

            let is_paid_off = w.balance <= PAID_OFF_TOLERANCE;
            if is_paid_off {
                w.balance = 0.0;
                w.payoff_month = Some(month);
                freed += debt.minimum_payment;
            }
            schedule.push(ScheduleRow {
                month,
                debt_id: debt.id.clone(),
                payment,
                principal_payment,
                interest_payment: interest,
                remaining_balance: w.balance,
                is_paid_off,
            });
        }
        pool += freed;
        month_end_balances.push(working.iter().map(|w| w.balance).sum());
    }

    let mut summaries: Vec<DebtPayoffSummary> = order
        .iter()
        .map(|&i| DebtPayoffSummary {
            debt_id: debts[i].id.clone(),
            name: debts[i].name.clone(),
            payoff_month: working[i].payoff_month.unwrap_or(month),
            interest_paid: working[i].interest_paid,
            total_paid: working[i].total_paid,
        })
        .collect();
    summaries.sort_by_key(|s| s.payoff_month);

    let total_interest = ensure_finite(
        OPERATION,
        "total interest",
        working.iter().map(|w| w.interest_paid).sum(),
    )?;
    let total_paid = working.iter().map(|w| w.total_paid).sum();

    Ok(Simulation {
        total_months: month,
        total_interest,
        total_paid,
        summaries,
        schedule,
        month_end_balances,
    })
}

fn outcome(label: &str, sim: &Simulation) -> StrategyOutcome {
    StrategyOutcome {
        strategy: label.to_string(),
        total_months: sim.total_months,
        total_interest: sim.total_interest,
    }
}

fn run_strategy(
    debts: &[DebtAccount],
    strategy: &PayoffStrategy,
    extra: f64,
) -> Result<Simulation> {
    let order = payoff_order(debts, strategy)?;
    simulate(debts, &order, extra)
}

fn strategy_comparison(
    params: &DebtPayoffParams,
    order: &[usize],
    plan: &Simulation,
) -> Result<StrategyComparison> {
    let snowball = run_strategy(&params.debts, &PayoffStrategy::Snowball, params.extra_payment)?;
    let avalanche = run_strategy(&params.debts, &PayoffStrategy::Avalanche, params.extra_payment)?;

    let without_extra = match simulate(&params.debts, order, 0.0) {
        Ok(sim) => Some(sim),
        Err(EngineError::DebtNeverAmortizes { .. }) => None,
        Err(e) => return Err(e),
    };

    Ok(StrategyComparison {
        snowball: outcome("snowball", &snowball),
        avalanche: outcome("avalanche", &avalanche),
        interest_saved_by_extra_payment: without_extra
            .as_ref()
            .map(|sim| sim.total_interest - plan.total_interest),
        without_extra_payment: without_extra
            .as_ref()
            .map(|sim| outcome(params.strategy.label(), sim)),
    })
}

fn consolidation(
    debts: &[DebtAccount],
    offer: &ConsolidationOffer,
    plan: &Simulation,
) -> Result<ConsolidationAnalysis> {
    let total_balance: f64 = debts.iter().map(|d| d.balance).sum();
    let term = f64::from(offer.term_months);
    let monthly_payment = amortized_payment(total_balance, offer.annual_rate / 12.0, term)?;
    let total_interest = monthly_payment * term - total_balance;
    let origination_fee = total_balance * offer.origination_fee_rate;
    let savings = plan.total_interest - total_interest - origination_fee;
    Ok(ConsolidationAnalysis {
        total_balance,
        monthly_payment,
        origination_fee,
        total_interest,
        months: offer.term_months,
        savings,
        recommended: savings > 0.0,
    })
}

fn credit_score_projection(ctx: &FinancialContext, plan: &Simulation) -> Vec<CreditScorePoint> {
    let (Some(current), Some(limit)) = (ctx.current_credit_score, ctx.total_credit_limit) else {
        return Vec::new();
    };
    let initial_util = plan.month_end_balances[0] / limit;
    let score_at = |month: u32| {
        let util = plan.month_end_balances[month as usize] / limit;
        let gain = ((initial_util - util) * CREDIT_SCORE_UTILIZATION_WEIGHT
            + CREDIT_SCORE_POINTS_PER_MONTH * f64::from(month))
        .min(CREDIT_SCORE_MAX_GAIN);
        let score = (f64::from(current) + gain).round().clamp(300.0, 850.0) as u32;
        CreditScorePoint {
            month,
            utilization: util,
            projected_score: score,
        }
    };

    let mut months: Vec<u32> = (CREDIT_SCORE_REPORT_INTERVAL..=plan.total_months)
        .step_by(CREDIT_SCORE_REPORT_INTERVAL as usize)
        .collect();
    if plan.total_months > 0 && months.last() != Some(&plan.total_months) {
        months.push(plan.total_months);
    }
    months.into_iter().map(score_at).collect()
}

fn fire_integration(
    params: &DebtPayoffParams,
    ctx: &FinancialContext,
    plan: &Simulation,
) -> Result<Option<FireIntegration>> {
    let (Some(income), Some(expenses)) = (ctx.monthly_income, ctx.monthly_expenses) else {
        return Ok(None);
    };
    let freed_monthly_payments =
        params.debts.iter().map(|d| d.minimum_payment).sum::<f64>() + params.extra_payment;
    let horizon_months = ctx.investment_horizon_years * 12;
    let investing_months = horizon_months.saturating_sub(plan.total_months);
    let invested_value_at_horizon = future_value_annuity(
        freed_monthly_payments,
        ctx.expected_return / 12.0,
        f64::from(investing_months),
        Timing::End,
    )?;
    Ok(Some(FireIntegration {
        monthly_surplus: income - expenses - freed_monthly_payments,
        freed_monthly_payments,
        debt_free_month: plan.total_months,
        invested_value_at_horizon,
        debts_above_expected_return: params
            .debts
            .iter()
            .filter(|d| d.annual_interest_rate > ctx.expected_return)
            .map(|d| d.id.clone())
            .collect(),
    }))
}

fn emergency_fund(params: &DebtPayoffParams, ctx: &FinancialContext) -> Option<EmergencyFundAnalysis> {
    let current_fund = ctx.emergency_fund?;
    let expenses = ctx.monthly_expenses.filter(|e| *e > 0.0)?;
    let target = ctx.emergency_fund_target_months * expenses;
    let shortfall = (target - current_fund).max(0.0);
    Some(EmergencyFundAnalysis {
        current_fund,
        months_covered: current_fund / expenses,
        target_months: ctx.emergency_fund_target_months,
        shortfall,
        recommended_monthly_to_fund: if shortfall > 0.0 {
            (params.extra_payment * 0.5).min(shortfall)
        } else {
            0.0
        },
    })
}

fn recommendations(
    params: &DebtPayoffParams,
    plan: &Simulation,
    comparison: &StrategyComparison,
    consolidation: Option<&ConsolidationAnalysis>,
    emergency: Option<&EmergencyFundAnalysis>,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    let avalanche_savings = plan.total_interest - comparison.avalanche.total_interest;
    if params.strategy != PayoffStrategy::Avalanche && avalanche_savings > PAID_OFF_TOLERANCE {
        recs.push(Recommendation::new(
            "strategy",
            "Paying the highest-rate debt first (avalanche) costs less interest",
            avalanche_savings,
            Priority::Medium,
        ));
    }

    for debt in &params.debts {
        if debt.annual_interest_rate > HIGH_INTEREST_RATE && debt.balance > PAID_OFF_TOLERANCE {
            recs.push(Recommendation::new(
                "high_interest",
                format!(
                    "{} charges {:.1}%; consider a balance transfer or a lower-rate refinance",
                    debt.name,
                    debt.annual_interest_rate * 100.0
                ),
                debt.monthly_interest() * 12.0,
                Priority::High,
            ));
        }
    }

    if let Some(ef) = emergency.filter(|ef| ef.shortfall > 0.0) {
        recs.push(Recommendation::new(
            "emergency_fund",
            format!(
                "Emergency savings cover {:.1} months; build toward {:.0} months before accelerating payoff",
                ef.months_covered, ef.target_months
            ),
            ef.shortfall,
            Priority::High,
        ));
    }

    if let Some(c) = consolidation.filter(|c| c.recommended) {
        recs.push(Recommendation::new(
            "consolidation",
            "Consolidating into the offered loan reduces total interest",
            c.savings,
            Priority::Medium,
        ));
    }

    sort_recommendations(&mut recs);
    recs
}

/// Build the payoff plan and every analysis layered on it.
/// Callers go through [`validate`] first.
pub fn calculate(params: &DebtPayoffParams) -> Result<DebtPayoffResult> {
    let order = payoff_order(&params.debts, &params.strategy)?;
    let plan = simulate(&params.debts, &order, params.extra_payment)?;

    let strategy_comparison = strategy_comparison(params, &order, &plan)?;
    let consolidation = params
        .consolidation
        .as_ref()
        .map(|offer| consolidation(&params.debts, offer, &plan))
        .transpose()?;

    let (credit_score_projection, fire_integration, emergency_fund) = match &params.context {
        Some(ctx) => (
            credit_score_projection(ctx, &plan),
            fire_integration(params, ctx, &plan)?,
            emergency_fund(params, ctx),
        ),
        None => (Vec::new(), None, None),
    };

    let recommendations = recommendations(
        params,
        &plan,
        &strategy_comparison,
        consolidation.as_ref(),
        emergency_fund.as_ref(),
    );

    Ok(DebtPayoffResult {
        strategy: params.strategy.clone(),
        total_months: plan.total_months,
        total_interest: plan.total_interest,
        total_paid: plan.total_paid,
        payoff_order: plan.summaries,
        schedule: plan.schedule,
        strategy_comparison,
        consolidation,
        credit_score_projection,
        fire_integration,
        emergency_fund,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debt(id: &str, balance: f64, rate: f64, minimum: f64) -> DebtAccount {
        DebtAccount {
            id: id.into(),
            name: id.to_uppercase(),
            balance,
            annual_interest_rate: rate,
            minimum_payment: minimum,
        }
    }

    fn params(debts: Vec<DebtAccount>, extra: f64, strategy: PayoffStrategy) -> DebtPayoffParams {
        DebtPayoffParams {
            debts,
            extra_payment: extra,
            strategy,
            context: None,
            consolidation: None,
        }
    }

    fn sample_debts() -> Vec<DebtAccount> {
        vec![
            debt("card", 5_000.0, 0.22, 150.0),
            debt("car", 12_000.0, 0.06, 300.0),
            debt("store", 800.0, 0.15, 40.0),
        ]
    }

    #[test]
    fn test_zero_rate_single_debt() {
        let result = calculate(&params(
            vec![debt("loan", 1_000.0, 0.0, 100.0)],
            0.0,
            PayoffStrategy::Avalanche,
        ))
        .unwrap();
        assert_eq!(result.total_months, 10);
        assert_eq!(result.total_interest, 0.0);
        assert!((result.total_paid - 1_000.0).abs() < 1e-9);
        assert_eq!(result.schedule.len(), 10);
        assert!(result.schedule.last().unwrap().is_paid_off);
    }

    #[test]
    fn test_snowball_pays_smallest_first() {
        let result = calculate(&params(sample_debts(), 200.0, PayoffStrategy::Snowball)).unwrap();
        let order: Vec<_> = result.payoff_order.iter().map(|s| s.debt_id.0.as_str()).collect();
        assert_eq!(order[0], "store");
        assert_eq!(result.payoff_order.last().unwrap().payoff_month, result.total_months);
    }

    #[test]
    fn test_snowball_smaller_balance_never_finishes_later() {
        // Same rate and minimum, listed out of balance order
        let debts = vec![
            debt("big", 5_000.0, 0.12, 100.0),
            debt("small", 2_000.0, 0.12, 100.0),
            debt("mid", 3_000.0, 0.12, 100.0),
        ];
        let result = calculate(&params(debts, 0.0, PayoffStrategy::Snowball)).unwrap();
        let month_of = |id: &str| {
            result
                .payoff_order
                .iter()
                .find(|s| s.debt_id.0 == id)
                .map(|s| s.payoff_month)
                .unwrap()
        };
        assert!(month_of("small") <= month_of("mid"));
        assert!(month_of("mid") <= month_of("big"));
        assert!(month_of("small") < month_of("big"));
    }

    #[test]
    fn test_avalanche_orders_by_rate() {
        let debts = sample_debts();
        let order = payoff_order(&debts, &PayoffStrategy::Avalanche).unwrap();
        assert_eq!(order, vec![0, 2, 1]);
        let order = payoff_order(&debts, &PayoffStrategy::Snowball).unwrap();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let debts = vec![
            debt("a", 1_000.0, 0.1, 50.0),
            debt("b", 1_000.0, 0.1, 50.0),
        ];
        assert_eq!(payoff_order(&debts, &PayoffStrategy::Snowball).unwrap(), vec![0, 1]);
        assert_eq!(payoff_order(&debts, &PayoffStrategy::Avalanche).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_avalanche_never_costs_more_interest_here() {
        let result = calculate(&params(sample_debts(), 200.0, PayoffStrategy::Snowball)).unwrap();
        let cmp = &result.strategy_comparison;
        assert!(cmp.avalanche.total_interest <= cmp.snowball.total_interest);
        assert_eq!(cmp.snowball.total_interest, result.total_interest);
        assert!(result.recommendations.iter().any(|r| r.category == "strategy"));
    }

    #[test]
    fn test_extra_payment_shortens_plan() {
        let base = calculate(&params(sample_debts(), 0.0, PayoffStrategy::Avalanche)).unwrap();
        let more = calculate(&params(sample_debts(), 300.0, PayoffStrategy::Avalanche)).unwrap();
        assert!(more.total_months < base.total_months);
        assert!(more.total_interest < base.total_interest);
        let saved = more.strategy_comparison.interest_saved_by_extra_payment.unwrap();
        assert!((saved - (base.total_interest - more.total_interest)).abs() < 1e-6);
    }

    #[test]
    fn test_zero_balance_debt_is_paid_at_month_zero() {
        let debts = vec![
            debt("done", 0.0, 0.1, 100.0),
            debt("open", 1_000.0, 0.0, 100.0),
        ];
        let result = calculate(&params(debts, 0.0, PayoffStrategy::Avalanche)).unwrap();
        assert_eq!(result.payoff_order[0].debt_id.0, "done");
        assert_eq!(result.payoff_order[0].payoff_month, 0);
        // The freed 100 goes straight to the open debt
        assert_eq!(result.total_months, 5);
        assert!(result.schedule.iter().all(|row| row.debt_id.0 == "open"));
    }

    #[test]
    fn test_minimum_below_interest_never_amortizes() {
        let p = params(
            vec![debt("bad", 10_000.0, 0.24, 100.0)],
            0.0,
            PayoffStrategy::Avalanche,
        );
        match calculate(&p).unwrap_err() {
            EngineError::DebtNeverAmortizes { debt_id, max_months } => {
                assert_eq!(debt_id.0, "bad");
                assert_eq!(max_months, MAX_MONTHS);
            }
            other => panic!("unexpected error {other}"),
        }
        // Enough extra rescues it
        let mut p = p;
        p.extra_payment = 200.0;
        assert!(calculate(&p).is_ok());
    }

    #[test]
    fn test_without_extra_is_none_when_minimums_cannot_amortize() {
        let p = params(
            vec![debt("bad", 10_000.0, 0.24, 100.0)],
            300.0,
            PayoffStrategy::Avalanche,
        );
        let result = calculate(&p).unwrap();
        assert!(result.strategy_comparison.without_extra_payment.is_none());
        assert!(result.strategy_comparison.interest_saved_by_extra_payment.is_none());
    }

    #[test]
    fn test_custom_order() {
        let order = PayoffStrategy::Custom(vec!["car".into(), "store".into(), "card".into()]);
        let result = calculate(&params(sample_debts(), 500.0, order)).unwrap();
        assert_eq!(result.schedule[0].debt_id.0, "car");
        assert!(result.schedule[0].principal_payment > 500.0);
    }

    #[test]
    fn test_consolidation_analysis() {
        let mut p = params(sample_debts(), 0.0, PayoffStrategy::Avalanche);
        p.consolidation = Some(ConsolidationOffer {
            annual_rate: 0.05,
            term_months: 36,
            origination_fee_rate: 0.02,
        });
        let result = calculate(&p).unwrap();
        let c = result.consolidation.unwrap();
        assert_eq!(c.total_balance, 17_800.0);
        assert!((c.origination_fee - 356.0).abs() < 1e-9);
        let expected = result.total_interest - c.total_interest - c.origination_fee;
        assert!((c.savings - expected).abs() < 1e-9);
        assert_eq!(c.recommended, c.savings > 0.0);
    }

    #[test]
    fn test_context_analyses() {
        let mut p = params(sample_debts(), 400.0, PayoffStrategy::Avalanche);
        p.context = Some(FinancialContext {
            monthly_income: Some(6_000.0),
            monthly_expenses: Some(3_000.0),
            emergency_fund: Some(2_000.0),
            current_credit_score: Some(680),
            total_credit_limit: Some(30_000.0),
            ..FinancialContext::default()
        });
        let result = calculate(&p).unwrap();

        let fire = result.fire_integration.unwrap();
        assert_eq!(fire.freed_monthly_payments, 890.0);
        assert_eq!(fire.monthly_surplus, 6_000.0 - 3_000.0 - 890.0);
        assert_eq!(fire.debt_free_month, result.total_months);
        assert_eq!(fire.debts_above_expected_return.len(), 2);
        assert!(fire.invested_value_at_horizon > 0.0);

        let ef = result.emergency_fund.unwrap();
        assert_eq!(ef.shortfall, 7_000.0);
        assert_eq!(ef.recommended_monthly_to_fund, 200.0);

        let scores = &result.credit_score_projection;
        assert!(!scores.is_empty());
        assert_eq!(scores.last().unwrap().month, result.total_months);
        assert_eq!(scores.last().unwrap().utilization, 0.0);
        assert!(scores.iter().all(|s| (300..=850).contains(&s.projected_score)));
        assert!(scores.iter().all(|s| s.projected_score <= 680 + 120));
    }

    #[test]
    fn test_dependency_tags() {
        let p = params(sample_debts(), 0.0, PayoffStrategy::Avalanche);
        assert_eq!(
            dependency_tags(&p),
            vec!["debts", "debt:card", "debt:car", "debt:store"]
        );
    }

    #[test]
    fn test_validation() {
        let p = params(Vec::new(), 0.0, PayoffStrategy::Avalanche);
        assert_eq!(validate(&p).unwrap_err().field(), Some("debts"));

        let p = params(
            vec![debt("a", 1.0, 0.1, 1.0), debt("a", 2.0, 0.1, 1.0)],
            0.0,
            PayoffStrategy::Avalanche,
        );
        assert_eq!(validate(&p).unwrap_err().field(), Some("debts.id"));

        let p = params(vec![debt("a", -1.0, 0.1, 1.0)], 0.0, PayoffStrategy::Avalanche);
        assert_eq!(validate(&p).unwrap_err().field(), Some("debts.balance"));

        let p = params(vec![debt("a", 1.0, 0.1, -1.0)], 0.0, PayoffStrategy::Avalanche);
        assert_eq!(validate(&p).unwrap_err().field(), Some("debts.minimum_payment"));

        let p = params(vec![debt("a", 1.0, -0.1, 1.0)], 0.0, PayoffStrategy::Avalanche);
        assert_eq!(validate(&p).unwrap_err().field(), Some("debts.annual_interest_rate"));

        let p = params(vec![debt("a", 1.0, 0.1, f64::INFINITY)], 0.0, PayoffStrategy::Avalanche);
        assert_eq!(validate(&p).unwrap_err().field(), Some("debts.minimum_payment"));

        let p = params(vec![debt("a", 1.0, 0.1, 1.0)], -5.0, PayoffStrategy::Avalanche);
        assert_eq!(validate(&p).unwrap_err().field(), Some("extra_payment"));

        let p = params(
            sample_debts(),
            0.0,
            PayoffStrategy::Custom(vec!["card".into(), "car".into()]),
        );
        assert_eq!(validate(&p).unwrap_err().field(), Some("strategy"));

        let p = params(
            sample_debts(),
            0.0,
            PayoffStrategy::Custom(vec!["card".into(), "card".into(), "car".into()]),
        );
        assert!(validate(&p).is_err());

        assert!(validate(&params(sample_debts(), 0.0, PayoffStrategy::Snowball)).is_ok());
    }
}

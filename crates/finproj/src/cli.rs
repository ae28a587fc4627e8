use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use finproj_core::{
    CompoundInterestParams, DebtPayoffParams, FinanceEngine, FireParams, MonteCarloParams,
    SavingsPlanParams,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::input::load_params;

#[derive(Parser, Debug)]
#[command(name = "finproj")]
#[command(about = "Personal-finance projections from the command line")]
pub struct Args {
    /// Engine settings file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Print cache and performance stats to stderr
    #[arg(long)]
    pub stats: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Deterministic compound growth
    Compound(RunArgs),
    /// Monte Carlo outcome distribution
    MonteCarlo(RunArgs),
    /// FIRE number and retirement analysis
    Fire(RunArgs),
    /// Debt payoff schedule
    Debt(RunArgs),
    /// Savings allocation across goals
    Savings(RunArgs),
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Parameter file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Run the calculation this many times through the same engine
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
}

impl Command {
    #[must_use]
    pub fn run_args(&self) -> &RunArgs {
        match self {
            Command::Compound(a)
            | Command::MonteCarlo(a)
            | Command::Fire(a)
            | Command::Debt(a)
            | Command::Savings(a) => a,
        }
    }
}

/// Load the command's parameters, run it `repeat` times and return the last result
pub fn execute(engine: &FinanceEngine, command: &Command) -> color_eyre::Result<Value> {
    let args = command.run_args();
    match command {
        Command::Compound(_) => {
            run_repeated::<CompoundInterestParams, _, _>(args, |p| {
                engine.calculate_compound_interest(p)
            })
        }
        Command::MonteCarlo(_) => {
            run_repeated::<MonteCarloParams, _, _>(args, |p| engine.simulate_monte_carlo(p))
        }
        Command::Fire(_) => {
            run_repeated::<FireParams, _, _>(args, |p| engine.calculate_fire_number(p))
        }
        Command::Debt(_) => {
            run_repeated::<DebtPayoffParams, _, _>(args, |p| engine.plan_debt_payoff(p))
        }
        Command::Savings(_) => {
            run_repeated::<SavingsPlanParams, _, _>(args, |p| engine.optimize_savings_plan(p))
        }
    }
}

fn run_repeated<P, R, F>(args: &RunArgs, calculate: F) -> color_eyre::Result<Value>
where
    P: DeserializeOwned,
    R: Serialize,
    F: Fn(&P) -> finproj_core::Result<R>,
{
    let params: P = load_params(&args.input)?;
    tracing::info!(input = %args.input.display(), repeat = args.repeat, "running calculation");

    let mut result = calculate(&params)?;
    for _ in 1..args.repeat {
        result = calculate(&params)?;
    }
    Ok(serde_json::to_value(result)?)
}

/// Cache and performance counters as one JSON document
#[must_use]
pub fn report_stats(engine: &FinanceEngine) -> Value {
    json!({
        "cache": engine.cache_stats(),
        "performance": engine.performance_metrics(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_subcommand_and_flags() {
        let args = Args::try_parse_from([
            "finproj",
            "--log-level",
            "debug",
            "monte-carlo",
            "--input",
            "mc.yaml",
            "--repeat",
            "3",
        ])
        .unwrap();
        assert_eq!(args.log_level, "debug");
        assert!(!args.stats);
        assert_eq!(
            args.command,
            Command::MonteCarlo(RunArgs {
                input: PathBuf::from("mc.yaml"),
                repeat: 3,
            })
        );
    }

    #[test]
    fn test_zero_repeat_rejected() {
        let parsed = Args::try_parse_from(["finproj", "fire", "-i", "f.json", "--repeat", "0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_repeat_hits_cache() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("compound.json");
        fs::write(
            &input,
            r#"{"principal": 1000, "annual_rate": 0.05, "compounding_frequency": 12, "time_in_years": 10}"#,
        )
        .unwrap();

        let engine = FinanceEngine::default();
        let command = Command::Compound(RunArgs { input, repeat: 3 });
        let value = execute(&engine, &command).unwrap();

        let fv = value["future_value"].as_f64().unwrap();
        assert!((fv - 1647.01).abs() < 0.01);

        let stats = report_stats(&engine);
        assert_eq!(stats["cache"]["hits"], 2);
        assert_eq!(stats["cache"]["misses"], 1);
        assert_eq!(stats["performance"]["total_calls"], 3);
    }

    #[test]
    fn test_engine_errors_surface() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("debt.yaml");
        fs::write(&input, "debts: []\nextra_payment: 100.0\n").unwrap();

        let engine = FinanceEngine::default();
        let err = execute(&engine, &Command::Debt(RunArgs { input, repeat: 1 })).unwrap_err();
        let engine_err = err.downcast_ref::<finproj_core::EngineError>().unwrap();
        assert_eq!(engine_err.field(), Some("debts"));
    }
}

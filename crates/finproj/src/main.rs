use clap::Parser;
use finproj::{Args, execute, init_logging, load_engine_config, report_stats};
use finproj_core::FinanceEngine;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = load_engine_config(args.config.as_deref())?;
    let engine = FinanceEngine::new(config)?;

    let result = execute(&engine, &args.command)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if args.stats || args.command.run_args().repeat > 1 {
        eprintln!("{}", serde_json::to_string_pretty(&report_stats(&engine))?);
    }

    tracing::debug!("finproj finished");
    Ok(())
}

//! Command-line host for the finproj projection engine
//!
//! Loads a parameter file, runs one calculator through a [`FinanceEngine`]
//! and hands the result back as JSON.
//!
//! [`FinanceEngine`]: finproj_core::FinanceEngine

pub mod cli;
pub mod input;
pub mod logging;

pub use cli::{Args, Command, RunArgs, execute, report_stats};
pub use input::{InputFormat, load_engine_config, load_params};
pub use logging::init_logging;

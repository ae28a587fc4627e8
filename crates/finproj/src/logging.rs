use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset: the host at `level`, the engine at warn
fn default_filter(level: &str) -> String {
    format!("finproj={level},finproj_core=warn")
}

/// Initialize logging to stderr.
///
/// stdout is reserved for result JSON. The log level can be controlled via the
/// `level` parameter or the `RUST_LOG` environment variable.
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::debug!("finproj logging initialized (level={level})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_engine() {
        assert_eq!(default_filter("debug"), "finproj=debug,finproj_core=warn");
        assert!(EnvFilter::try_new(default_filter("info")).is_ok());
    }
}

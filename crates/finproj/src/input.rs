//! Parameter and configuration file loading

use std::fs;
use std::path::Path;

use color_eyre::eyre::{WrapErr, bail};
use finproj_core::EngineConfig;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Yaml,
    Json,
}

impl InputFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> color_eyre::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(InputFormat::Yaml),
            Some("json") => Ok(InputFormat::Json),
            _ => bail!(
                "cannot tell the format of {} (expected .yaml, .yml or .json)",
                path.display()
            ),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> color_eyre::Result<T> {
        let parsed = match self {
            InputFormat::Yaml => serde_saphyr::from_str(content)?,
            InputFormat::Json => serde_json::from_str(content)?,
        };
        Ok(parsed)
    }
}

/// Read and deserialize a calculator's parameter file
pub fn load_params<T: DeserializeOwned>(path: &Path) -> color_eyre::Result<T> {
    let format = InputFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    format
        .parse(&content)
        .wrap_err_with(|| format!("failed to parse {}", path.display()))
}

/// Engine settings from an optional file, defaults otherwise
pub fn load_engine_config(path: Option<&Path>) -> color_eyre::Result<EngineConfig> {
    let config = match path {
        Some(path) => load_params::<EngineConfig>(path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

//! Service Configuration Module
//!
//! Loads the analysis service settings from TOML with environment-specific overrides and
//! `CONSOLIDATION__*` environment variables layered on top.

use crate::engine::EngineConfig;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use types::Interval;

pub const DEFAULT_CONFIG_PATH: &str = "config/consolidation.toml";
pub const ENV_PREFIX: &str = "CONSOLIDATION";

pub const DEFAULT_LOOKBACK_DAYS: u32 = 180;
pub const MIN_LOOKBACK_DAYS: u32 = 7;
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Settings for one analysis service instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub symbol: String,
    pub interval: Interval,

    /// Requested history window in days; clamped on use
    pub lookback_days: u32,

    /// JSON kline snapshot served by the file provider
    pub candle_file: Option<PathBuf>,

    /// Report destination, stdout when unset
    pub output: Option<PathBuf>,

    pub log_level: String,

    pub engine: EngineConfig,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Interval::Hour1,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            candle_file: None,
            output: None,
            log_level: "info".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

/// Clamps a requested lookback into the supported window; missing or zero means default
pub fn clamp_lookback_days(requested: Option<u32>) -> u32 {
    match requested {
        None | Some(0) => DEFAULT_LOOKBACK_DAYS,
        Some(days) => days.clamp(MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS),
    }
}

impl ServiceSettings {
    /// Load settings from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        Self::load_with_prefix(base_path, environment, ENV_PREFIX)
    }

    /// As [`ServiceSettings::load`] with a custom environment variable prefix
    pub fn load_with_prefix(
        base_path: Option<&Path>,
        environment: Option<&str>,
        env_prefix: &str,
    ) -> Result<Self> {
        let (base, required) = match base_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut builder =
            Config::builder().add_source(File::from(base.as_path()).required(required));

        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        settings.expand_env_vars()?;
        settings
            .engine
            .validate()
            .context("Invalid engine configuration")?;
        Ok(settings)
    }

    /// Lookback actually used for candle requests
    pub fn clamped_lookback_days(&self) -> u32 {
        clamp_lookback_days(Some(self.lookback_days))
    }

    /// Expand `$VAR` / `~` references in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(path) = &self.candle_file {
            let expanded = expand_path(path).context("Failed to expand candle file path")?;
            self.candle_file = Some(expanded);
        }
        if let Some(path) = &self.output {
            self.output = Some(expand_path(path).context("Failed to expand output path")?);
        }
        Ok(())
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Load settings from a single TOML file without layering
pub fn load_settings_file(path: impl AsRef<Path>) -> Result<ServiceSettings> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {:?}", path))?;
    let mut settings: ServiceSettings =
        toml::from_str(&content).context("Failed to parse settings file")?;
    settings.expand_env_vars()?;
    settings
        .engine
        .validate()
        .context("Invalid engine configuration")?;
    Ok(settings)
}

//! # Consolidation Signal Configuration
//!
//! Centralized configuration for the consolidation signal workspace.
//!
//! ## Features
//!
//! - **Engine Parameters**: thresholds, oscillator settings and the heuristic constants the
//!   signal engine uses, with defaults and validation
//! - **Service Settings**: symbol, interval, lookback window and candle source for the CLI
//! - **Layered Loading**: TOML file, optional environment file, `CONSOLIDATION__*` variables
//!
//! ## Usage
//!
//! ```rust
//! use strategy_config::{EngineConfig, clamp_lookback_days};
//!
//! let engine = EngineConfig::default();
//! assert!(engine.validate().is_ok());
//! assert_eq!(clamp_lookback_days(Some(1_000)), 365);
//! ```

pub mod engine;
pub mod service_config;

// Re-export commonly used types
pub use engine::{ConfidencePolicy, ConfigError, EngineConfig, ExitPolicy, RunPolicy};
pub use service_config::{clamp_lookback_days, load_settings_file, ServiceSettings};

//! Error types for the consolidation signal strategy

use strategy_config::ConfigError;
use thiserror::Error;
use types::ValidationError;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Candle validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Market data error: {message}")]
    MarketData { message: String },
}

pub type Result<T> = std::result::Result<T, StrategyError>;

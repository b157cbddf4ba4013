//! CLI error types and conversions

use crate::report::ReportError;
use crate::strategy::StrategyError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Strategy error
    #[error("strategy error: {0}")]
    StrategyError(#[from] StrategyError),

    /// Report error
    #[error("report error: {0}")]
    ReportError(#[from] ReportError),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

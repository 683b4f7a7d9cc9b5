//! Telemetry module
//!
//! Structured logging and per-stage timing

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{record_stage, Stage};

use crate::config::{LogFormatConfig, TelemetryConfig};

impl From<LogFormatConfig> for LogFormat {
    fn from(format: LogFormatConfig) -> Self {
        match format {
            LogFormatConfig::Pretty => LogFormat::Pretty,
            LogFormatConfig::Json => LogFormat::Json,
        }
    }
}

/// Initialize logging from configuration
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format.into())
}

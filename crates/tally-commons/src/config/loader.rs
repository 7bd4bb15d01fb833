//! Configuration loading and validation.

use super::types::PipelineConfig;
use std::fs;
use std::path::Path;

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let config: PipelineConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.query.default_row_cap == 0 {
            return Err(anyhow::anyhow!("query.default_row_cap cannot be 0"));
        }

        if self.query.row_cap_ceiling == 0 {
            return Err(anyhow::anyhow!("query.row_cap_ceiling cannot be 0"));
        }

        if self.query.default_row_cap > self.query.row_cap_ceiling {
            return Err(anyhow::anyhow!(
                "query.default_row_cap ({}) exceeds query.row_cap_ceiling ({})",
                self.query.default_row_cap,
                self.query.row_cap_ceiling
            ));
        }

        if self.query.execution_timeout_ms == 0 {
            return Err(anyhow::anyhow!("query.execution_timeout_ms cannot be 0"));
        }

        if self.context.chars_per_token == 0 {
            return Err(anyhow::anyhow!("context.chars_per_token cannot be 0"));
        }

        if self.monitor.slow_query_threshold_ms == 0 {
            return Err(anyhow::anyhow!("monitor.slow_query_threshold_ms cannot be 0"));
        }

        Ok(())
    }
}

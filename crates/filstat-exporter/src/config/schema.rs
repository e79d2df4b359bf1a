use serde::Deserialize;

use filstat_core::endpoint::parse_endpoint;
use filstat_core::error::{FilstatError, Result};
use filstat_core::interval::parse_interval;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilstatConfig {
    pub version: u32,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl FilstatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(FilstatError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(default)]
    pub prometheus_enabled: bool,

    #[serde(default = "default_report_interval")]
    pub report_interval: String,

    #[serde(default = "default_prometheus_endpoint")]
    pub prometheus_endpoint: String,

    /// Also log a summary of every view each reporting period.
    #[serde(default)]
    pub log_views: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prometheus_enabled: false,
            report_interval: default_report_interval(),
            prometheus_endpoint: default_prometheus_endpoint(),
            log_views: false,
        }
    }
}

impl MetricsConfig {
    /// Interval and endpoint are only checked when exporting is enabled.
    pub fn validate(&self) -> Result<()> {
        if !self.prometheus_enabled {
            return Ok(());
        }
        parse_interval(&self.report_interval)?;
        parse_endpoint(&self.prometheus_endpoint)?;
        Ok(())
    }
}

fn default_report_interval() -> String {
    "5s".into()
}
fn default_prometheus_endpoint() -> String {
    "/ip4/0.0.0.0/tcp/9400".into()
}

use crate::{DriverError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Limits programmed into a chip when it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitLimits {
    /// Voltage window around each nominal rail, in percent.
    pub in_margin_percent: i64,
    pub fan_min_rpm: i64,
    /// Tenths of a degree Celsius.
    pub temp_over: i64,
    pub temp_hyst: i64,
}

impl Default for InitLimits {
    fn default() -> Self {
        Self {
            in_margin_percent: 10,
            fan_min_rpm: 3000,
            temp_over: 600,
            temp_hyst: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub max_clients: usize,
    pub refresh_interval_ms: u64,
    pub init: InitLimits,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_clients: 4,
            refresh_interval_ms: 1500,
            init: InitLimits::default(),
        }
    }
}

/// Upper bound on `max_clients`; the registry preallocates every slot.
pub const MAX_CLIENTS: usize = 32;

impl DriverConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CLIENTS).contains(&self.max_clients) {
            return Err(DriverError::InvalidConfig(format!(
                "max_clients must be within 1..={MAX_CLIENTS}, got {}",
                self.max_clients
            )));
        }
        if !(0..=100).contains(&self.init.in_margin_percent) {
            return Err(DriverError::InvalidConfig(format!(
                "init.in_margin_percent must be within 0..=100, got {}",
                self.init.in_margin_percent
            )));
        }
        Ok(())
    }
}

/// Decodes and validates a YAML document.
pub fn parse_config(raw: &str) -> anyhow::Result<DriverConfig> {
    // an empty document is YAML null, which serde(default) does not cover
    if raw.trim().is_empty() {
        return Ok(DriverConfig::default());
    }
    let cfg: DriverConfig = serde_yaml::from_str(raw).context("decoding driver config")?;
    cfg.validate().context("checking driver config")?;
    Ok(cfg)
}

pub fn load_config_file(path: impl AsRef<Path>) -> anyhow::Result<DriverConfig> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("parsing yaml: {}", path.display()))
}

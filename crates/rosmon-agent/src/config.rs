use anyhow::{bail, Context};
use rosmon_common::types::Device;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Metric name prefix, e.g. `mikrotik` in `mikrotik_user_bytes_in`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_collection_interval")]
    pub collection_interval_secs: u64,
    /// Upper bound for one device fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Devices collected at the same time.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Capacity of the sample channel between device passes and the writer.
    /// A full channel makes device passes wait; it never drops samples.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Where the text exposition of the latest pass is written, if anywhere.
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub collectors: CollectorToggles,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorToggles {
    #[serde(default = "default_enabled")]
    pub hotspot: bool,
}

impl Default for CollectorToggles {
    fn default() -> Self {
        Self {
            hotspot: default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub address: String,
    /// JSON snapshot served by the replay client for this device.
    pub snapshot: PathBuf,
}

impl DeviceConfig {
    pub fn device(&self) -> Device {
        Device::new(&self.name, &self.address)
    }
}

fn default_namespace() -> String {
    "mikrotik".to_string()
}

fn default_collection_interval() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    4
}

fn default_channel_capacity() -> usize {
    4096
}

fn default_log_level() -> String {
    "rosmon=info".to_string()
}

fn default_enabled() -> bool {
    true
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {path}"))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.devices.is_empty() {
            bail!("at least one [[devices]] entry is required");
        }
        if self.collection_interval_secs == 0 {
            bail!("collection_interval_secs must be greater than zero");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be greater than zero");
        }
        if self.max_concurrent == 0 {
            bail!("max_concurrent must be greater than zero");
        }
        if self.channel_capacity == 0 {
            bail!("channel_capacity must be greater than zero");
        }
        let mut names = HashSet::new();
        for device in &self.devices {
            if !names.insert(device.name.as_str()) {
                bail!("duplicate device name: {}", device.name);
            }
        }
        Ok(())
    }

    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

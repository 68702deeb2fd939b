use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{error::Error, types::duration_millis, types::ResourceLimits};

pub const DEFAULT_CHANNEL: &str = "code_execution";

/// Service configuration, usually read from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Name of the method channel served
    pub channel: String,
    /// Maximum number of executions running at once
    pub max_concurrent: usize,
    /// Maximum number of requests waiting for a slot
    pub queue_capacity: usize,
    /// How long a queued request waits before it is turned away
    #[serde(rename = "queue_timeout_ms", with = "duration_millis")]
    pub queue_timeout: Duration,
    /// Directory under which sandboxes are created, the system temp dir if unset
    pub workspace_root: Option<PathBuf>,
    /// `PATH` seen by sandboxed programs
    pub sandbox_path: String,
    /// Tool name to executable overrides, e.g. `python3 = "/opt/python/bin/python3"`
    pub tools: HashMap<String, PathBuf>,
    pub limits: ResourceLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            max_concurrent: 4,
            queue_capacity: 16,
            queue_timeout: Duration::from_secs(5),
            workspace_root: None,
            sandbox_path: "/usr/local/bin:/usr/bin:/bin".to_string(),
            tools: HashMap::new(),
            limits: ResourceLimits::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: ServiceConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.channel.is_empty() {
            return Err(Error::Config("channel name must not be empty".to_string()));
        }
        if self.max_concurrent == 0 {
            return Err(Error::Config("max_concurrent must be at least 1".to_string()));
        }
        if self.limits.timeout.is_zero() || self.limits.compile_timeout.is_zero() {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }
        if self.limits.timeout > self.limits.max_timeout {
            return Err(Error::Config(format!(
                "timeout_ms ({}) exceeds max_timeout_ms ({})",
                self.limits.timeout.as_millis(),
                self.limits.max_timeout.as_millis()
            )));
        }
        if self.limits.memory == 0 || self.limits.output == 0 {
            return Err(Error::Config(
                "memory and output limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

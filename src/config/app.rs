use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::HotkeyCombination;
use crate::error::{ClipwiseError, Result};
use crate::transport::DEFAULT_ADDRESS;

/// Top-level configuration from `config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub hotkey: HotkeyConfig,
    pub capture: CaptureConfig,
    pub dispatch: DispatchConfig,
    /// Log filter used when `RUST_LOG` is unset. Default: info.
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Request/reply endpoint. Default: tcp://localhost:5555.
    pub address: String,
    /// Delay between connection attempts in milliseconds. Default: 1000.
    pub retry_interval_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            retry_interval_ms: 1000,
        }
    }
}

impl BackendConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub combination: HotkeyCombination,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            combination: HotkeyCombination::platform_default(),
        }
    }
}

/// What a hotkey capture turns into. The captured text is always sent as
/// the `content` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub template: String,
    pub params: BTreeMap<String, String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let params = [("keyword", ""), ("style", "Professional"), ("context", "Email")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            template: "reply".into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Jobs that may wait behind the one in flight. Default: 16.
    pub queue_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { queue_capacity: 16 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl AppConfig {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self =
            serde_yaml::from_str(&contents).map_err(|e| ClipwiseError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location (see [`super::config_path`]).
    pub fn load() -> Result<Self> {
        Self::load_from(&super::config_path())
    }

    /// Write as YAML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|e| ClipwiseError::InvalidConfig {
            reason: e.to_string(),
        })?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Checks that do not touch any OS resource.
    pub fn validate(&self) -> Result<()> {
        if !self.backend.address.starts_with("tcp://") {
            return Err(ClipwiseError::InvalidConfig {
                reason: format!(
                    "backend address must start with tcp://, got '{}'",
                    self.backend.address
                ),
            });
        }
        if self.capture.template.trim().is_empty() {
            return Err(ClipwiseError::InvalidConfig {
                reason: "capture template is empty".into(),
            });
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        address: Option<String>,
        hotkey: Option<HotkeyCombination>,
        template: Option<String>,
    ) -> Result<Self> {
        if let Some(address) = address {
            self.backend.address = address;
        }
        if let Some(hotkey) = hotkey {
            self.hotkey.combination = hotkey;
        }
        if let Some(template) = template {
            self.capture.template = template;
        }
        self.validate()?;
        Ok(self)
    }
}

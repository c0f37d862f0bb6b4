use serde::{Deserialize, Serialize};
use std::{collections::HashMap, io::ErrorKind, path::Path};

use crate::errors::ConfigError;

// Environment overrides
const ENV_DUPLICATE_POLICY: &str = "INJECTOR_DUPLICATE_POLICY";
const ENV_MAX_DEPTH: &str = "INJECTOR_MAX_DEPTH";

const DEFAULT_MAX_DEPTH: usize = 64;

/// 重复注册同一类型时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 新注册整体替换旧注册（包括已缓存的单例）
    #[default]
    Replace,
    /// 拒绝重复注册
    Reject,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(DuplicatePolicy::Replace),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(ConfigError::InvalidFormat(format!(
                "unknown duplicate policy '{}'",
                other
            ))),
        }
    }
}

/// Injector configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InjectorConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// 单次解析允许的最大依赖深度
    pub max_depth: usize,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Replace,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl InjectorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::Io(path.display().to_string(), e),
        })?;
        tracing::debug!(path = %path.display(), "Loaded injector configuration");
        Self::from_toml_str(&content)
    }

    /// Apply overrides from pre-fetched environment variables.
    pub fn apply_env_overrides(&mut self, env_map: &HashMap<String, String>) -> Result<(), ConfigError> {
        if let Some(policy) = env_map.get(ENV_DUPLICATE_POLICY) {
            self.duplicate_policy = policy.parse()?;
        }
        if let Some(depth) = env_map.get(ENV_MAX_DEPTH) {
            self.max_depth = depth.trim().parse().map_err(|_| {
                ConfigError::InvalidFormat(format!("{} must be an integer, got '{}'", ENV_MAX_DEPTH, depth))
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

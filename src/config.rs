use super::*;
use crate::universal::protocol::FatalError;

fn default_enabled_ops() -> Vec<String> {
  vec![
    "deploy".into(),
    "mint".into(),
    "transfer".into(),
    "no_return".into(),
  ]
}

fn default_prefetch_depth() -> usize {
  16
}

fn default_payload_max_bytes() -> usize {
  520
}

fn default_reorg_depth_limit() -> u64 {
  64
}

fn default_poll_interval_ms() -> u64 {
  5_000
}

fn default_oracle_timeout_ms() -> u64 {
  30_000
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryBackoff {
  pub base_ms: u64,
  pub max_ms: u64,
  pub budget: u32,
}

impl Default for RetryBackoff {
  fn default() -> Self {
    Self {
      base_ms: 500,
      max_ms: 60_000,
      budget: 10,
    }
  }
}

impl RetryBackoff {
  pub fn delay(&self, attempt: u32) -> Duration {
    let exp = attempt.min(31);
    let ms = self
      .base_ms
      .saturating_mul(1u64 << exp)
      .min(self.max_ms);
    Duration::from_millis(ms)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
  #[serde(default)]
  pub start_height: u64,
  #[serde(default)]
  pub require_legacy: bool,
  #[serde(default = "default_enabled_ops")]
  pub enabled_ops: Vec<String>,
  #[serde(default = "default_prefetch_depth")]
  pub prefetch_depth: usize,
  #[serde(default = "default_payload_max_bytes")]
  pub payload_max_bytes: usize,
  #[serde(default = "default_reorg_depth_limit")]
  pub reorg_depth_limit: u64,
  #[serde(default)]
  pub retry_backoff: RetryBackoff,
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms: u64,
  #[serde(default)]
  pub oracle_url: Option<String>,
  #[serde(default = "default_oracle_timeout_ms")]
  pub oracle_timeout_ms: u64,
}

impl Default for Config {
  fn default() -> Self {
    serde_json::from_str("{}").unwrap()
  }
}

impl Config {
  pub fn load(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => {
        let raw = fs::read_to_string(path)
          .with_context(|| format!("failed to read config file `{}`", path.display()))?;
        let config = serde_json::from_str::<Self>(&raw)
          .with_context(|| format!("failed to parse config file `{}`", path.display()))?;
        Ok(config)
      }
      None => Ok(Self::default()),
    }
  }

  pub fn validate(&self) -> Result<(), FatalError> {
    if self.prefetch_depth == 0 {
      return Err(FatalError::ConfigInvalid(
        "prefetch_depth must be at least 1".into(),
      ));
    }

    if self.payload_max_bytes < 2 {
      return Err(FatalError::ConfigInvalid(
        "payload_max_bytes must hold at least an empty object".into(),
      ));
    }

    if self.reorg_depth_limit == 0 {
      return Err(FatalError::ConfigInvalid(
        "reorg_depth_limit must be at least 1".into(),
      ));
    }

    if self.retry_backoff.base_ms == 0 || self.retry_backoff.base_ms > self.retry_backoff.max_ms {
      return Err(FatalError::ConfigInvalid(
        "retry_backoff base must be nonzero and no larger than max".into(),
      ));
    }

    if self.enabled_ops.is_empty() {
      return Err(FatalError::ConfigInvalid(
        "enabled_ops must name at least one operation".into(),
      ));
    }

    if self.require_legacy && self.oracle_url.is_none() {
      return Err(FatalError::ConfigInvalid(
        "require_legacy needs an oracle_url".into(),
      ));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let config = Config::default();
    config.validate().unwrap();
    assert_eq!(config.payload_max_bytes, 520);
    assert_eq!(config.enabled_ops.len(), 4);
  }

  #[test]
  fn require_legacy_without_oracle_is_invalid() {
    let config = Config {
      require_legacy: true,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn backoff_is_capped() {
    let backoff = RetryBackoff {
      base_ms: 500,
      max_ms: 4_000,
      budget: 5,
    };
    assert_eq!(backoff.delay(0), Duration::from_millis(500));
    assert_eq!(backoff.delay(1), Duration::from_millis(1_000));
    assert_eq!(backoff.delay(10), Duration::from_millis(4_000));
  }

  #[test]
  fn unknown_config_keys_are_rejected() {
    assert!(serde_json::from_str::<Config>(r#"{"star_height": 1}"#).is_err());
  }
}

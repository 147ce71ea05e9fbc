use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base poll interval must be greater than zero")]
    ZeroBaseInterval,
    #[error("backoff interval ({backoff_ms} ms) is shorter than the base interval ({base_ms} ms)")]
    BackoffShorterThanBase { base_ms: u64, backoff_ms: u64 },
    #[error("backoff threshold must be at least one poll")]
    ZeroBackoffThreshold,
    #[error("active job limit must be at least one")]
    ZeroJobLimit,
    #[error("at least one allowed host is required")]
    NoAllowedHosts,
}

/// Tunables for one ingest session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub base_interval_ms: u64,
    pub backoff_interval_ms: u64,
    /// Polls without a terminal status before switching to the backoff interval.
    pub backoff_threshold: u32,
    pub max_active_jobs: u32,
    pub allowed_hosts: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 4_000,
            backoff_interval_ms: 8_000,
            backoff_threshold: 30,
            max_active_jobs: 3,
            allowed_hosts: vec![
                "tiktok.com".to_string(),
                "instagram.com".to_string(),
                "youtube.com".to_string(),
                "youtu.be".to_string(),
            ],
        }
    }
}

impl SessionConfig {
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    pub fn backoff_interval(&self) -> Duration {
        Duration::from_millis(self.backoff_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_interval_ms == 0 {
            return Err(ConfigError::ZeroBaseInterval);
        }
        if self.backoff_interval_ms < self.base_interval_ms {
            return Err(ConfigError::BackoffShorterThanBase {
                base_ms: self.base_interval_ms,
                backoff_ms: self.backoff_interval_ms,
            });
        }
        if self.backoff_threshold == 0 {
            return Err(ConfigError::ZeroBackoffThreshold);
        }
        if self.max_active_jobs == 0 {
            return Err(ConfigError::ZeroJobLimit);
        }
        if self.allowed_hosts.iter().all(|host| host.trim().is_empty()) {
            return Err(ConfigError::NoAllowedHosts);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn backoff_must_not_undercut_base() {
        let config = SessionConfig {
            base_interval_ms: 5_000,
            backoff_interval_ms: 1_000,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BackoffShorterThanBase {
                base_ms: 5_000,
                backoff_ms: 1_000
            })
        );
    }

    #[test]
    fn blank_hosts_are_rejected() {
        let config = SessionConfig {
            allowed_hosts: vec!["  ".to_string()],
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoAllowedHosts));
    }
}

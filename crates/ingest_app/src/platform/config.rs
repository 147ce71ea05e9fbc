use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use ingest_core::SessionConfig;
use ingest_engine::HttpSettings;
use ingest_logging::ingest_info;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "ingest.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let http = HttpSettings::default();
        Self {
            base_url: http.base_url,
            connect_timeout_ms: duration_ms(http.connect_timeout),
            request_timeout_ms: duration_ms(http.request_timeout),
            log_level: "info".to_string(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .with_context(|| format!("unknown log level {:?}", self.log_level))
    }
}

/// Reads the RON config at `path`. A missing file means defaults.
pub fn load(path: &Path) -> Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {:?}", path));
        }
    };

    let config: AppConfig =
        ron::from_str(&content).with_context(|| format!("failed to parse config {:?}", path))?;
    config
        .session
        .validate()
        .with_context(|| format!("invalid session settings in {:?}", path))?;
    ingest_info!("Loaded config from {:?}", path);
    Ok(config)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

use std::time::Duration;

use serde::Deserialize;

use crate::application::AppError;
use crate::domain::{CooldownCatalog, DEFAULT_COOLDOWN_SECONDS};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan_interval_seconds: u64,
    pub delivery_timeout_seconds: u64,
    pub default_cooldown_seconds: u64,
    pub database_url: String,
    pub listen_addr: String,
    pub webhook_url: Option<String>,
    pub api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_interval_seconds: 60,
            delivery_timeout_seconds: 10,
            default_cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            database_url: "sqlite:farm_timers.db".to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
            webhook_url: None,
            api_token: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let raw = expand_env(raw);
        let cfg: Config = serde_yaml::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `DATABASE_URL`, `WEBHOOK_URL` and `API_TOKEN` win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DATABASE_URL") {
            self.database_url = v;
        }
        if let Ok(v) = std::env::var("WEBHOOK_URL") {
            self.webhook_url = Some(v);
        }
        if let Ok(v) = std::env::var("API_TOKEN") {
            self.api_token = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.scan_interval_seconds == 0 {
            return Err(AppError::Config("scan_interval_seconds must be > 0".into()));
        }
        if self.delivery_timeout_seconds == 0 {
            return Err(AppError::Config(
                "delivery_timeout_seconds must be > 0".into(),
            ));
        }
        if self.default_cooldown_seconds == 0 {
            return Err(AppError::Config(
                "default_cooldown_seconds must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_seconds)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_seconds)
    }

    pub fn catalog(&self) -> CooldownCatalog {
        CooldownCatalog::with_default(Duration::from_secs(self.default_cooldown_seconds))
    }
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str) -> String {
    let mut out = s.to_string();
    for (k, v) in std::env::vars() {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}

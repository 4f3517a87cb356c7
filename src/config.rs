use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub habbo: HabboConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/reino.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Session inactivity expiry in minutes.
    pub session_minutes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8650,
            cors_allowed_origins: vec![
                "http://localhost:8650".to_string(),
                "http://127.0.0.1:8650".to_string(),
            ],
            session_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HabboConfig {
    /// Base URL of the public profile API.
    pub base_url: String,

    /// Bounded timeout for a single profile lookup.
    pub request_timeout_seconds: u64,
}

impl Default for HabboConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.habbo.es".to_string(),
            request_timeout_seconds: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    fn config_path() -> String {
        std::env::var("REINO_CONFIG").unwrap_or_else(|_| "config.toml".to_string())
    }

    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = Self::config_path();
        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("Failed to parse config file {path}"))?;

        Ok(config)
    }

    pub fn create_default_if_missing() -> Result<()> {
        let path = Self::config_path();
        if Path::new(&path).exists() {
            return Ok(());
        }

        let rendered = toml::to_string_pretty(&Self::default())
            .context("Failed to render default config")?;
        std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write config file {path}"))?;

        info!("Created default config at {path}");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            bail!("general.database_path must not be empty");
        }
        if self.general.max_db_connections < self.general.min_db_connections {
            bail!("general.max_db_connections must be >= min_db_connections");
        }
        if self.server.session_minutes == 0 {
            bail!("server.session_minutes must be positive");
        }
        if self.habbo.base_url.is_empty() {
            bail!("habbo.base_url must not be empty");
        }
        if self.habbo.request_timeout_seconds == 0 {
            bail!("habbo.request_timeout_seconds must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.habbo.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_pool_bounds() {
        let mut config = Config::default();
        config.general.max_db_connections = 1;
        config.general.min_db_connections = 5;
        assert!(config.validate().is_err());
    }
}

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the confirmation console
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SchoolHealthConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Client-side request pacing
    pub rate_limit: RateLimitConfig,
    /// GET response cache
    pub cache: CacheConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Bulk confirmation behaviour
    pub bulk: BulkConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the school health backend
    pub base_url: String,
    /// Bearer token (can be set via env var)
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a GET response stays fresh
    pub ttl_seconds: u64,
    /// Maximum cached responses
    pub max_capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human readable ones
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BulkConfig {
    /// Ask for explicit assent before a bulk run
    pub require_confirmation: bool,
}

impl Default for SchoolHealthConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                token: None, // Read from env var or .school-health-rc
                timeout_seconds: 30,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: 5,
                burst_capacity: 10,
            },
            cache: CacheConfig {
                ttl_seconds: 60,
                max_capacity: 500,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            bulk: BulkConfig {
                require_confirmation: true,
            },
        }
    }
}

impl SchoolHealthConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (school-health.toml, .school-health-rc)
    /// 3. Environment variables (prefixed with SCHOOL_HEALTH_, nested keys joined by `__`)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("school-health.toml").exists() {
            builder = builder.add_source(File::with_name("school-health"));
        }

        if Path::new(".school-health-rc").exists() {
            builder = builder.add_source(
                File::with_name(".school-health-rc").format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHOOL_HEALTH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: SchoolHealthConfig = builder.build()?.try_deserialize()?;

        if loaded.api.token.is_none() {
            if let Ok(token) = std::env::var("SCHOOL_HEALTH_TOKEN") {
                loaded.api.token = Some(token);
            }
        }

        Ok(loaded)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<SchoolHealthConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = SchoolHealthConfig::load_env_file();
        SchoolHealthConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static SchoolHealthConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let loaded = config()?;
    tracing::info!(base_url = %loaded.api.base_url, "Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_bulk_assent() {
        let defaults = SchoolHealthConfig::default();
        assert!(defaults.bulk.require_confirmation);
        assert_eq!(defaults.api.base_url, "http://localhost:8080");
        assert!(defaults.rate_limit.requests_per_second > 0);
        assert!(defaults.rate_limit.burst_capacity > 0);
    }

    #[test]
    fn save_and_reload_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("school-health.toml");

        let mut original = SchoolHealthConfig::default();
        original.api.base_url = "https://health.example.edu".to_string();
        original.bulk.require_confirmation = false;
        original.save_to_file(&path).unwrap();

        let reloaded: SchoolHealthConfig = Config::builder()
            .add_source(File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(reloaded, original);
    }
}

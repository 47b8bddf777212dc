use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Switchboard
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwitchboardConfig {
    /// Management interface settings
    pub management: ManagementConfig,
    /// Timeout poller settings
    pub poller: PollerConfig,
    /// Finder navigation settings
    pub finder: FinderConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManagementConfig {
    /// Management endpoint URL
    pub endpoint: String,
    /// Bearer token for the management session (can be set via env var)
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerConfig {
    /// Spacing between poll iterations in milliseconds
    pub period_ms: u64,
    /// Default deadline for retry-until-condition polls in seconds
    pub default_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FinderConfig {
    /// Maximum number of simultaneously visible columns
    pub max_visible_columns: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable structured logging
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

impl Default for SwitchboardConfig {
    fn default() -> Self {
        Self {
            management: ManagementConfig {
                endpoint: "http://localhost:9990/management".to_string(),
                token: None, // Will be read from env var or .switchboard-rc
                request_timeout_seconds: 30,
            },
            poller: PollerConfig {
                period_ms: 500,
                default_timeout_seconds: 30,
            },
            finder: FinderConfig {
                max_visible_columns: 4,
            },
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
            },
        }
    }
}

impl SwitchboardConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (switchboard.toml, .switchboard-rc)
    /// 3. Environment variables (prefixed with SWITCHBOARD_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("switchboard.toml").exists() {
            builder = builder.add_source(File::with_name("switchboard"));
        }

        if Path::new(".switchboard-rc").exists() {
            builder = builder.add_source(File::with_name(".switchboard-rc"));
        }

        builder = builder.add_source(
            Environment::with_prefix("SWITCHBOARD")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut switchboard_config: SwitchboardConfig = config.try_deserialize()?;

        // Special handling for the session token - check multiple sources
        if switchboard_config.management.token.is_none() {
            if let Ok(token) = std::env::var("MANAGEMENT_TOKEN") {
                switchboard_config.management.token = Some(token);
            } else if let Ok(token) = std::env::var("SWITCHBOARD_MANAGEMENT_TOKEN") {
                switchboard_config.management.token = Some(token);
            }
        }

        Ok(switchboard_config)
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
static CONFIG: std::sync::LazyLock<Result<SwitchboardConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = SwitchboardConfig::load_env_file();
        SwitchboardConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static SwitchboardConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

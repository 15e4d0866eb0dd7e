//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use formguard_core::ConfigError;
use formguard_infra::{BrevoConfig, GatewayConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: GatewayConfig,
    /// How often idle in-memory windows are swept.
    pub sweep_interval: Duration,
    pub brevo: Option<BrevoConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rate_limit = GatewayConfig::from_env()?;

        let sweep_interval = env::var("RATE_LIMIT_SWEEP_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or_else(|| rate_limit.buckets.shortest_window());

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            rate_limit,
            sweep_interval,
            brevo: BrevoConfig::from_env(),
        })
    }
}

//! Main application configuration
//!
//! This module defines the primary configuration structures for the activity
//! signup service, including environment variable loading and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub registry: RegistrySettings,
    pub web: WebSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and health reports
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Signup rule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Domain every student address must belong to, without the '@'
    pub required_email_domain: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Address to bind to
    pub host: String,
    /// Port for the API and operational endpoints
    pub port: u16,
    /// Directory holding the front-end assets
    pub static_dir: PathBuf,
    /// Mount the front-end under /static
    pub serve_static: bool,
    /// Expose /metrics
    pub enable_metrics: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "mergington-activities".to_string(),
            log_level: "info".to_string(),
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            required_email_domain: "mergington.edu".to_string(),
        }
    }
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
            serve_static: true,
            enable_metrics: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML document; missing sections and keys take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Registry settings
        if let Ok(domain) = env::var("REQUIRED_EMAIL_DOMAIN") {
            self.registry.required_email_domain = domain;
        }

        // Web settings
        if let Ok(host) = env::var("HTTP_HOST") {
            self.web.host = host;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.web.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(dir) = env::var("STATIC_DIR") {
            self.web.static_dir = PathBuf::from(dir);
        }
        if let Ok(serve) = env::var("SERVE_STATIC") {
            self.web.serve_static = serve
                .parse()
                .map_err(|_| anyhow!("Invalid SERVE_STATIC value: {}", serve))?;
        }
        if let Ok(metrics) = env::var("ENABLE_METRICS") {
            self.web.enable_metrics = metrics
                .parse()
                .map_err(|_| anyhow!("Invalid ENABLE_METRICS value: {}", metrics))?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Socket address string the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate registry settings
    let domain = &config.registry.required_email_domain;
    if domain.is_empty() {
        return Err(anyhow!("Required email domain cannot be empty"));
    }
    if domain.contains('@') {
        return Err(anyhow!(
            "Required email domain must not include '@': {}",
            domain
        ));
    }

    // Validate web settings
    if config.web.host.is_empty() {
        return Err(anyhow!("HTTP host cannot be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.registry.required_email_domain, "mergington.edu");
        assert_eq!(config.web.port, 8000);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.service.shutdown_timeout_seconds = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.registry.required_email_domain = "@mergington.edu".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.registry.required_email_domain = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.web.host = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [web]
            port = 9100
            serve_static = false

            [registry]
            required_email_domain = "example.edu"
            "#,
        )
        .unwrap();

        assert_eq!(config.web.port, 9100);
        assert!(!config.web.serve_static);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.registry.required_email_domain, "example.edu");
        assert_eq!(config.service.name, "mergington-activities");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.service.log_level, "info");
        assert!(config.web.enable_metrics);
    }

    #[test]
    fn test_malformed_toml() {
        assert!(AppConfig::from_toml_str("[web\nport = ").is_err());
        assert!(AppConfig::from_toml_str("[web]\nport = \"eighty\"").is_err());
    }
}

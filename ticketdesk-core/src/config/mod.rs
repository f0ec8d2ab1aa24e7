//! Configuration management for Ticketdesk Core

use crate::domain::Role;
use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Ticket backend configuration
    pub api: ApiConfig,
    /// Session bootstrap configuration
    pub session: SessionConfig,
    /// Logging and metrics configuration
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the ticket backend (e.g., https://tickets.example.com)
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Grants the fallback identity when the host provides no init data.
    /// Never enable outside local development.
    pub dev_mode: bool,
    /// Role of the fallback identity
    pub dev_role: Role,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            dev_role: Role::SuperAdmin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "text" or "json"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            metrics_enabled: false,
            service_name: "ticketdesk".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TICKETDESK_API_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        url::Url::parse(&base_url).context("Invalid TICKETDESK_API_URL")?;

        Ok(Self {
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout_secs: lookup("TICKETDESK_API_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("Invalid TICKETDESK_API_TIMEOUT_SECS")?,
            },
            session: SessionConfig {
                dev_mode: parse_flag(lookup("TICKETDESK_DEV_MODE"))
                    .context("Invalid TICKETDESK_DEV_MODE")?,
                dev_role: lookup("TICKETDESK_DEV_ROLE")
                    .unwrap_or_else(|| "super-admin".to_string())
                    .parse::<Role>()
                    .map_err(anyhow::Error::msg)
                    .context("Invalid TICKETDESK_DEV_ROLE")?,
            },
            telemetry: TelemetryConfig {
                log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
                metrics_enabled: parse_flag(lookup("METRICS_ENABLED"))
                    .context("Invalid METRICS_ENABLED")?,
                service_name: lookup("SERVICE_NAME")
                    .unwrap_or_else(|| "ticketdesk".to_string()),
            },
        })
    }

    /// Whether the fallback identity may be synthesized
    pub fn is_dev_mode(&self) -> bool {
        self.session.dev_mode
    }
}

fn parse_flag(value: Option<String>) -> Result<bool> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => anyhow::bail!("expected true/false, got {:?}", v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(!config.is_dev_mode());
        assert_eq!(config.session.dev_role, Role::SuperAdmin);
        assert_eq!(config.telemetry.log_format, "text");
        assert!(!config.telemetry.metrics_enabled);
    }

    #[test]
    fn test_dev_mode_and_role() {
        let config = load(&[
            ("TICKETDESK_DEV_MODE", "true"),
            ("TICKETDESK_DEV_ROLE", "admin"),
        ])
        .unwrap();

        assert!(config.is_dev_mode());
        assert_eq!(config.session.dev_role, Role::Admin);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = load(&[("TICKETDESK_API_URL", "https://tickets.example.com/")]).unwrap();
        assert_eq!(config.api.base_url, "https://tickets.example.com");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&[("TICKETDESK_API_URL", "not a url")]).is_err());
        assert!(load(&[("TICKETDESK_API_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("TICKETDESK_DEV_MODE", "maybe")]).is_err());
        assert!(load(&[("TICKETDESK_DEV_ROLE", "root")]).is_err());
    }
}

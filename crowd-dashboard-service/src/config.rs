use crate::error::ServiceError;
use crowd_core::{AlertPolicy, DEFAULT_MAX_UPLOAD_BYTES};
use crowd_telemetry::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub tick_interval: Duration,
    pub demo_duration: Duration,
    pub upload_delay: Duration,
    pub overlay_interval: Duration,
    pub max_upload_bytes: u64,
    pub alert_policy: AlertPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            log_level: "info".to_owned(),
            tick_interval: generator.tick_interval,
            demo_duration: generator.demo_duration,
            upload_delay: Duration::from_millis(2_000),
            overlay_interval: Duration::from_millis(100),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            alert_policy: AlertPolicy::OnTransition,
        }
    }
}

impl ServiceConfig {
    /// Reads `CROWD_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("CROWD_DASHBOARD_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "CROWD_DASHBOARD_PORT", defaults.port)?,
            log_level: lookup("CROWD_LOG_LEVEL").unwrap_or(defaults.log_level),
            tick_interval: millis_or(&lookup, "CROWD_TICK_INTERVAL_MS", defaults.tick_interval)?,
            demo_duration: millis_or(&lookup, "CROWD_DEMO_DURATION_MS", defaults.demo_duration)?,
            upload_delay: millis_or(&lookup, "CROWD_UPLOAD_DELAY_MS", defaults.upload_delay)?,
            overlay_interval: millis_or(
                &lookup,
                "CROWD_OVERLAY_INTERVAL_MS",
                defaults.overlay_interval,
            )?,
            max_upload_bytes: parse_or(&lookup, "CROWD_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            alert_policy: parse_or(&lookup, "CROWD_ALERT_POLICY", defaults.alert_policy)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            tick_interval: self.tick_interval,
            demo_duration: self.demo_duration,
            ..GeneratorConfig::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ServiceError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ServiceError::Config(format!("invalid {key}: {e}"))),
    }
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ServiceError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_or(lookup, key, default_ms).map(Duration::from_millis)
}

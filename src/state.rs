use std::env;
use std::time::Duration;
use tera::Tera;

use crate::client::DeviceClient;
use crate::error::ConsoleError;
use crate::policy::ApiPolicy;

/// Application configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub bind_address: String,
    /// Base URL of the appliance's web server.
    pub device_url: String,
    /// Firmware flavour of the device API (`rest` or `form`).
    pub api_variant: String,
    /// Default number of query log rows shown on the dashboard.
    pub query_log_size: usize,
    /// Values offered by the DNS server select.
    pub dns_servers: Vec<String>,
    /// Seconds between restart reachability probes.
    pub restart_probe_delay_secs: u64,
    /// Probes tried before a restart is reported as failed.
    pub restart_probe_attempts: u32,
    pub request_timeout: Duration,
    /// Directory holding the page templates.
    pub templates_dir: String,
}

impl Config {
    /// Creates Config from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            device_url: env::var("DEVICE_URL").unwrap_or_else(|_| "http://192.168.4.1".into()),
            api_variant: env::var("API_VARIANT").unwrap_or_else(|_| "rest".into()),
            query_log_size: parse_var("QUERY_LOG_SIZE", 25),
            dns_servers: env::var("DNS_SERVERS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| split_list("1.1.1.1,8.8.8.8,9.9.9.9")),
            restart_probe_delay_secs: parse_var("RESTART_PROBE_DELAY_SECS", 10),
            restart_probe_attempts: parse_var("RESTART_PROBE_ATTEMPTS", 6),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 10)),
            templates_dir: env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".into()),
        }
    }

    /// Resolves `api_variant` to a policy, falling back to the REST
    /// firmware for unknown names.
    pub fn policy(&self) -> ApiPolicy {
        ApiPolicy::from_variant(&self.api_variant).unwrap_or_else(|| {
            tracing::warn!("Unknown API_VARIANT '{}', using 'rest'", self.api_variant);
            ApiPolicy::rest()
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state passed to all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// Template engine for rendering HTML pages.
    pub tera: Tera,
    /// Client for the appliance.
    pub device: DeviceClient,
    pub config: Config,
}

impl AppState {
    pub fn new(tera: Tera, config: Config) -> Result<Self, ConsoleError> {
        let device =
            DeviceClient::new(&config.device_url, config.policy(), config.request_timeout)?;
        Ok(Self {
            tera,
            device,
            config,
        })
    }
}

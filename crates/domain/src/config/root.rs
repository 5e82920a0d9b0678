use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;

/// Main configuration structure for dnsrelay
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (port, bind address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Forwarding, cache and worker configuration
    #[serde(default)]
    pub dns: DnsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnsrelay.toml in current directory
    /// 3. /etc/dnsrelay/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(hosts) = overrides.hosts_file {
            self.dns.hosts_file = Some(hosts);
        }
        if !overrides.upstream_servers.is_empty() {
            self.dns.upstream_servers = overrides.upstream_servers;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.dns.upstream_servers.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream servers configured".to_string(),
            ));
        }

        for server in &self.dns.upstream_servers {
            if server.parse::<SocketAddr>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "Upstream server '{}' is not a socket address",
                    server
                )));
            }
        }

        if self.dns.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Query timeout cannot be 0".to_string(),
            ));
        }

        if self.dns.max_cname_hops == 0 {
            return Err(ConfigError::Validation(
                "max_cname_hops cannot be 0".to_string(),
            ));
        }

        if self.dns.workers == Some(0) {
            return Err(ConfigError::Validation(
                "Worker count cannot be 0".to_string(),
            ));
        }

        if self.dns.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "Queue capacity cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("dnsrelay.toml").exists() {
            Some("dnsrelay.toml".to_string())
        } else if std::path::Path::new("/etc/dnsrelay/config.toml").exists() {
            Some("/etc/dnsrelay/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub hosts_file: Option<String>,
    pub upstream_servers: Vec<String>,
    pub log_level: Option<String>,
}

//! Service configuration
//!
//! Sources are layered, later wins: built-in defaults, an optional TOML file,
//! `SFR_*` environment variables, then command-line flags.

use serde::{Deserialize, Serialize};
use sfr_features::ColumnPolicy;
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable for the bind host
pub const ENV_HOST: &str = "SFR_HOST";
/// Environment variable for the bind port
pub const ENV_PORT: &str = "SFR_PORT";
/// Environment variable for the artifact directory
pub const ENV_ARTIFACT_DIR: &str = "SFR_ARTIFACT_DIR";
/// Environment variable for the missing-column policy
pub const ENV_COLUMN_POLICY: &str = "SFR_COLUMN_POLICY";
/// Environment variable for the log format
pub const ENV_LOG_FORMAT: &str = "SFR_LOG_FORMAT";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ServiceConfig`]
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Environment variable holds an unusable value
    #[error("invalid value '{value}' for {var}: {message}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        message: String,
    },

    /// Host and port do not resolve to a socket address
    #[error("cannot resolve bind address {host}:{port}")]
    InvalidAddress { host: String, port: u16 },
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Directory holding the model artifacts
    pub artifact_dir: PathBuf,
    /// Missing-expected-column policy
    pub column_policy: ColumnPolicy,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            artifact_dir: PathBuf::from("models"),
            column_policy: ColumnPolicy::ZeroFill,
            log_format: LogFormat::Text,
        }
    }
}

/// Values given on the command line; `None` keeps the lower layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub artifact_dir: Option<PathBuf>,
    pub column_policy: Option<ColumnPolicy>,
    pub log_format: Option<LogFormat>,
}

impl ServiceConfig {
    /// Parse a TOML document; absent keys keep their defaults
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys
    pub fn from_toml_str(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a TOML config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &contents)
    }

    /// Apply `SFR_*` variables from the process environment
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEnv`] for unparsable values
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply `SFR_*` variables using `lookup`
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEnv`] for unparsable values
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = parse_env(ENV_PORT, port)?;
        }
        if let Some(dir) = lookup(ENV_ARTIFACT_DIR) {
            self.artifact_dir = PathBuf::from(dir);
        }
        if let Some(policy) = lookup(ENV_COLUMN_POLICY) {
            self.column_policy = parse_env(ENV_COLUMN_POLICY, policy)?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = parse_env(ENV_LOG_FORMAT, format)?;
        }
        Ok(())
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(host) = &overrides.host {
            self.host.clone_from(host);
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = &overrides.artifact_dir {
            self.artifact_dir.clone_from(dir);
        }
        if let Some(policy) = overrides.column_policy {
            self.column_policy = policy;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        self
    }

    /// Build the layered configuration
    ///
    /// # Errors
    /// Returns error if the config file or an environment value is invalid
    pub fn resolve(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config.with_overrides(overrides))
    }

    /// First socket address `host:port` resolves to
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidAddress`] if nothing resolves
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::InvalidAddress {
                host: self.host.clone(),
                port: self.port,
            })
    }
}

fn parse_env<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var,
        message: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.artifact_dir, PathBuf::from("models"));
        assert_eq!(config.column_policy, ColumnPolicy::ZeroFill);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config =
            ServiceConfig::from_toml_str(Path::new("sfr.toml"), "port = 9000\ncolumn_policy = \"strict\"\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.column_policy, ColumnPolicy::Strict);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn unknown_toml_key_rejected() {
        let err = ServiceConfig::from_toml_str(Path::new("sfr.toml"), "prot = 9000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ServiceConfig::from_toml_str(Path::new("sfr.toml"), "port = 9000\n").unwrap();
        config
            .apply_env_from(env(&[(ENV_PORT, "9100"), (ENV_ARTIFACT_DIR, "/srv/models")]))
            .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.artifact_dir, PathBuf::from("/srv/models"));
    }

    #[test]
    fn invalid_env_port_names_variable() {
        let mut config = ServiceConfig::default();
        let err = config.apply_env_from(env(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(err.to_string().contains("SFR_PORT"));
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = ServiceConfig::default();
        config.apply_env_from(env(&[(ENV_HOST, "0.0.0.0")])).unwrap();
        let config = config.with_overrides(&ConfigOverrides {
            host: Some("localhost".into()),
            log_format: Some(LogFormat::Json),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.host, "localhost");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn socket_addr_resolves_loopback() {
        let addr = ServiceConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}

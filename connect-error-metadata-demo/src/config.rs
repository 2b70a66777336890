//! Environment configuration and logging setup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Errors raised while reading [`DemoConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT {value:?}: {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid DEMO_HOST {value:?}: {source}")]
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("invalid DEMO_CONNECT_ENCODING {0:?}: expected \"json\" or \"proto\"")]
    InvalidEncoding(String),
}

/// Message encoding used by the Connect client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectEncoding {
    #[default]
    Json,
    Proto,
}

impl FromStr for ConnectEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "proto" => Ok(Self::Proto),
            _ => Err(ConfigError::InvalidEncoding(s.to_string())),
        }
    }
}

/// Where the demo servers listen and how the Connect client encodes requests.
///
/// Both bindings use the same address, one after the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    pub host: IpAddr,
    pub port: u16,
    pub connect_encoding: ConnectEncoding,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            connect_encoding: ConnectEncoding::default(),
        }
    }
}

impl DemoConfig {
    /// Read `PORT`, `DEMO_HOST` and `DEMO_CONNECT_ENCODING`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Unset or empty
    /// variables take their defaults; malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = var("PORT") {
            config.port = value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?;
        }
        if let Some(value) = var("DEMO_HOST") {
            config.host = value
                .trim()
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost { value, source })?;
        }
        if let Some(value) = var("DEMO_CONNECT_ENCODING") {
            config.connect_encoding = value.parse()?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`). Stdout stays
/// reserved for the demonstration output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DemoConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_overrides() {
        let config = DemoConfig::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("DEMO_HOST", "0.0.0.0"),
            ("DEMO_CONNECT_ENCODING", "Proto"),
        ]))
        .unwrap();
        assert_eq!(config.addr().to_string(), "0.0.0.0:9090");
        assert_eq!(config.connect_encoding, ConnectEncoding::Proto);
    }

    #[test]
    fn test_empty_value_uses_default() {
        let config = DemoConfig::from_lookup(lookup(&[("PORT", "")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = DemoConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().starts_with("invalid PORT \"http\""));

        let err = DemoConfig::from_lookup(lookup(&[("PORT", "70000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn test_invalid_host_and_encoding() {
        let err = DemoConfig::from_lookup(lookup(&[("DEMO_HOST", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHost { .. }));

        let err =
            DemoConfig::from_lookup(lookup(&[("DEMO_CONNECT_ENCODING", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEncoding(_)));
    }
}

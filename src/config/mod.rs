//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied last by the binary)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JrmpError, Result};
use crate::protocol::ProtocolProfile;
use crate::server::ServerConfig;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listener configuration
    #[serde(default)]
    pub listen: ListenConfig,

    /// Payload configuration
    #[serde(default)]
    pub payload: PayloadConfig,

    /// Registry profile
    #[serde(default)]
    pub protocol: ProtocolProfile,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| JrmpError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| JrmpError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Override fields from environment variables
    pub fn apply_env(mut self) -> Self {
        if let Ok(host) = std::env::var("JRMP_HOST") {
            self.listen.host = host;
        }
        if let Ok(port) = std::env::var("JRMP_PORT") {
            if let Ok(port) = port.parse() {
                self.listen.port = port;
            }
        }
        if let Ok(secs) = std::env::var("JRMP_READ_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.listen.read_timeout_secs = Some(secs);
            }
        }
        if let Ok(path) = std::env::var("JRMP_PAYLOAD") {
            self.payload.path = Some(PathBuf::from(path));
        }

        self
    }

    /// Default config file location (`<config dir>/jrmp/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jrmp").join("config.toml"))
    }

    /// Load from `path`, or from the default location if it exists, then
    /// apply environment overrides.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(path)?,
                _ => Self::default(),
            },
        };
        Ok(config.apply_env())
    }

    /// Build the listener configuration.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let addr = self.listen.listen_addr()?;
        let mut config = ServerConfig::default()
            .with_addr(addr)
            .with_profile(self.protocol);
        config.nodelay = self.listen.nodelay;
        config.read_timeout = self.listen.read_timeout_secs.map(Duration::from_secs);
        Ok(config)
    }
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Socket read timeout in seconds (none = block forever)
    pub read_timeout_secs: Option<u64>,

    /// Disable Nagle's algorithm on accepted sockets
    pub nodelay: bool,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1099,
            read_timeout_secs: None,
            nodelay: true,
        }
    }
}

impl ListenConfig {
    /// Get the full listen address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| JrmpError::Config(format!("Invalid listen host {:?}: {e}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Payload configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// File holding the serialized payload
    pub path: Option<PathBuf>,

    /// Write the file as-is instead of stripping its 4-byte header
    pub raw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::REGISTRY_CLIENT_HASH;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.listen.port, 1099);
        assert_eq!(config.listen.host, "127.0.0.1");
        assert!(config.listen.nodelay);
        assert!(config.payload.path.is_none());
        assert_eq!(config.protocol.client_interface_hash, REGISTRY_CLIENT_HASH);
    }

    #[test]
    fn test_listen_addr() {
        let config = ListenConfig::default();
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:1099");

        let v6 = ListenConfig {
            host: "::1".to_string(),
            ..Default::default()
        };
        assert_eq!(v6.listen_addr().unwrap().to_string(), "[::1]:1099");

        let bad = ListenConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad.listen_addr(), Err(JrmpError::Config(_))));
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [listen]
            host = "0.0.0.0"
            port = 2099
            read_timeout_secs = 30

            [payload]
            path = "/tmp/payload.ser"

            [protocol]
            server_interface_hash = -1
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.listen.host, "0.0.0.0");
        assert_eq!(config.listen.port, 2099);
        assert_eq!(config.listen.read_timeout_secs, Some(30));
        assert!(config.listen.nodelay);
        assert_eq!(config.payload.path, Some(PathBuf::from("/tmp/payload.ser")));
        assert!(!config.payload.raw);
        assert_eq!(config.protocol.server_interface_hash, -1);
        assert_eq!(config.protocol.client_interface_hash, REGISTRY_CLIENT_HASH);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listen]\nport = 4444").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.listen.port, 4444);
    }

    #[test]
    fn test_config_from_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listen\nport = ").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(JrmpError::Config(_))
        ));
    }

    #[test]
    fn test_server_config() {
        let mut config = Config::default();
        config.listen.read_timeout_secs = Some(5);
        let server = config.server_config().unwrap();
        assert_eq!(server.addr.port(), 1099);
        assert_eq!(server.read_timeout, Some(Duration::from_secs(5)));
        assert_eq!(server.profile, config.protocol);
    }
}

//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use crate::protocol::ProtocolProfile;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Read timeout applied to accepted sockets (none = block forever)
    pub read_timeout: Option<Duration>,
    /// Disable Nagle's algorithm on accepted sockets
    pub nodelay: bool,
    /// Registry profile handed to every session
    pub profile: ProtocolProfile,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 1099)),
            read_timeout: None,
            nodelay: true,
            profile: ProtocolProfile::default(),
        }
    }
}

impl ServerConfig {
    /// Create with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Bind to all interfaces
    pub fn bind_all(mut self) -> Self {
        let port = self.addr.port();
        self.addr = SocketAddr::from(([0, 0, 0, 0], port));
        self
    }

    /// Set address directly
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set socket read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set registry profile
    pub fn with_profile(mut self, profile: ProtocolProfile) -> Self {
        self.profile = profile;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ServerConfig::default()
            .with_port(2099)
            .bind_all()
            .with_read_timeout(Duration::from_secs(10));
        assert_eq!(config.addr.to_string(), "0.0.0.0:2099");
        assert_eq!(config.read_timeout, Some(Duration::from_secs(10)));
        assert!(config.nodelay);
    }
}
